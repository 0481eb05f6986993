//! Calendar primitives for the clinic scheduler.
//!
//! This module defines the value types every booking is keyed on:
//! - Date: a plain year/month/day triple that may or may not be valid
//! - Timeslot: one of the twelve fixed half-hour slots of a clinic day
//! - Clock: the source of "today" used by every relative date check

use chrono::{Datelike, Local, Months, NaiveDate, Weekday};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
const LEAP_YEAR_FEB_DAYS: u32 = 29;
const QUADRENNIAL: i32 = 4;
const CENTENNIAL: i32 = 100;
const QUATERCENTENNIAL: i32 = 400;

/// A calendar date.
///
/// Construction does not validate; call [`Date::is_valid`] before trusting
/// the value. Ordering is year, then month, then day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Date {
    year: i32,
    month: u32,
    day: u32,
}

impl Date {
    pub const fn new(year: i32, month: u32, day: u32) -> Self {
        Date { year, month, day }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    /// Check the date against Gregorian month lengths, including Feb 29.
    pub fn is_valid(&self) -> bool {
        if !(1..=12).contains(&self.month) {
            return false;
        }

        let max_days = if self.month == 2 && self.is_leap_year() {
            LEAP_YEAR_FEB_DAYS
        } else {
            DAYS_IN_MONTH[self.month as usize - 1]
        };

        self.day >= 1 && self.day <= max_days
    }

    fn is_leap_year(&self) -> bool {
        if self.year % QUADRENNIAL != 0 {
            return false;
        }
        if self.year % CENTENNIAL == 0 {
            return self.year % QUATERCENTENNIAL == 0;
        }
        true
    }

    /// Convert to a chrono date. `None` for invalid dates.
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    pub fn is_weekend(&self) -> bool {
        self.to_naive()
            .map(|d| matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
            .unwrap_or(false)
    }

    pub fn is_today(&self, today: Date) -> bool {
        *self == today
    }

    pub fn is_before_today(&self, today: Date) -> bool {
        *self < today
    }

    pub fn is_after_today(&self, today: Date) -> bool {
        *self > today
    }

    /// True iff the date is strictly after `today` plus `months` calendar months.
    ///
    /// Month arithmetic clamps to the end of the target month, so
    /// Aug 31 + 6 months is Feb 28 (or 29).
    pub fn is_months_or_more_in_future(&self, today: Date, months: u32) -> bool {
        match today.to_naive().and_then(|t| t.checked_add_months(Months::new(months))) {
            Some(limit) => *self > Date::from(limit),
            // today itself is unrepresentable; nothing can be compared against it
            None => false,
        }
    }

    pub fn is_six_months_or_more_in_future(&self, today: Date) -> bool {
        self.is_months_or_more_in_future(today, 6)
    }
}

impl From<NaiveDate> for Date {
    fn from(value: NaiveDate) -> Self {
        Date::new(value.year(), value.month(), value.day())
    }
}

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.month, self.day, self.year)
    }
}

impl FromStr for Date {
    type Err = ValidationError;

    /// Parse `M/D/YYYY`. The result is not checked with [`Date::is_valid`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ValidationError::MalformedDate(s.to_string());
        let mut parts = s.trim().split('/');

        let month = parts.next().ok_or_else(malformed)?;
        let day = parts.next().ok_or_else(malformed)?;
        let year = parts.next().ok_or_else(malformed)?;
        if parts.next().is_some() {
            return Err(malformed());
        }

        Ok(Date::new(
            year.trim().parse().map_err(|_| malformed())?,
            month.trim().parse().map_err(|_| malformed())?,
            day.trim().parse().map_err(|_| malformed())?,
        ))
    }
}

/// The twelve bookable (hour, minute) pairs, in index order 1..=12.
const SLOTS: [(u32, u32); 12] = [
    (9, 0),
    (9, 30),
    (10, 0),
    (10, 30),
    (11, 0),
    (11, 30),
    (14, 0),
    (14, 30),
    (15, 0),
    (15, 30),
    (16, 0),
    (16, 30),
];

/// Number of appointment slots in a clinic day.
pub const SLOTS_PER_DAY: usize = SLOTS.len();

/// One of the fixed half-hour appointment slots.
///
/// Only the twelve clinic slots can be constructed, so every `Timeslot`
/// value is valid. Ordering is hour then minute, which matches index order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timeslot {
    hour: u32,
    minute: u32,
}

impl Timeslot {
    /// Create a timeslot from a clock time.
    pub fn new(hour: u32, minute: u32) -> Result<Self, ValidationError> {
        if SLOTS.contains(&(hour, minute)) {
            Ok(Timeslot { hour, minute })
        } else {
            Err(ValidationError::InvalidTimeslot { hour, minute })
        }
    }

    /// Create a timeslot from its 1-based index.
    pub fn from_index(index: usize) -> Result<Self, ValidationError> {
        index
            .checked_sub(1)
            .and_then(|i| SLOTS.get(i))
            .map(|&(hour, minute)| Timeslot { hour, minute })
            .ok_or(ValidationError::InvalidTimeslotIndex(index))
    }

    /// All slots of a day in order.
    pub fn all() -> impl Iterator<Item = Timeslot> {
        SLOTS.iter().map(|&(hour, minute)| Timeslot { hour, minute })
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// The 1-based slot index.
    pub fn index(&self) -> usize {
        self.offset() + 1
    }

    /// The 0-based position of this slot in a day, for occupancy vectors.
    pub(crate) fn offset(&self) -> usize {
        SLOTS
            .iter()
            .position(|&slot| slot == (self.hour, self.minute))
            .unwrap_or_default()
    }
}

impl fmt::Display for Timeslot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hour, suffix) = if self.hour > 12 {
            (self.hour - 12, "PM")
        } else {
            (self.hour, "AM")
        };
        write!(f, "{}:{:02} {}", hour, self.minute, suffix)
    }
}

impl FromStr for Timeslot {
    type Err = ValidationError;

    /// Accepts a slot index (`"7"`), a 24-hour time (`"14:00"`) or a
    /// 12-hour time (`"2:00 PM"`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        if let Ok(index) = raw.parse::<usize>() {
            return Timeslot::from_index(index);
        }

        let malformed = || ValidationError::MalformedTimeslot(s.to_string());
        let upper = raw.to_uppercase();
        let (clock, pm) = if let Some(rest) = upper.strip_suffix("PM") {
            (rest.trim(), Some(true))
        } else if let Some(rest) = upper.strip_suffix("AM") {
            (rest.trim(), Some(false))
        } else {
            (upper.as_str(), None)
        };

        let (hour, minute) = clock.split_once(':').ok_or_else(malformed)?;
        let mut hour: u32 = hour.trim().parse().map_err(|_| malformed())?;
        let minute: u32 = minute.trim().parse().map_err(|_| malformed())?;
        if pm == Some(true) && hour < 12 {
            hour += 12;
        }

        Timeslot::new(hour, minute)
    }
}

/// Source of the current date.
///
/// Every relative check (past, future window, DOB in future) goes through
/// a clock so the scheduler can be driven deterministically.
pub trait Clock {
    fn today(&self) -> Date;
}

/// Reads the local wall-clock date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> Date {
        Date::from(Local::now().date_naive())
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub Date);

impl Clock for FixedClock {
    fn today(&self) -> Date {
        self.0
    }
}
