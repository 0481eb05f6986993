//! Per-provider occupancy of the twelve daily slots.

use crate::calendar::{Timeslot, SLOTS_PER_DAY};

/// Tracks which of a provider's daily slots are taken.
///
/// The tracker is not keyed by date: a slot booked on one day reads as
/// occupied on every day until it is released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    occupied: [bool; SLOTS_PER_DAY],
}

impl Availability {
    /// All slots start free.
    pub fn new() -> Self {
        Availability {
            occupied: [false; SLOTS_PER_DAY],
        }
    }

    pub fn is_available(&self, timeslot: Timeslot) -> bool {
        !self.occupied[timeslot.offset()]
    }

    /// Mark a slot occupied.
    pub fn book(&mut self, timeslot: Timeslot) {
        self.occupied[timeslot.offset()] = true;
    }

    /// Mark a slot free again.
    pub fn release(&mut self, timeslot: Timeslot) {
        self.occupied[timeslot.offset()] = false;
    }

    /// Number of free slots left.
    pub fn free_count(&self) -> usize {
        self.occupied.iter().filter(|taken| !**taken).count()
    }
}

impl Default for Availability {
    fn default() -> Self {
        Self::new()
    }
}
