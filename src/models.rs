//! Data models for the clinic scheduling system.
//!
//! This module defines the people and bookings the scheduler works with:
//! - Profile: identity of a patient or provider
//! - Specialty / Radiology: doctor specialties and imaging services
//! - Location: a provider's practice city with its county and zip
//! - Provider: a doctor or a technician, with per-kind rate policy
//! - Appointment: a booked office visit or imaging session

use serde::Deserialize;
use std::cmp::Ordering;
use std::fmt;

use crate::availability::Availability;
use crate::calendar::{Date, Timeslot};
use crate::error::ValidationError;

/// Identity of a person: first name, last name, date of birth.
///
/// Ordering is last name, then first name, then date of birth.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: Date,
}

impl Profile {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>, date_of_birth: Date) -> Self {
        Profile {
            first_name: first_name.into(),
            last_name: last_name.into(),
            date_of_birth,
        }
    }

    /// "FIRST LAST", as used to name technicians in the rotation config.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl PartialOrd for Profile {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Profile {
    fn cmp(&self, other: &Self) -> Ordering {
        self.last_name
            .cmp(&other.last_name)
            .then_with(|| self.first_name.cmp(&other.first_name))
            .then_with(|| self.date_of_birth.cmp(&other.date_of_birth))
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.first_name, self.last_name, self.date_of_birth)
    }
}

/// Doctor specialties. The visit rate is fixed per specialty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Specialty {
    Family,
    Pediatrician,
    Allergist,
}

impl Specialty {
    /// Convert a string to a Specialty enum value.
    pub fn from_string(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_uppercase().as_str() {
            "FAMILY" => Ok(Specialty::Family),
            "PEDIATRICIAN" => Ok(Specialty::Pediatrician),
            "ALLERGIST" => Ok(Specialty::Allergist),
            _ => Err(ValidationError::UnknownSpecialty(value.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Specialty::Family => "FAMILY",
            Specialty::Pediatrician => "PEDIATRICIAN",
            Specialty::Allergist => "ALLERGIST",
        }
    }

    /// Charge per office visit, in dollars.
    pub fn rate(&self) -> u32 {
        match self {
            Specialty::Family => 250,
            Specialty::Pediatrician => 300,
            Specialty::Allergist => 350,
        }
    }
}

impl fmt::Display for Specialty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Imaging services, which double as the imaging room tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Radiology {
    Xray,
    Ultrasound,
    Catscan,
}

impl Radiology {
    pub const ALL: [Radiology; 3] = [Radiology::Xray, Radiology::Ultrasound, Radiology::Catscan];

    /// Convert a string to a Radiology enum value.
    pub fn from_string(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_uppercase().as_str() {
            "XRAY" => Ok(Radiology::Xray),
            "ULTRASOUND" => Ok(Radiology::Ultrasound),
            "CATSCAN" => Ok(Radiology::Catscan),
            _ => Err(ValidationError::UnknownService(value.to_string())),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Radiology::Xray => "XRAY",
            Radiology::Ultrasound => "ULTRASOUND",
            Radiology::Catscan => "CATSCAN",
        }
    }
}

impl fmt::Display for Radiology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A practice location. County and zip come from the [`LocationTable`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub city: String,
    pub county: String,
    pub zip: String,
}

impl Location {
    /// Order by county, then city, then zip.
    pub fn cmp_by_address(&self, other: &Location) -> Ordering {
        self.county
            .cmp(&other.county)
            .then_with(|| self.city.cmp(&other.city))
            .then_with(|| self.zip.cmp(&other.zip))
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {} {}", self.city, self.county, self.zip)
    }
}

/// One row of the city lookup table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LocationEntry {
    pub city: String,
    pub county: String,
    pub zip: String,
}

impl LocationEntry {
    pub fn new(city: &str, county: &str, zip: &str) -> Self {
        LocationEntry {
            city: city.to_string(),
            county: county.to_string(),
            zip: zip.to_string(),
        }
    }
}

/// City to (county, zip) lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationTable {
    entries: Vec<LocationEntry>,
}

impl LocationTable {
    pub const UNKNOWN_COUNTY: &'static str = "Unknown";
    pub const UNKNOWN_ZIP: &'static str = "00000";

    pub fn new(entries: Vec<LocationEntry>) -> Self {
        LocationTable { entries }
    }

    /// Resolve a city name, case-insensitively. Unknown cities still
    /// produce a location, with placeholder county and zip.
    pub fn resolve(&self, city: &str) -> Location {
        let city = city.trim();
        match self.entries.iter().find(|e| e.city.eq_ignore_ascii_case(city)) {
            Some(entry) => Location {
                city: city.to_string(),
                county: entry.county.clone(),
                zip: entry.zip.clone(),
            },
            None => Location {
                city: city.to_string(),
                county: Self::UNKNOWN_COUNTY.to_string(),
                zip: Self::UNKNOWN_ZIP.to_string(),
            },
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Doctor-specific fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Doctor {
    pub specialty: Specialty,
    pub npi: String,
}

/// Technician-specific fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Technician {
    pub rate_per_visit: u32,
    pub services: Vec<Radiology>,
    pub availability: Availability,
}

impl Technician {
    pub fn new(rate_per_visit: u32, services: Vec<Radiology>) -> Self {
        Technician {
            rate_per_visit,
            services,
            availability: Availability::new(),
        }
    }

    pub fn can_perform(&self, service: Radiology) -> bool {
        self.services.contains(&service)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderKind {
    Doctor(Doctor),
    Technician(Technician),
}

/// Index of a provider in the scheduler's roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProviderId(pub usize);

/// A doctor or technician with a fixed practice location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provider {
    profile: Profile,
    location: Location,
    kind: ProviderKind,
}

impl Provider {
    pub fn doctor(profile: Profile, location: Location, specialty: Specialty, npi: impl Into<String>) -> Self {
        Provider {
            profile,
            location,
            kind: ProviderKind::Doctor(Doctor {
                specialty,
                npi: npi.into(),
            }),
        }
    }

    pub fn technician(profile: Profile, location: Location, rate_per_visit: u32, services: Vec<Radiology>) -> Self {
        Provider {
            profile,
            location,
            kind: ProviderKind::Technician(Technician::new(rate_per_visit, services)),
        }
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn kind(&self) -> &ProviderKind {
        &self.kind
    }

    /// Charge per visit in dollars: by specialty for doctors, stored for technicians.
    pub fn rate(&self) -> u32 {
        match &self.kind {
            ProviderKind::Doctor(doctor) => doctor.specialty.rate(),
            ProviderKind::Technician(technician) => technician.rate_per_visit,
        }
    }

    pub fn as_doctor(&self) -> Option<&Doctor> {
        match &self.kind {
            ProviderKind::Doctor(doctor) => Some(doctor),
            ProviderKind::Technician(_) => None,
        }
    }

    pub fn as_technician(&self) -> Option<&Technician> {
        match &self.kind {
            ProviderKind::Technician(technician) => Some(technician),
            ProviderKind::Doctor(_) => None,
        }
    }

    pub(crate) fn as_technician_mut(&mut self) -> Option<&mut Technician> {
        match &mut self.kind {
            ProviderKind::Technician(technician) => Some(technician),
            ProviderKind::Doctor(_) => None,
        }
    }

    pub fn is_technician(&self) -> bool {
        self.as_technician().is_some()
    }

    pub fn npi(&self) -> Option<&str> {
        self.as_doctor().map(|d| d.npi.as_str())
    }

    /// Doctors have no slot limit; technicians consult their tracker.
    pub fn is_available(&self, timeslot: Timeslot) -> bool {
        match &self.kind {
            ProviderKind::Doctor(_) => true,
            ProviderKind::Technician(technician) => technician.availability.is_available(timeslot),
        }
    }

    pub fn can_perform(&self, service: Radiology) -> bool {
        self.as_technician()
            .map(|t| t.can_perform(service))
            .unwrap_or(false)
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ProviderKind::Doctor(doctor) => write!(
                f,
                "[{}, {}][{}, #{}]",
                self.profile, self.location, doctor.specialty, doctor.npi
            ),
            ProviderKind::Technician(technician) => write!(
                f,
                "[{}, {}][rate: ${:.2}]",
                self.profile, self.location, technician.rate_per_visit as f64
            ),
        }
    }
}

/// Office visits go to a doctor; imaging carries the room/service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentKind {
    Office,
    Imaging(Radiology),
}

/// A booked appointment.
///
/// Identity is (date, timeslot, patient, provider); the default report
/// order is date then timeslot, see [`crate::reports`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Appointment {
    pub date: Date,
    pub timeslot: Timeslot,
    pub patient: Profile,
    pub provider: ProviderId,
    pub kind: AppointmentKind,
}

impl Appointment {
    pub fn office(date: Date, timeslot: Timeslot, patient: Profile, provider: ProviderId) -> Self {
        Appointment {
            date,
            timeslot,
            patient,
            provider,
            kind: AppointmentKind::Office,
        }
    }

    pub fn imaging(date: Date, timeslot: Timeslot, patient: Profile, provider: ProviderId, room: Radiology) -> Self {
        Appointment {
            date,
            timeslot,
            patient,
            provider,
            kind: AppointmentKind::Imaging(room),
        }
    }

    /// Check if this appointment is the given patient's booking at date and time.
    pub fn matches(&self, date: Date, timeslot: Timeslot, patient: &Profile) -> bool {
        self.date == date && self.timeslot == timeslot && &self.patient == patient
    }

    /// Check if this appointment occupies the given date and time, for anyone.
    pub fn occupies(&self, date: Date, timeslot: Timeslot) -> bool {
        self.date == date && self.timeslot == timeslot
    }

    pub fn is_imaging(&self) -> bool {
        matches!(self.kind, AppointmentKind::Imaging(_))
    }

    pub fn room(&self) -> Option<Radiology> {
        match self.kind {
            AppointmentKind::Imaging(room) => Some(room),
            AppointmentKind::Office => None,
        }
    }

    /// Compare by date, then timeslot.
    pub fn cmp_by_schedule(&self, other: &Appointment) -> Ordering {
        self.date
            .cmp(&other.date)
            .then_with(|| self.timeslot.cmp(&other.timeslot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(first: &str, last: &str, dob: Date) -> Profile {
        Profile::new(first, last, dob)
    }

    fn table() -> LocationTable {
        LocationTable::new(vec![
            LocationEntry::new("BRIDGEWATER", "Somerset", "08807"),
            LocationEntry::new("EDISON", "Middlesex", "08817"),
        ])
    }

    #[test]
    fn test_profile_ordering() {
        let dob = Date::new(1990, 1, 1);
        let adams = profile("John", "Adams", dob);
        let baker_a = profile("Alice", "Baker", dob);
        let baker_b = profile("Bob", "Baker", dob);
        let baker_b_older = profile("Bob", "Baker", Date::new(1980, 1, 1));

        assert!(adams < baker_a);
        assert!(baker_a < baker_b);
        assert!(baker_b_older < baker_b);
        assert_eq!(baker_b, profile("Bob", "Baker", dob));
    }

    #[test]
    fn test_specialty_rates() {
        assert_eq!(Specialty::Family.rate(), 250);
        assert_eq!(Specialty::Pediatrician.rate(), 300);
        assert_eq!(Specialty::Allergist.rate(), 350);
        assert_eq!(Specialty::from_string("allergist").unwrap(), Specialty::Allergist);
        assert!(Specialty::from_string("surgeon").is_err());
    }

    #[test]
    fn test_radiology_from_string() {
        assert_eq!(Radiology::from_string("xray").unwrap(), Radiology::Xray);
        assert_eq!(Radiology::from_string(" CATSCAN ").unwrap(), Radiology::Catscan);
        assert!(Radiology::from_string("MRI").is_err());
    }

    #[test]
    fn test_location_lookup() {
        let table = table();
        let edison = table.resolve("edison");
        assert_eq!(edison.county, "Middlesex");
        assert_eq!(edison.zip, "08817");

        let nowhere = table.resolve("NEWARK");
        assert_eq!(nowhere.county, "Unknown");
        assert_eq!(nowhere.zip, "00000");
        assert_eq!(nowhere.city, "NEWARK");
    }

    #[test]
    fn test_location_address_ordering() {
        let table = table();
        let bridgewater = table.resolve("BRIDGEWATER");
        let edison = table.resolve("EDISON");
        assert_eq!(edison.cmp_by_address(&bridgewater), Ordering::Less);
        assert_eq!(edison.cmp_by_address(&edison), Ordering::Equal);
    }

    #[test]
    fn test_provider_rate_dispatch() {
        let table = table();
        let doctor = Provider::doctor(
            profile("Andrew", "Patel", Date::new(1965, 1, 21)),
            table.resolve("BRIDGEWATER"),
            Specialty::Family,
            "01",
        );
        let technician = Provider::technician(
            profile("Jenny", "Patel", Date::new(1991, 6, 5)),
            table.resolve("BRIDGEWATER"),
            125,
            Radiology::ALL.to_vec(),
        );

        assert_eq!(doctor.rate(), 250);
        assert_eq!(technician.rate(), 125);
        assert_eq!(doctor.npi(), Some("01"));
        assert_eq!(technician.npi(), None);
        assert!(!doctor.can_perform(Radiology::Xray));
        assert!(technician.can_perform(Radiology::Xray));
    }

    #[test]
    fn test_provider_display() {
        let table = table();
        let doctor = Provider::doctor(
            profile("Andrew", "Patel", Date::new(1965, 1, 21)),
            table.resolve("BRIDGEWATER"),
            Specialty::Family,
            "01",
        );
        assert_eq!(
            doctor.to_string(),
            "[Andrew Patel 1/21/1965, BRIDGEWATER, Somerset 08807][FAMILY, #01]"
        );

        let technician = Provider::technician(
            profile("Jenny", "Patel", Date::new(1991, 6, 5)),
            table.resolve("EDISON"),
            125,
            vec![Radiology::Xray],
        );
        assert_eq!(
            technician.to_string(),
            "[Jenny Patel 6/5/1991, EDISON, Middlesex 08817][rate: $125.00]"
        );
    }

    #[test]
    fn test_appointment_matching() {
        let date = Date::new(2024, 10, 15);
        let slot = Timeslot::from_index(3).unwrap();
        let patient = profile("John", "Doe", Date::new(1990, 12, 13));
        let appointment = Appointment::imaging(date, slot, patient.clone(), ProviderId(0), Radiology::Xray);

        assert!(appointment.matches(date, slot, &patient));
        assert!(!appointment.matches(date, Timeslot::from_index(4).unwrap(), &patient));
        assert!(appointment.occupies(date, slot));
        assert!(appointment.is_imaging());
        assert_eq!(appointment.room(), Some(Radiology::Xray));
    }
}
