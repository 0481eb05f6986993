//! Error types for the clinic scheduler.
//!
//! Every rejected request comes back as one of these values; the engine
//! never aborts on malformed input. The booking and reschedule paths wrap
//! the taxonomy (validation, conflict, not-found, capacity) in a single
//! enum per operation so callers can match on the category.

use std::path::PathBuf;
use thiserror::Error;

use crate::calendar::{Date, Timeslot};
use crate::models::{Profile, Radiology};

/// Malformed or out-of-range input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid date: {0}")]
    InvalidDate(Date),

    #[error("Appointment date {0} is more than {1} months in the future")]
    TooFarInFuture(Date, u32),

    #[error("Appointment date {0} is in the past")]
    InPast(Date),

    #[error("Invalid birth date: {0}")]
    InvalidBirthDate(Date),

    #[error("Patient date of birth {0} cannot be in the future")]
    BirthDateInFuture(Date),

    #[error("Invalid time slot {hour}:{minute:02}")]
    InvalidTimeslot { hour: u32, minute: u32 },

    #[error("Invalid time slot index {0}; must be 1-12")]
    InvalidTimeslotIndex(usize),

    #[error("Cannot parse date '{0}'; expected M/D/YYYY")]
    MalformedDate(String),

    #[error("Cannot parse time slot '{0}'")]
    MalformedTimeslot(String),

    #[error("Unknown specialty '{0}'")]
    UnknownSpecialty(String),

    #[error("Unknown imaging service '{0}'")]
    UnknownService(String),
}

/// The requested slot is already taken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    #[error("{patient} already has an appointment on {date} at {timeslot}")]
    PatientDoubleBooked {
        date: Date,
        timeslot: Timeslot,
        patient: Profile,
    },

    #[error("Time slot {date} {timeslot} is already occupied")]
    SlotOccupied { date: Date, timeslot: Timeslot },
}

/// A referenced provider or appointment does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotFoundError {
    #[error("{0} - provider doesn't exist")]
    UnknownProvider(String),

    #[error("{date} {timeslot} {patient} does not exist")]
    AppointmentMissing {
        date: Date,
        timeslot: Timeslot,
        patient: Profile,
    },
}

/// No technician can take the imaging request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CapacityError {
    #[error("No available technician for {service} at {timeslot}")]
    NoTechnicianAvailable {
        service: Radiology,
        timeslot: Timeslot,
    },
}

/// Outcome of a failed office-visit or imaging booking.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

/// Outcome of a failed reschedule.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RescheduleError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error(transparent)]
    NotFound(#[from] NotFoundError),
}

/// Failure reading the provider roster.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Cannot read roster file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a roster line could not be turned into a provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RosterLineError {
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields { expected: usize, found: usize },

    #[error("invalid date of birth {0}")]
    InvalidBirthDate(Date),

    #[error("doctor record needs a specialty and an NPI")]
    MissingDoctorFields,

    #[error("technician record needs a rate")]
    MissingRate,

    #[error("invalid rate '{0}'")]
    InvalidRate(String),

    #[error("unknown provider kind '{0}'")]
    UnknownKind(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Failure loading the clinic configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
