//! Clinic appointment scheduling.
//!
//! Books office visits with doctors and imaging sessions with technicians
//! chosen by round-robin rotation, prevents double booking of patients and
//! slots, and produces ordered reports with billing and provider credit
//! totals.
//!
//! ```no_run
//! use clinicmanager::calendar::{Date, SystemClock, Timeslot};
//! use clinicmanager::config::ClinicConfig;
//! use clinicmanager::models::{Profile, Radiology};
//! use clinicmanager::roster::load_roster;
//! use clinicmanager::scheduler::ClinicScheduler;
//!
//! let config = ClinicConfig::default();
//! let roster = load_roster("providers.txt", &config.location_table()).unwrap();
//! let mut scheduler = ClinicScheduler::from_config(&config, roster.providers, SystemClock);
//!
//! let patient = Profile::new("John", "Doe", Date::new(1989, 12, 13));
//! let slot = Timeslot::from_index(3).unwrap();
//! let booked = scheduler.book_imaging(Date::new(2030, 1, 15), slot, patient, Radiology::Xray);
//! ```

pub mod availability;
pub mod calendar;
pub mod config;
pub mod error;
pub mod models;
pub mod reports;
pub mod roster;
pub mod scheduler;

pub use calendar::{Clock, Date, FixedClock, SystemClock, Timeslot};
pub use config::{ClinicConfig, SchedulingSettings};
pub use error::{BookingError, CapacityError, ConflictError, NotFoundError, RescheduleError, RosterLineError, ValidationError};
pub use models::{Appointment, AppointmentKind, Location, Profile, Provider, ProviderId, Radiology, Specialty};
pub use reports::{AppointmentFilter, BillingLine, CreditLine, SortOrder};
pub use scheduler::ClinicScheduler;
