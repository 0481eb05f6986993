//! Booking engine with round-robin technician assignment.
//!
//! This module provides the ClinicScheduler struct which owns the provider
//! roster and the appointment book, validates every request against the
//! booking window and both sides of a double booking (the patient's own
//! schedule and the provider's slots), and assigns imaging work to
//! technicians in a fixed rotation.

use tracing::{debug, info, warn};

use crate::calendar::{Clock, Date, SystemClock, Timeslot};
use crate::config::{ClinicConfig, SchedulingSettings};
use crate::error::{
    BookingError, CapacityError, ConflictError, NotFoundError, RescheduleError, ValidationError,
};
use crate::models::{Appointment, Profile, Provider, ProviderId, Radiology};
use crate::reports::{self, AppointmentFilter, BillingLine, CreditLine, SortOrder};

/// Clinic appointment scheduler.
///
/// Appointments are kept in insertion order; reports sort copies. The
/// rotation cursor persists across bookings so each imaging request picks
/// up where the previous scan stopped.
pub struct ClinicScheduler<C: Clock = SystemClock> {
    providers: Vec<Provider>,
    appointments: Vec<Appointment>,
    rotation: Vec<ProviderId>,
    cursor: usize,
    settings: SchedulingSettings,
    clock: C,
}

impl<C: Clock> ClinicScheduler<C> {
    /// Initialize the scheduler with a roster, built once at startup.
    pub fn new(providers: Vec<Provider>, settings: &SchedulingSettings, clock: C) -> Self {
        let rotation = build_rotation(&providers, &settings.rotation);
        info!(
            providers = providers.len(),
            technicians = rotation.len(),
            "Scheduler initialized"
        );

        ClinicScheduler {
            providers,
            appointments: Vec::new(),
            rotation,
            cursor: 0,
            settings: settings.clone(),
            clock,
        }
    }

    pub fn from_config(config: &ClinicConfig, providers: Vec<Provider>, clock: C) -> Self {
        Self::new(providers, &config.scheduling, clock)
    }

    pub fn providers(&self) -> &[Provider] {
        &self.providers
    }

    pub fn provider(&self, id: ProviderId) -> Option<&Provider> {
        self.providers.get(id.0)
    }

    /// Technicians in rotation order.
    pub fn rotation(&self) -> impl Iterator<Item = (ProviderId, &Provider)> {
        self.rotation.iter().map(move |&id| (id, &self.providers[id.0]))
    }

    /// Position in the rotation where the next imaging scan starts.
    pub fn rotation_cursor(&self) -> usize {
        self.cursor
    }

    /// All appointments in booking order.
    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    pub fn settings(&self) -> &SchedulingSettings {
        &self.settings
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    /// Find the doctor with the given NPI.
    pub fn find_doctor(&self, npi: &str) -> Option<ProviderId> {
        self.providers
            .iter()
            .position(|p| p.npi() == Some(npi))
            .map(ProviderId)
    }

    /// Book an office visit with the doctor identified by `npi`.
    pub fn book_office_visit(
        &mut self,
        date: Date,
        timeslot: Timeslot,
        patient: Profile,
        npi: &str,
    ) -> Result<Appointment, BookingError> {
        self.try_book_office_visit(date, timeslot, patient, npi)
            .inspect_err(|e| warn!(%e, "Office visit rejected"))
    }

    fn try_book_office_visit(
        &mut self,
        date: Date,
        timeslot: Timeslot,
        patient: Profile,
        npi: &str,
    ) -> Result<Appointment, BookingError> {
        let today = self.clock.today();
        self.validate_appointment_date(date, today)?;
        validate_patient(&patient, today)?;

        let provider = self
            .find_doctor(npi)
            .ok_or_else(|| NotFoundError::UnknownProvider(npi.to_string()))?;
        self.check_patient_free(date, timeslot, &patient)?;

        let appointment = Appointment::office(date, timeslot, patient, provider);
        self.appointments.push(appointment.clone());
        info!(
            date = %date,
            timeslot = %timeslot,
            patient = %appointment.patient,
            npi,
            "Office visit booked"
        );
        Ok(appointment)
    }

    /// Book an imaging session with the next qualifying technician in rotation.
    pub fn book_imaging(
        &mut self,
        date: Date,
        timeslot: Timeslot,
        patient: Profile,
        service: Radiology,
    ) -> Result<Appointment, BookingError> {
        self.try_book_imaging(date, timeslot, patient, service)
            .inspect_err(|e| warn!(%e, "Imaging rejected"))
    }

    fn try_book_imaging(
        &mut self,
        date: Date,
        timeslot: Timeslot,
        patient: Profile,
        service: Radiology,
    ) -> Result<Appointment, BookingError> {
        let today = self.clock.today();
        self.validate_appointment_date(date, today)?;
        validate_patient(&patient, today)?;
        self.check_patient_free(date, timeslot, &patient)?;

        let technician = self
            .next_technician(timeslot, service)
            .ok_or(CapacityError::NoTechnicianAvailable { service, timeslot })?;

        if let Some(tech) = self.providers[technician.0].as_technician_mut() {
            tech.availability.book(timeslot);
        }

        let appointment = Appointment::imaging(date, timeslot, patient, technician, service);
        self.appointments.push(appointment.clone());
        info!(
            date = %date,
            timeslot = %timeslot,
            patient = %appointment.patient,
            technician = %self.providers[technician.0].profile().full_name(),
            service = %service,
            "Imaging booked"
        );
        Ok(appointment)
    }

    /// Cancel the patient's appointment at the given date and time.
    pub fn cancel(
        &mut self,
        date: Date,
        timeslot: Timeslot,
        patient: &Profile,
    ) -> Result<Appointment, NotFoundError> {
        let index = self
            .find_appointment(date, timeslot, patient)
            .ok_or_else(|| NotFoundError::AppointmentMissing {
                date,
                timeslot,
                patient: patient.clone(),
            })
            .inspect_err(|e| warn!(%e, "Cancel rejected"))?;

        let appointment = self.appointments.remove(index);
        if self.settings.release_slot_on_cancel {
            self.release_slot(appointment.provider, timeslot);
        }

        info!(date = %date, timeslot = %timeslot, patient = %patient, "Appointment cancelled");
        Ok(appointment)
    }

    /// Move the patient's appointment on `date` from `old_slot` to `new_slot`.
    ///
    /// The new slot must be free for everyone on that date, not just for
    /// this patient. The provider and appointment kind are kept.
    pub fn reschedule(
        &mut self,
        date: Date,
        old_slot: Timeslot,
        new_slot: Timeslot,
        patient: &Profile,
    ) -> Result<Appointment, RescheduleError> {
        self.try_reschedule(date, old_slot, new_slot, patient)
            .inspect_err(|e| warn!(%e, "Reschedule rejected"))
    }

    fn try_reschedule(
        &mut self,
        date: Date,
        old_slot: Timeslot,
        new_slot: Timeslot,
        patient: &Profile,
    ) -> Result<Appointment, RescheduleError> {
        let today = self.clock.today();
        self.validate_appointment_date(date, today)?;
        validate_patient(patient, today)?;

        let index = self
            .find_appointment(date, old_slot, patient)
            .ok_or_else(|| NotFoundError::AppointmentMissing {
                date,
                timeslot: old_slot,
                patient: patient.clone(),
            })?;

        self.check_patient_free(date, new_slot, patient)?;
        if self.appointments.iter().any(|a| a.occupies(date, new_slot)) {
            return Err(ConflictError::SlotOccupied {
                date,
                timeslot: new_slot,
            }
            .into());
        }

        let old = self.appointments.remove(index);
        if self.settings.release_slot_on_cancel {
            self.release_slot(old.provider, old_slot);
        }
        if let Some(tech) = self.providers[old.provider.0].as_technician_mut() {
            tech.availability.book(new_slot);
        }

        let appointment = Appointment {
            timeslot: new_slot,
            ..old
        };
        self.appointments.push(appointment.clone());
        info!(
            date = %date,
            from = %old_slot,
            to = %new_slot,
            patient = %patient,
            "Appointment rescheduled"
        );
        Ok(appointment)
    }

    /// Ordered, filtered copy of the appointment book.
    pub fn list_appointments(&self, order: SortOrder, filter: AppointmentFilter) -> Vec<Appointment> {
        reports::list_appointments(&self.appointments, &self.providers, order, filter)
    }

    /// Patient balances without touching the appointment book.
    pub fn preview_billing(&self) -> Vec<BillingLine> {
        reports::billing(&self.appointments, &self.providers)
    }

    /// Patient balances; the billed appointments are then cleared.
    pub fn billing_statement(&mut self) -> Vec<BillingLine> {
        let statement = self.preview_billing();
        let billed = self.appointments.len();
        self.appointments.clear();
        info!(billed, patients = statement.len(), "Billing statement issued; appointments cleared");
        statement
    }

    /// Credit owed to each provider for the current appointments.
    pub fn provider_credits(&self) -> Vec<CreditLine> {
        reports::credits(&self.appointments, &self.providers)
    }

    fn validate_appointment_date(&self, date: Date, today: Date) -> Result<(), ValidationError> {
        let months = self.settings.booking_window_months;
        if !date.is_valid() {
            Err(ValidationError::InvalidDate(date))
        } else if date.is_months_or_more_in_future(today, months) {
            Err(ValidationError::TooFarInFuture(date, months))
        } else if date.is_before_today(today) {
            Err(ValidationError::InPast(date))
        } else {
            Ok(())
        }
    }

    fn check_patient_free(&self, date: Date, timeslot: Timeslot, patient: &Profile) -> Result<(), ConflictError> {
        match self.find_appointment(date, timeslot, patient) {
            Some(_) => Err(ConflictError::PatientDoubleBooked {
                date,
                timeslot,
                patient: patient.clone(),
            }),
            None => Ok(()),
        }
    }

    fn find_appointment(&self, date: Date, timeslot: Timeslot, patient: &Profile) -> Option<usize> {
        self.appointments
            .iter()
            .position(|a| a.matches(date, timeslot, patient))
    }

    /// Scan the rotation once, starting at the cursor, for a technician who
    /// is free at `timeslot` and performs `service`. The cursor advances on
    /// every step, including the one that finds a match.
    fn next_technician(&mut self, timeslot: Timeslot, service: Radiology) -> Option<ProviderId> {
        if self.rotation.is_empty() {
            return None;
        }

        let start = self.cursor;
        loop {
            let candidate = self.rotation[self.cursor];
            self.cursor = (self.cursor + 1) % self.rotation.len();

            let provider = &self.providers[candidate.0];
            if provider.is_available(timeslot) && provider.can_perform(service) {
                return Some(candidate);
            }
            debug!(
                technician = %provider.profile().full_name(),
                timeslot = %timeslot,
                service = %service,
                "Technician skipped"
            );

            if self.cursor == start {
                return None;
            }
        }
    }

    /// Free a technician's slot unless another of their appointments still
    /// holds it. The tracker is not keyed by date, so any date counts.
    fn release_slot(&mut self, provider: ProviderId, timeslot: Timeslot) {
        let still_held = self
            .appointments
            .iter()
            .any(|a| a.provider == provider && a.timeslot == timeslot);
        if still_held {
            debug!(provider = provider.0, timeslot = %timeslot, "Slot still held; not released");
            return;
        }

        if let Some(tech) = self.providers.get_mut(provider.0).and_then(Provider::as_technician_mut) {
            tech.availability.release(timeslot);
        }
    }
}

fn validate_patient(patient: &Profile, today: Date) -> Result<(), ValidationError> {
    let dob = patient.date_of_birth;
    if !dob.is_valid() {
        Err(ValidationError::InvalidBirthDate(dob))
    } else if dob.is_after_today(today) {
        Err(ValidationError::BirthDateInFuture(dob))
    } else {
        Ok(())
    }
}

/// Technicians in configured order; unlisted ones follow in roster order.
fn build_rotation(providers: &[Provider], order: &[String]) -> Vec<ProviderId> {
    let mut technicians: Vec<(usize, ProviderId)> = providers
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_technician())
        .map(|(index, p)| {
            let name = p.profile().full_name();
            let rank = order
                .iter()
                .position(|n| n.trim().eq_ignore_ascii_case(&name))
                .unwrap_or(order.len());
            (rank, ProviderId(index))
        })
        .collect();

    technicians.sort_by_key(|(rank, _)| *rank);
    technicians.into_iter().map(|(_, id)| id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixedClock;
    use crate::models::{LocationEntry, LocationTable, Specialty};

    const TODAY: Date = Date::new(2024, 10, 1);

    fn table() -> LocationTable {
        LocationTable::new(vec![
            LocationEntry::new("BRIDGEWATER", "Somerset", "08807"),
            LocationEntry::new("EDISON", "Middlesex", "08817"),
        ])
    }

    fn technician(first: &str, last: &str, city: &str, services: Vec<Radiology>) -> Provider {
        Provider::technician(Profile::new(first, last, Date::new(1990, 1, 1)), table().resolve(city), 100, services)
    }

    fn scheduler(providers: Vec<Provider>, rotation: &[&str]) -> ClinicScheduler<FixedClock> {
        let settings = SchedulingSettings {
            rotation: rotation.iter().map(|s| s.to_string()).collect(),
            ..SchedulingSettings::default()
        };
        ClinicScheduler::new(providers, &settings, FixedClock(TODAY))
    }

    fn patient() -> Profile {
        Profile::new("John", "Doe", Date::new(1990, 12, 13))
    }

    fn slot(index: usize) -> Timeslot {
        Timeslot::from_index(index).unwrap()
    }

    #[test]
    fn test_rotation_follows_configured_order_then_roster() {
        let providers = vec![
            Provider::doctor(patient(), table().resolve("EDISON"), Specialty::Family, "01"),
            technician("Frank", "Lin", "EDISON", Radiology::ALL.to_vec()),
            technician("Ben", "Jerry", "EDISON", Radiology::ALL.to_vec()),
            technician("Jenny", "Patel", "BRIDGEWATER", Radiology::ALL.to_vec()),
        ];
        let scheduler = scheduler(providers, &["JENNY PATEL", "BEN JERRY"]);
        let names: Vec<String> = scheduler.rotation().map(|(_, p)| p.profile().full_name()).collect();
        assert_eq!(names, vec!["Jenny Patel", "Ben Jerry", "Frank Lin"]);
    }

    #[test]
    fn test_rotation_defaults_to_roster_order() {
        let providers = vec![
            technician("Frank", "Lin", "EDISON", Radiology::ALL.to_vec()),
            technician("Ben", "Jerry", "EDISON", Radiology::ALL.to_vec()),
        ];
        let scheduler = scheduler(providers, &[]);
        let ids: Vec<ProviderId> = scheduler.rotation().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![ProviderId(0), ProviderId(1)]);
    }

    #[test]
    fn test_scan_skips_incapable_and_busy_technicians() {
        let providers = vec![
            technician("A", "One", "EDISON", vec![Radiology::Ultrasound]),
            technician("B", "Two", "EDISON", Radiology::ALL.to_vec()),
            technician("C", "Three", "EDISON", Radiology::ALL.to_vec()),
        ];
        let mut scheduler = scheduler(providers, &[]);
        let date = Date::new(2024, 10, 15);

        // A cannot x-ray: B is chosen and the cursor lands on C
        let first = scheduler
            .book_imaging(date, slot(1), patient(), Radiology::Xray)
            .unwrap();
        assert_eq!(first.provider, ProviderId(1));
        assert_eq!(scheduler.rotation_cursor(), 2);

        // same slot, another patient: C is next and free
        let second = scheduler
            .book_imaging(date, slot(1), Profile::new("Jane", "Roe", Date::new(1985, 3, 3)), Radiology::Xray)
            .unwrap();
        assert_eq!(second.provider, ProviderId(2));
        assert_eq!(scheduler.rotation_cursor(), 0);

        // B and C are busy at slot 1 and A cannot x-ray: full scan fails
        let third = scheduler.book_imaging(date, slot(1), Profile::new("Max", "Poe", Date::new(1970, 7, 7)), Radiology::Xray);
        assert!(matches!(third, Err(BookingError::Capacity(_))));
        assert_eq!(scheduler.rotation_cursor(), 0);
    }

    #[test]
    fn test_imaging_without_technicians() {
        let mut scheduler = scheduler(Vec::new(), &[]);
        let result = scheduler.book_imaging(Date::new(2024, 10, 15), slot(1), patient(), Radiology::Catscan);
        assert_eq!(
            result,
            Err(BookingError::Capacity(CapacityError::NoTechnicianAvailable {
                service: Radiology::Catscan,
                timeslot: slot(1),
            }))
        );
    }

    #[test]
    fn test_release_on_cancel_when_configured() {
        let settings = SchedulingSettings {
            release_slot_on_cancel: true,
            ..SchedulingSettings::default()
        };
        let providers = vec![technician("A", "One", "EDISON", Radiology::ALL.to_vec())];
        let mut scheduler = ClinicScheduler::new(providers, &settings, FixedClock(TODAY));
        let date = Date::new(2024, 10, 15);

        scheduler.book_imaging(date, slot(4), patient(), Radiology::Xray).unwrap();
        assert!(!scheduler.providers()[0].is_available(slot(4)));

        scheduler.cancel(date, slot(4), &patient()).unwrap();
        assert!(scheduler.providers()[0].is_available(slot(4)));
    }

    #[test]
    fn test_release_keeps_slot_held_on_another_date() {
        let settings = SchedulingSettings {
            release_slot_on_cancel: true,
            ..SchedulingSettings::default()
        };
        let providers = vec![technician("A", "One", "EDISON", Radiology::ALL.to_vec())];
        let mut scheduler = ClinicScheduler::new(providers, &settings, FixedClock(TODAY));
        let first_day = Date::new(2024, 10, 15);
        let second_day = Date::new(2024, 10, 16);
        let ann = Profile::new("Ann", "Lee", Date::new(1980, 8, 8));
        let bob = Profile::new("Bob", "Roe", Date::new(1985, 3, 3));
        let cal = Profile::new("Cal", "Poe", Date::new(1970, 7, 7));

        scheduler.book_imaging(first_day, slot(1), ann.clone(), Radiology::Xray).unwrap();
        scheduler.book_imaging(second_day, slot(2), bob.clone(), Radiology::Xray).unwrap();
        scheduler.reschedule(second_day, slot(2), slot(1), &bob).unwrap();

        // Bob still holds slot 1 with this technician after Ann leaves
        scheduler.cancel(first_day, slot(1), &ann).unwrap();
        assert!(!scheduler.providers()[0].is_available(slot(1)));

        let result = scheduler.book_imaging(second_day, slot(1), cal, Radiology::Xray);
        assert!(matches!(result, Err(BookingError::Capacity(_))));
        let holders = scheduler
            .appointments()
            .iter()
            .filter(|a| a.occupies(second_day, slot(1)))
            .count();
        assert_eq!(holders, 1);

        // the last holder leaving frees it
        scheduler.cancel(second_day, slot(1), &bob).unwrap();
        assert!(scheduler.providers()[0].is_available(slot(1)));
    }

    #[test]
    fn test_cancel_keeps_slot_by_default() {
        let providers = vec![technician("A", "One", "EDISON", Radiology::ALL.to_vec())];
        let mut scheduler = scheduler(providers, &[]);
        let date = Date::new(2024, 10, 15);

        scheduler.book_imaging(date, slot(4), patient(), Radiology::Xray).unwrap();
        scheduler.cancel(date, slot(4), &patient()).unwrap();
        assert!(!scheduler.providers()[0].is_available(slot(4)));
    }

    #[test]
    fn test_reschedule_imaging_keeps_room_and_books_new_slot() {
        let providers = vec![technician("A", "One", "EDISON", Radiology::ALL.to_vec())];
        let mut scheduler = scheduler(providers, &[]);
        let date = Date::new(2024, 10, 15);

        scheduler.book_imaging(date, slot(2), patient(), Radiology::Ultrasound).unwrap();
        let moved = scheduler.reschedule(date, slot(2), slot(9), &patient()).unwrap();

        assert_eq!(moved.room(), Some(Radiology::Ultrasound));
        assert_eq!(moved.provider, ProviderId(0));
        assert!(!scheduler.providers()[0].is_available(slot(9)));
        assert_eq!(scheduler.appointments().len(), 1);
    }

    #[test]
    fn test_booking_window_is_configurable() {
        let settings = SchedulingSettings {
            booking_window_months: 1,
            ..SchedulingSettings::default()
        };
        let providers = vec![Provider::doctor(patient(), table().resolve("EDISON"), Specialty::Family, "01")];
        let mut scheduler = ClinicScheduler::new(providers, &settings, FixedClock(TODAY));

        let result = scheduler.book_office_visit(Date::new(2024, 11, 2), slot(1), patient(), "01");
        assert_eq!(
            result,
            Err(BookingError::Validation(ValidationError::TooFarInFuture(Date::new(2024, 11, 2), 1)))
        );
        assert!(scheduler
            .book_office_visit(Date::new(2024, 11, 1), slot(1), patient(), "01")
            .is_ok());
    }
}
