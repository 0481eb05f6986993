//! Ordered views and money totals over the appointment book.
//!
//! Everything here is read-only over a slice of appointments plus the
//! provider roster they point into. The scheduler decides when a report
//! also clears the book.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::models::{Appointment, Location, Profile, Provider, ProviderId};

/// Report orderings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Date, then timeslot.
    DateTime,
    /// Patient profile, then date and timeslot.
    Patient,
    /// Provider county, city and zip, then date and timeslot.
    Location,
}

/// Which appointment kinds a listing includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppointmentFilter {
    All,
    OfficeOnly,
    ImagingOnly,
}

impl AppointmentFilter {
    pub fn accepts(&self, appointment: &Appointment) -> bool {
        match self {
            AppointmentFilter::All => true,
            AppointmentFilter::OfficeOnly => !appointment.is_imaging(),
            AppointmentFilter::ImagingOnly => appointment.is_imaging(),
        }
    }
}

/// One patient's balance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillingLine {
    pub patient: Profile,
    pub amount_due: u64,
}

/// One provider's earned credit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreditLine {
    pub provider: ProviderId,
    pub profile: Profile,
    pub credit: u64,
}

fn location_of<'a>(providers: &'a [Provider], appointment: &Appointment) -> Option<&'a Location> {
    providers.get(appointment.provider.0).map(Provider::location)
}

// Appointments whose provider is missing from the roster sort last.
fn cmp_locations(a: Option<&Location>, b: Option<&Location>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp_by_address(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Sort appointments in place. The sort is stable.
pub fn sort_appointments(appointments: &mut [Appointment], order: SortOrder, providers: &[Provider]) {
    match order {
        SortOrder::DateTime => appointments.sort_by(Appointment::cmp_by_schedule),
        SortOrder::Patient => appointments.sort_by(|a, b| {
            a.patient
                .cmp(&b.patient)
                .then_with(|| a.cmp_by_schedule(b))
        }),
        SortOrder::Location => appointments.sort_by(|a, b| {
            cmp_locations(location_of(providers, a), location_of(providers, b))
                .then_with(|| a.cmp_by_schedule(b))
        }),
    }
}

/// Filtered, ordered copy of the appointments.
pub fn list_appointments(
    appointments: &[Appointment],
    providers: &[Provider],
    order: SortOrder,
    filter: AppointmentFilter,
) -> Vec<Appointment> {
    let mut listed: Vec<Appointment> = appointments
        .iter()
        .filter(|a| filter.accepts(a))
        .cloned()
        .collect();
    sort_appointments(&mut listed, order, providers);
    listed
}

/// Total each patient's visits at their providers' rates, ordered by patient.
pub fn billing(appointments: &[Appointment], providers: &[Provider]) -> Vec<BillingLine> {
    let mut balances: BTreeMap<&Profile, u64> = BTreeMap::new();
    for appointment in appointments {
        let rate = providers
            .get(appointment.provider.0)
            .map(Provider::rate)
            .unwrap_or_default();
        *balances.entry(&appointment.patient).or_default() += u64::from(rate);
    }

    balances
        .into_iter()
        .map(|(patient, amount_due)| BillingLine {
            patient: patient.clone(),
            amount_due,
        })
        .collect()
}

/// Credit every provider in the roster for their visits, ordered by provider profile.
pub fn credits(appointments: &[Appointment], providers: &[Provider]) -> Vec<CreditLine> {
    let mut lines: Vec<CreditLine> = providers
        .iter()
        .enumerate()
        .map(|(index, provider)| {
            let id = ProviderId(index);
            let visits = appointments.iter().filter(|a| a.provider == id).count() as u64;
            CreditLine {
                provider: id,
                profile: provider.profile().clone(),
                credit: visits * u64::from(provider.rate()),
            }
        })
        .collect();

    lines.sort_by(|a, b| a.profile.cmp(&b.profile));
    lines
}
