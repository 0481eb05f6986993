//! Command-line interface for the clinic scheduler.
//!
//! Loads the clinic configuration and provider roster, then runs an
//! interactive menu for booking, cancelling and rescheduling appointments
//! and printing the appointment and financial reports.
//!
//! Usage: `clinicmanager [CONFIG.toml]`. `RUST_LOG` sets the log level
//! (default: info).

use anyhow::Context;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use clinicmanager::calendar::{Date, SystemClock, Timeslot};
use clinicmanager::config::ClinicConfig;
use clinicmanager::models::{Appointment, Profile, ProviderKind, Radiology};
use clinicmanager::reports::{AppointmentFilter, SortOrder};
use clinicmanager::roster::load_roster;
use clinicmanager::scheduler::ClinicScheduler;

const DEFAULT_ROSTER: &str = "providers.txt";

struct ClinicCLI {
    scheduler: ClinicScheduler,
    running: bool,
}

impl ClinicCLI {
    fn new(scheduler: ClinicScheduler) -> Self {
        ClinicCLI {
            scheduler,
            running: true,
        }
    }

    fn print_header(&self) {
        println!("\n{}", "=".repeat(60));
        println!("       CLINIC MANAGER");
        println!("{}", "=".repeat(60));

        let settings = self.scheduler.settings();
        println!(
            "Today is {}. Bookings open {} months ahead.",
            self.scheduler.today(),
            settings.booking_window_months
        );
        if settings.release_slot_on_cancel {
            println!("Cancelled imaging slots are released to the technician.");
        }
    }

    fn print_menu(&self) {
        println!("\n--- Main Menu ---");
        println!(" 1. Book office visit");
        println!(" 2. Book imaging");
        println!(" 3. Cancel appointment");
        println!(" 4. Reschedule appointment");
        println!(" 5. List by date/time");
        println!(" 6. List by patient");
        println!(" 7. List by location");
        println!(" 8. List office visits");
        println!(" 9. List imaging");
        println!("10. Billing statement (clears appointments)");
        println!("11. Provider credits");
        println!("12. Providers and rotation");
        println!(" 0. Exit");
        println!("{}", "-".repeat(20));
    }

    /// Read one trimmed line. Stops the CLI on end of input.
    fn get_input(&mut self, prompt: &str) -> Option<String> {
        print!("{}: ", prompt);
        if io::stdout().flush().is_err() {
            self.running = false;
            return None;
        }

        let mut input = String::new();
        match io::stdin().lock().read_line(&mut input) {
            Ok(0) | Err(_) => {
                self.running = false;
                None
            }
            Ok(_) => Some(input.trim().to_string()),
        }
    }

    fn get_name(&mut self, prompt: &str) -> Option<String> {
        let name = self.get_input(prompt)?;
        if name.is_empty() || !name.chars().all(|c| c.is_alphabetic()) {
            println!("{} must contain only letters", prompt);
            return None;
        }
        Some(name)
    }

    fn get_date(&mut self, prompt: &str) -> Option<Date> {
        let raw = self.get_input(&format!("{} (M/D/YYYY)", prompt))?;
        match raw.parse::<Date>() {
            Ok(date) => Some(date),
            Err(e) => {
                println!("{}", e);
                None
            }
        }
    }

    fn get_timeslot(&mut self, prompt: &str) -> Option<Timeslot> {
        let raw = self.get_input(&format!("{} (1-12 or e.g. 2:30 PM)", prompt))?;
        match raw.parse::<Timeslot>() {
            Ok(slot) => Some(slot),
            Err(e) => {
                println!("{}", e);
                None
            }
        }
    }

    fn get_patient(&mut self) -> Option<Profile> {
        let first = self.get_name("First name")?;
        let last = self.get_name("Last name")?;
        let dob = self.get_date("Date of birth")?;
        Some(Profile::new(first, last, dob))
    }

    fn describe(&self, appointment: &Appointment) -> String {
        let provider = self
            .scheduler
            .provider(appointment.provider)
            .map(|p| p.to_string())
            .unwrap_or_default();
        let mut line = format!(
            "{} {} {} {}",
            appointment.date, appointment.timeslot, appointment.patient, provider
        );
        if let Some(room) = appointment.room() {
            line.push_str(&format!("[{}]", room));
        }
        line
    }

    fn book_office_visit(&mut self) {
        println!("\n--- Book Office Visit ---");
        let Some(date) = self.get_date("Appointment date") else { return };
        let Some(timeslot) = self.get_timeslot("Time slot") else { return };
        let Some(patient) = self.get_patient() else { return };
        let Some(npi) = self.get_input("Doctor NPI") else { return };

        match self.scheduler.book_office_visit(date, timeslot, patient, &npi) {
            Ok(appointment) => println!("{} booked.", self.describe(&appointment)),
            Err(e) => println!("{}", e),
        }
    }

    fn book_imaging(&mut self) {
        println!("\n--- Book Imaging ---");
        let Some(date) = self.get_date("Appointment date") else { return };
        let Some(timeslot) = self.get_timeslot("Time slot") else { return };
        let Some(patient) = self.get_patient() else { return };
        let Some(raw) = self.get_input("Service (XRAY, ULTRASOUND, CATSCAN)") else { return };
        let service = match Radiology::from_string(&raw) {
            Ok(service) => service,
            Err(e) => {
                println!("{}", e);
                return;
            }
        };

        match self.scheduler.book_imaging(date, timeslot, patient, service) {
            Ok(appointment) => println!("{} booked.", self.describe(&appointment)),
            Err(e) => println!("{}", e),
        }
    }

    fn cancel_appointment(&mut self) {
        println!("\n--- Cancel Appointment ---");
        let Some(date) = self.get_date("Appointment date") else { return };
        let Some(timeslot) = self.get_timeslot("Time slot") else { return };
        let Some(patient) = self.get_patient() else { return };

        match self.scheduler.cancel(date, timeslot, &patient) {
            Ok(_) => println!("{} {} {} - appointment has been canceled.", date, timeslot, patient),
            Err(e) => println!("{}", e),
        }
    }

    fn reschedule_appointment(&mut self) {
        println!("\n--- Reschedule Appointment ---");
        let Some(date) = self.get_date("Appointment date") else { return };
        let Some(old_slot) = self.get_timeslot("Current time slot") else { return };
        let Some(new_slot) = self.get_timeslot("New time slot") else { return };
        let Some(patient) = self.get_patient() else { return };

        match self.scheduler.reschedule(date, old_slot, new_slot, &patient) {
            Ok(appointment) => println!("Rescheduled to {}", self.describe(&appointment)),
            Err(e) => println!("{}", e),
        }
    }

    fn print_appointments(&self, title: &str, order: SortOrder, filter: AppointmentFilter) {
        let appointments = self.scheduler.list_appointments(order, filter);
        if appointments.is_empty() {
            println!("\nSchedule calendar is empty.");
            return;
        }

        println!("\n** {} **", title);
        for appointment in &appointments {
            println!("{}", self.describe(appointment));
        }
        println!("** end of list **");
    }

    fn print_billing(&mut self) {
        if self.scheduler.appointments().is_empty() {
            println!("\nSchedule calendar is empty.");
            return;
        }

        println!("\n** Billing statement ordered by patient. **");
        for (i, line) in self.scheduler.billing_statement().iter().enumerate() {
            println!("({}) {} [due: ${:.2}]", i + 1, line.patient, line.amount_due as f64);
        }
        println!("** end of list **");
    }

    fn print_credits(&self) {
        if self.scheduler.appointments().is_empty() {
            println!("\nSchedule calendar is empty.");
            return;
        }

        println!("\n** Credit amount ordered by provider. **");
        for (i, line) in self.scheduler.provider_credits().iter().enumerate() {
            let provider = self
                .scheduler
                .provider(line.provider)
                .map(|p| p.to_string())
                .unwrap_or_default();
            println!("({}) {} [credit amount: ${:.2}]", i + 1, provider, line.credit as f64);
        }
        println!("** end of list **");
    }

    fn print_providers(&self) {
        let mut providers: Vec<_> = self.scheduler.providers().iter().collect();
        providers.sort_by(|a, b| a.profile().cmp(b.profile()));

        println!("\n--- Providers ({}) ---", providers.len());
        for provider in providers {
            match provider.kind() {
                ProviderKind::Technician(tech) => {
                    println!("{} [free slots: {}]", provider, tech.availability.free_count())
                }
                ProviderKind::Doctor(_) => println!("{}", provider),
            }
        }

        let rotation: Vec<String> = self
            .scheduler
            .rotation()
            .map(|(_, tech)| {
                format!(
                    "{} ({})",
                    tech.profile().full_name(),
                    tech.location().county.to_uppercase()
                )
            })
            .collect();
        println!("\nRotation list for the technicians:");
        println!("{}", rotation.join(" --> "));
    }

    fn run(&mut self) {
        self.print_header();

        while self.running {
            self.print_menu();

            let Some(choice) = self.get_input("Enter choice") else { break };

            match choice.as_str() {
                "1" => self.book_office_visit(),
                "2" => self.book_imaging(),
                "3" => self.cancel_appointment(),
                "4" => self.reschedule_appointment(),
                "5" => self.print_appointments(
                    "List of appointments, ordered by date/time",
                    SortOrder::DateTime,
                    AppointmentFilter::All,
                ),
                "6" => self.print_appointments(
                    "List of appointments, ordered by patient",
                    SortOrder::Patient,
                    AppointmentFilter::All,
                ),
                "7" => self.print_appointments(
                    "List of appointments, ordered by county/date/time",
                    SortOrder::Location,
                    AppointmentFilter::All,
                ),
                "8" => self.print_appointments(
                    "List of office appointments ordered by county/date/time",
                    SortOrder::Location,
                    AppointmentFilter::OfficeOnly,
                ),
                "9" => self.print_appointments(
                    "List of radiology appointments ordered by county/date/time",
                    SortOrder::Location,
                    AppointmentFilter::ImagingOnly,
                ),
                "10" => self.print_billing(),
                "11" => self.print_credits(),
                "12" => self.print_providers(),
                "0" => {
                    self.running = false;
                    println!("\nClinic Manager terminated.");
                }
                _ => println!("Invalid choice"),
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = match env::args().nth(1) {
        Some(path) => ClinicConfig::load(&path).with_context(|| format!("loading config {}", path))?,
        None => {
            info!("No config file given; using defaults");
            ClinicConfig::default()
        }
    };

    let roster_path = config
        .roster
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROSTER));
    let roster = load_roster(&roster_path, &config.location_table())?;
    if roster.skipped > 0 {
        warn!(skipped = roster.skipped, "Some roster lines were skipped");
    }

    let scheduler = ClinicScheduler::from_config(&config, roster.providers, SystemClock);
    let mut cli = ClinicCLI::new(scheduler);
    cli.print_providers();
    cli.run();

    Ok(())
}
