//! Provider roster loading.
//!
//! The roster is a whitespace-separated text feed, one provider per line:
//!
//! ```text
//! D ANDREW PATEL 1/21/1989 BRIDGEWATER FAMILY 01
//! T JENNY PATEL 6/5/1991 BRIDGEWATER 125
//! T FRANK LIN 9/20/1997 PISCATAWAY 150 XRAY,CATSCAN
//! ```
//!
//! Technicians perform every imaging service unless a comma-separated
//! service list is given. Malformed lines are skipped with a warning so one
//! bad record does not block the clinic from starting.

use std::fs;
use std::path::Path;
use tracing::{info, warn};

use crate::calendar::Date;
use crate::error::{RosterError, RosterLineError};
use crate::models::{LocationTable, Profile, Provider, Radiology, Specialty};

const MIN_TOKENS: usize = 5;

/// Providers read from a roster, in feed order.
#[derive(Debug, Clone, Default)]
pub struct RosterLoad {
    pub providers: Vec<Provider>,
    /// Number of non-blank lines that could not be parsed.
    pub skipped: usize,
}

/// Parse a single roster line.
pub fn parse_line(line: &str, locations: &LocationTable) -> Result<Provider, RosterLineError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < MIN_TOKENS {
        return Err(RosterLineError::TooFewFields {
            expected: MIN_TOKENS,
            found: tokens.len(),
        });
    }

    let dob: Date = tokens[3].parse()?;
    if !dob.is_valid() {
        return Err(RosterLineError::InvalidBirthDate(dob));
    }
    let profile = Profile::new(tokens[1], tokens[2], dob);
    let location = locations.resolve(tokens[4]);

    match tokens[0] {
        "D" => {
            let (specialty, npi) = match (tokens.get(5), tokens.get(6)) {
                (Some(specialty), Some(npi)) => (specialty, npi),
                _ => return Err(RosterLineError::MissingDoctorFields),
            };
            let specialty = Specialty::from_string(specialty)?;
            Ok(Provider::doctor(profile, location, specialty, *npi))
        }
        "T" => {
            let rate = tokens.get(5).ok_or(RosterLineError::MissingRate)?;
            let rate: u32 = rate
                .parse()
                .map_err(|_| RosterLineError::InvalidRate(rate.to_string()))?;
            let services = match tokens.get(6) {
                Some(list) => list
                    .split(',')
                    .filter(|s| !s.is_empty())
                    .map(Radiology::from_string)
                    .collect::<Result<Vec<_>, _>>()?,
                None => Radiology::ALL.to_vec(),
            };
            Ok(Provider::technician(profile, location, rate, services))
        }
        other => Err(RosterLineError::UnknownKind(other.to_string())),
    }
}

/// Parse a whole roster feed.
pub fn parse_roster(contents: &str, locations: &LocationTable) -> RosterLoad {
    let mut load = RosterLoad::default();

    for (number, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_line(line, locations) {
            Ok(provider) => load.providers.push(provider),
            Err(reason) => {
                warn!(line = number + 1, %reason, "Skipping roster line: {}", line);
                load.skipped += 1;
            }
        }
    }

    load
}

/// Read and parse a roster file.
pub fn load_roster(path: impl AsRef<Path>, locations: &LocationTable) -> Result<RosterLoad, RosterError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| RosterError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let load = parse_roster(&contents, locations);
    info!(
        providers = load.providers.len(),
        skipped = load.skipped,
        "Loaded roster from {}",
        path.display()
    );
    Ok(load)
}
