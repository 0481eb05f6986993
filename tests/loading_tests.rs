//! Roster and configuration files read from disk.

use std::io::Write;
use std::path::PathBuf;

use clinicmanager::calendar::{Date, FixedClock};
use clinicmanager::config::ClinicConfig;
use clinicmanager::error::{ConfigError, RosterError};
use clinicmanager::models::Radiology;
use clinicmanager::roster::load_roster;
use clinicmanager::scheduler::ClinicScheduler;
use tempfile::{tempdir, NamedTempFile};

fn sample(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(name)
}

#[test]
fn test_sample_files_load() {
    let config = ClinicConfig::load(sample("clinic.toml")).unwrap();
    assert_eq!(config.scheduling.booking_window_months, 6);
    assert_eq!(config.location_table().len(), 6);

    let roster = load_roster(sample("providers.txt"), &config.location_table()).unwrap();
    assert_eq!(roster.providers.len(), 13);
    assert_eq!(roster.skipped, 0);

    let scheduler = ClinicScheduler::from_config(&config, roster.providers, FixedClock(Date::new(2024, 10, 1)));
    let rotation: Vec<String> = scheduler
        .rotation()
        .map(|(_, p)| p.profile().full_name())
        .collect();
    assert_eq!(
        rotation,
        vec!["JENNY PATEL", "MONICA FOX", "CHARLES BROWN", "FRANK LIN", "BEN JERRY", "GARY JOHNSON"]
    );
}

#[test]
fn test_roster_skips_bad_lines() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "D ANDREW PATEL 1/21/1989 BRIDGEWATER FAMILY 01").unwrap();
    writeln!(file).unwrap();
    writeln!(file, "D BROKEN LINE").unwrap();
    writeln!(file, "X ALIEN KIND 1/1/1990 EDISON").unwrap();
    writeln!(file, "T BEN JERRY 10/15/1995 NOWHERE 140 XRAY").unwrap();

    let config = ClinicConfig::default();
    let roster = load_roster(file.path(), &config.location_table()).unwrap();

    assert_eq!(roster.providers.len(), 2);
    assert_eq!(roster.skipped, 2);

    let tech = &roster.providers[1];
    assert!(tech.can_perform(Radiology::Xray));
    assert!(!tech.can_perform(Radiology::Catscan));
    assert_eq!(tech.location().county, "Unknown");
    assert_eq!(tech.location().zip, "00000");
}

#[test]
fn test_missing_roster_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.txt");
    let result = load_roster(&path, &ClinicConfig::default().location_table());
    assert!(matches!(result, Err(RosterError::Io { .. })));
}

#[test]
fn test_config_errors() {
    let dir = tempdir().unwrap();

    let missing = ClinicConfig::load(dir.path().join("absent.toml"));
    assert!(matches!(missing, Err(ConfigError::Io { .. })));

    let path = dir.path().join("bad.toml");
    std::fs::write(&path, "[scheduling]\nbooking_window_months = \"six\"\n").unwrap();
    assert!(matches!(ClinicConfig::load(&path), Err(ConfigError::Parse { .. })));
}

#[test]
fn test_partial_config_keeps_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("clinic.toml");
    std::fs::write(&path, "[scheduling]\nrelease_slot_on_cancel = true\n").unwrap();

    let config = ClinicConfig::load(&path).unwrap();
    assert!(config.scheduling.release_slot_on_cancel);
    assert_eq!(config.scheduling.booking_window_months, 6);
    assert!(config.scheduling.rotation.is_empty());
    assert_eq!(config.locations, ClinicConfig::default().locations);
    assert!(config.roster.is_none());
}
