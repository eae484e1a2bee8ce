//! Integration tests for configuration loading
//!
//! - TOML round trip through save/load
//! - Explicit path handling and validation failures
//! - Kernel source argument validation

use std::fs;

use svm_fixup::config::loader::{load_config_from_file, project_name_from_source, resolve_config, save_config_to_file};
use svm_fixup::error::{ConfigError, InputError};
use svm_fixup::{BusWidths, FixupConfig, LockServiceMode};
use tempfile::TempDir;

#[test]
fn test_save_and_load_roundtrip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested/config.toml");
    let config = FixupConfig {
        avm_ports_per_lsu: 4,
        lock_service: LockServiceMode::Enabled,
        svm_common_dir: Some(temp_dir.path().join("svm_common")),
        verbose: true,
        bus: BusWidths {
            data_width: 256,
            ..BusWidths::default()
        },
        ..FixupConfig::default()
    };

    save_config_to_file(&config, &path).unwrap();
    let loaded = load_config_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_lock_service_mode_is_lowercase() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "lock_service = \"enabled\"\n").unwrap();

    let config = resolve_config(Some(&path)).unwrap();
    assert!(config.lock_service.is_enabled());
    assert_eq!(config.bus, BusWidths::default());
}

#[test]
fn test_invalid_toml() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "avm_ports_per_lsu = \"three\"\n").unwrap();

    assert!(matches!(
        load_config_from_file(&path),
        Err(ConfigError::InvalidToml(_))
    ));
}

#[test]
fn test_zero_width_fails_validation() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    fs::write(&path, "[bus]\naddr_width = 0\n").unwrap();

    assert!(matches!(
        load_config_from_file(&path),
        Err(ConfigError::ValidationFailed(msg)) if msg.contains("addr_width")
    ));
}

#[test]
fn test_explicit_missing_config() {
    let temp_dir = TempDir::new().unwrap();
    let result = resolve_config(Some(&temp_dir.path().join("absent.toml")));
    assert!(matches!(result, Err(ConfigError::FileNotFound(_))));
}

#[test]
fn test_project_name_from_source() {
    let temp_dir = TempDir::new().unwrap();
    let source = temp_dir.path().join("filtering_algorithm.cl");
    fs::write(&source, "").unwrap();
    assert_eq!(project_name_from_source(&source).unwrap(), "filtering_algorithm");

    let wrong = temp_dir.path().join("filtering_algorithm.cpp");
    fs::write(&wrong, "").unwrap();
    assert!(matches!(
        project_name_from_source(&wrong),
        Err(InputError::UnrecognisedFileType(_))
    ));
    assert!(project_name_from_source(temp_dir.path()).is_err());
}
