/*!
 * Port Configuration Tests
 *
 * Environment-driven configuration; serialized because tests mutate the
 * process environment
 */

use lsm_port::core::config::{ENV_CHECKSUM, ENV_HEAP_PROFILE};
use lsm_port::{ChecksumMode, PortConfig, PortError};
use pretty_assertions::assert_eq;
use serial_test::serial;

fn clear_env() {
    std::env::remove_var(ENV_CHECKSUM);
    std::env::remove_var(ENV_HEAP_PROFILE);
}

#[test]
#[serial]
fn test_from_env_defaults() {
    clear_env();
    assert_eq!(PortConfig::from_env().unwrap(), PortConfig::default());
}

#[test]
#[serial]
fn test_from_env_overrides() {
    clear_env();
    std::env::set_var(ENV_CHECKSUM, "portable");
    std::env::set_var(ENV_HEAP_PROFILE, "false");

    let config = PortConfig::from_env().unwrap();
    assert_eq!(config.checksum, ChecksumMode::Portable);
    assert!(!config.heap_profiling);
    clear_env();
}

#[test]
#[serial]
fn test_from_env_invalid() {
    clear_env();
    std::env::set_var(ENV_CHECKSUM, "avx512");
    let err = PortConfig::from_env().unwrap_err();
    assert!(matches!(err, PortError::InvalidConfig(_)));
    clear_env();
}

#[test]
fn test_json_round_trip_through_serde() {
    let config = PortConfig::portable();
    let json = serde_json::to_string(&config).unwrap();
    assert_eq!(json, r#"{"checksum":"portable","heap_profiling":false}"#);
    assert_eq!(PortConfig::from_json(&json).unwrap(), config);
}
