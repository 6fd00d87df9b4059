//! Configuration loading and validation tests.

use mcode_stage::config::{load_config, parse_config, LimitPolicy, StageConfig};
use mcode_stage::{ConfigError, Error, Microsteps, Millimeters};

fn demo_config_path() -> String {
    format!("{}/demos/stage.toml", env!("CARGO_MANIFEST_DIR"))
}

/// Test loading the shipped demo configuration.
#[test]
fn test_load_demo_config() {
    let config = load_config(demo_config_path()).unwrap();

    assert_eq!(config.controller.address(), "192.168.33.1:503");
    assert_eq!(config.controller.connect_timeout_secs, Some(5.0));
    assert_eq!(config.stage.microsteps, Microsteps::TWO_FIFTY_SIXTH);
    assert_eq!(config.stage.steps_per_revolution(), 51_200);
    assert_eq!(config.motion.move_length, Millimeters(20.0));

    let limits = config.stage.limits.as_ref().unwrap();
    assert_eq!(limits.policy, LimitPolicy::Reject);

    assert_eq!(config.setup.commands.len(), 10);
    assert_eq!(config.setup.commands[0], "CW=255");
    assert_eq!(config.setup.commands[9], "D3=20");
}

/// Test that every section may be omitted.
#[test]
fn test_partial_sections_fill_defaults() {
    let config = parse_config(
        r#"
[controller]
host = "stage.lab"

[motion]
settle_ms = 50
"#,
    )
    .unwrap();

    assert_eq!(config.controller.host, "stage.lab");
    assert_eq!(config.controller.port, 503);
    assert_eq!(config.motion.settle_ms, 50);
    assert_eq!(config.motion.poll_interval_ms, 100);
    assert_eq!(config.stage, StageConfig::default().stage);
    assert!(config.setup.commands.is_empty());
}

/// Test that malformed TOML is reported as a parse error.
#[test]
fn test_malformed_toml() {
    let err = parse_config("[controller\nport = 503").unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ParseError(_))));
}

/// Test that type mismatches are reported as parse errors.
#[test]
fn test_wrong_type() {
    let err = parse_config("[controller]\nport = \"503\"\n").unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::ParseError(_))));
}

/// Test validation of soft limits through the loader.
#[test]
fn test_inverted_limits_rejected() {
    let err = parse_config(
        r#"
[stage.limits]
min_mm = 50.0
max_mm = 10.0
"#,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidSoftLimits { .. })
    ));
}

/// Test that a setup command cannot smuggle a second command.
#[test]
fn test_setup_command_with_newline_rejected() {
    let err = parse_config("[setup]\ncommands = [\"D1=20\\nD2=20\"]\n").unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidSetupCommand(_))
    ));
}

/// Test validation of controller settings through the loader.
#[test]
fn test_zero_port_and_timeout_rejected() {
    let err = parse_config("[controller]\nport = 0\n").unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::InvalidPort)));

    let err = parse_config("[controller]\nread_timeout_secs = 0.0\n").unwrap_err();
    assert!(matches!(
        err,
        Error::Config(ConfigError::InvalidTimeout { .. })
    ));
}
