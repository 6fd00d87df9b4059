//! Configuration validation.

use crate::error::{ConfigError, Result};
use crate::transport::framing::validate_command;

use super::{ControllerConfig, MotionSettings, StageConfig, StageMechanics};

/// Validate a stage configuration.
///
/// Checks:
/// - Port is non-zero and timeouts are positive
/// - Stage mechanics give a usable step size
/// - Soft limits are valid (min < max)
/// - Setup commands can be framed
pub fn validate_config(config: &StageConfig) -> Result<()> {
    validate_controller(&config.controller)?;
    validate_stage(&config.stage)?;
    validate_motion(&config.motion)?;

    for command in &config.setup.commands {
        if validate_command(command).is_err() || command.trim().is_empty() {
            return Err(ConfigError::InvalidSetupCommand(command.clone()).into());
        }
    }

    Ok(())
}

fn validate_controller(config: &ControllerConfig) -> Result<()> {
    if config.port == 0 {
        return Err(ConfigError::InvalidPort.into());
    }
    check_timeout("read_timeout_secs", config.read_timeout_secs)?;
    if let Some(secs) = config.connect_timeout_secs {
        check_timeout("connect_timeout_secs", secs)?;
    }
    Ok(())
}

fn validate_stage(stage: &StageMechanics) -> Result<()> {
    if stage.full_steps_per_revolution == 0 {
        return Err(ConfigError::InvalidStepsPerRevolution.into());
    }

    // Lead must be positive and finite
    if !(stage.lead.0 > 0.0 && stage.lead.0.is_finite()) {
        return Err(ConfigError::InvalidLead(stage.lead.0).into());
    }

    if let Some(ref limits) = stage.limits {
        if !limits.is_valid() {
            return Err(ConfigError::InvalidSoftLimits {
                min: limits.min.0,
                max: limits.max.0,
            }
            .into());
        }
    }

    Ok(())
}

fn validate_motion(motion: &MotionSettings) -> Result<()> {
    if motion.poll_interval_ms == 0 {
        return Err(ConfigError::InvalidPollInterval.into());
    }
    check_timeout("max_wait_secs", motion.max_wait_secs)
}

fn check_timeout(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::InvalidTimeout { name, value }.into())
    }
}
