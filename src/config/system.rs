//! Root configuration structure.

use serde::Deserialize;

use super::controller::ControllerConfig;
use super::mechanical::StageMechanics;
use super::motion::MotionSettings;

/// Commands sent verbatim before a profile is written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Raw MCode commands, in order (e.g. `CW=255`, `OS=1,23,0`).
    pub commands: Vec<String>,
}

/// Root configuration structure from TOML. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct StageConfig {
    /// Controller endpoint and timeouts.
    pub controller: ControllerConfig,

    /// Lead screw, motor and soft limits.
    pub stage: StageMechanics,

    /// Profile overrides and move parameters.
    pub motion: MotionSettings,

    /// I/O and clock setup sent before profile writes.
    pub setup: SetupConfig,
}
