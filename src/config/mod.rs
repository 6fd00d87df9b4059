//! Configuration module for mcode-stage.
//!
//! Provides types for loading and validating the controller endpoint, stage
//! mechanics, motion defaults and setup commands from TOML files.

mod controller;
mod limits;
mod loader;
mod mechanical;
mod motion;
mod system;
pub mod units;
mod validation;

pub use controller::{ControllerConfig, DEFAULT_HOST};
pub use limits::{LimitPolicy, SoftLimits};
pub use loader::{load_config, parse_config};
pub use mechanical::StageMechanics;
pub use motion::MotionSettings;
pub use system::{SetupConfig, StageConfig};
pub use validation::validate_config;

// Re-export unit types at config level
pub use units::{Microsteps, Millimeters, MillimetersPerSec, MillimetersPerSecSquared, Steps};
