//! # mcode-stage
//!
//! Client for MCode stepper controllers reached over TCP, plus the stage
//! sequencing built on it.
//!
//! ## Features
//!
//! - **Strict request/response framing**: one command, one reply, echo checked
//! - **Named registers**: typed getters and setters for the profile registers
//! - **Configuration-driven**: endpoint, stage mechanics and setup commands in TOML
//! - **Physical units**: millimeters in, controller steps out
//! - **Injected logging**: every transport records under its own `tracing` span
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mcode_stage::{load_config, Controller, Stage, StdDelay};
//!
//! let config = load_config("stage.toml")?;
//! let controller = Controller::builder().from_config(&config).connect()?;
//!
//! let mut stage = Stage::from_config(controller, &config, StdDelay);
//! stage.verify_microsteps()?;
//! stage.home()?;
//! stage.execute_configured_move()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): builds the `mcode-stage` operator binary

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]
// Protocol errors carry the full response for diagnostics
#![allow(clippy::result_large_err)]

// Core modules
pub mod config;
pub mod controller;
pub mod error;
pub mod motion;
pub mod transport;

// Re-exports for ergonomic API
pub use config::{load_config, parse_config, validate_config, StageConfig, StageMechanics};
pub use controller::{Controller, ControllerBuilder, VariableValue};
pub use error::{ConfigError, Error, MotionError, ProtocolError, Result};
pub use motion::{MotionProfile, Stage, StdDelay};
pub use transport::{ConnectionState, Link, Response, Sentinel, Transport, TransportSettings};

// Unit types
pub use config::units::{
    Microsteps, Millimeters, MillimetersPerSec, MillimetersPerSecSquared, Steps, UnitExt,
};
