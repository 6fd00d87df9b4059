//! Motion profile in physical units.

use core::fmt;

use crate::config::units::{Millimeters, MillimetersPerSec, MillimetersPerSecSquared};

/// The five profile registers, expressed in millimeters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MotionProfile {
    /// Maximum velocity (`VM`).
    pub max_velocity: MillimetersPerSec,

    /// Initial velocity (`VI`).
    pub initial_velocity: MillimetersPerSec,

    /// Acceleration (`A`).
    pub acceleration: MillimetersPerSecSquared,

    /// Deceleration (`D`).
    pub deceleration: MillimetersPerSecSquared,

    /// Trip position (`TP`).
    pub trip_position: Millimeters,
}

impl fmt::Display for MotionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "max velocity      {:.4} mm/s", self.max_velocity.0)?;
        writeln!(f, "initial velocity  {:.4} mm/s", self.initial_velocity.0)?;
        writeln!(f, "acceleration      {:.4} mm/s²", self.acceleration.0)?;
        writeln!(f, "deceleration      {:.4} mm/s²", self.deceleration.0)?;
        write!(f, "trip position     {:.4} mm", self.trip_position.0)
    }
}
