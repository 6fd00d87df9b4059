//! Motion defaults from TOML.

use std::time::Duration;

use serde::Deserialize;

use crate::motion::MotionProfile;

use super::units::{Millimeters, MillimetersPerSec, MillimetersPerSecSquared};

/// Motion section: optional profile overrides plus move and wait parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MotionSettings {
    /// Maximum velocity (`VM`).
    #[serde(rename = "max_velocity_mm_per_sec")]
    pub max_velocity: Option<MillimetersPerSec>,

    /// Initial velocity (`VI`).
    #[serde(rename = "initial_velocity_mm_per_sec")]
    pub initial_velocity: Option<MillimetersPerSec>,

    /// Acceleration (`A`).
    #[serde(rename = "acceleration_mm_per_sec2")]
    pub acceleration: Option<MillimetersPerSecSquared>,

    /// Deceleration (`D`).
    #[serde(rename = "deceleration_mm_per_sec2")]
    pub deceleration: Option<MillimetersPerSecSquared>,

    /// Trip position (`TP`).
    #[serde(rename = "trip_position_mm")]
    pub trip_position: Option<Millimeters>,

    /// Target of the configured absolute move, from home.
    #[serde(rename = "move_length_mm")]
    pub move_length: Millimeters,

    /// Jog distance.
    #[serde(rename = "step_length_mm")]
    pub step_length: Millimeters,

    /// Delay after starting motion before the first `MV` poll.
    pub settle_ms: u64,

    /// Delay between `MV` polls.
    pub poll_interval_ms: u64,

    /// Give up waiting for motion to stop after this long.
    pub max_wait_secs: f64,
}

impl Default for MotionSettings {
    fn default() -> Self {
        Self {
            max_velocity: None,
            initial_velocity: None,
            acceleration: None,
            deceleration: None,
            trip_position: None,
            move_length: Millimeters(20.0),
            step_length: Millimeters(0.05),
            settle_ms: 200,
            poll_interval_ms: 100,
            max_wait_secs: 120.0,
        }
    }
}

impl MotionSettings {
    /// Settle delay as a [`Duration`].
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    /// Poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Wait bound as a [`Duration`].
    pub fn max_wait(&self) -> Duration {
        Duration::try_from_secs_f64(self.max_wait_secs).unwrap_or(Duration::from_secs(120))
    }

    /// True if any profile field is set.
    pub fn has_profile(&self) -> bool {
        self.max_velocity.is_some()
            || self.initial_velocity.is_some()
            || self.acceleration.is_some()
            || self.deceleration.is_some()
            || self.trip_position.is_some()
    }

    /// Replace the fields of `base` that this section sets.
    pub fn overlay(&self, base: MotionProfile) -> MotionProfile {
        MotionProfile {
            max_velocity: self.max_velocity.unwrap_or(base.max_velocity),
            initial_velocity: self.initial_velocity.unwrap_or(base.initial_velocity),
            acceleration: self.acceleration.unwrap_or(base.acceleration),
            deceleration: self.deceleration.unwrap_or(base.deceleration),
            trip_position: self.trip_position.unwrap_or(base.trip_position),
        }
    }
}
