//! Stage mechanics: conversion between millimeters and controller steps.

use serde::Deserialize;

use super::limits::SoftLimits;
use super::units::{Microsteps, Millimeters, MillimetersPerSec, MillimetersPerSecSquared, Steps};

/// Lead-screw and motor parameters of the stage.
///
/// One motor revolution moves the carriage by `lead_mm` and takes
/// `full_steps_per_revolution × microsteps` controller steps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct StageMechanics {
    /// Base steps per revolution (200 for 1.8° motors).
    pub full_steps_per_revolution: u32,

    /// Microstep setting the controller runs with (`MS`).
    pub microsteps: Microsteps,

    /// Carriage travel per motor revolution in millimeters.
    #[serde(rename = "lead_mm")]
    pub lead: Millimeters,

    /// Optional soft limits for absolute moves.
    pub limits: Option<SoftLimits>,
}

impl Default for StageMechanics {
    fn default() -> Self {
        Self {
            full_steps_per_revolution: 200,
            microsteps: Microsteps::TWO_FIFTY_SIXTH,
            lead: Millimeters(3.175),
            limits: None,
        }
    }
}

impl StageMechanics {
    /// Controller steps per motor revolution.
    #[inline]
    pub fn steps_per_revolution(&self) -> u64 {
        u64::from(self.full_steps_per_revolution) * u64::from(self.microsteps.value())
    }

    /// Carriage travel per controller step.
    #[inline]
    pub fn mm_per_step(&self) -> f64 {
        self.lead.0 / self.steps_per_revolution() as f64
    }

    /// Convert a distance to steps, rounding half to even.
    #[inline]
    pub fn to_steps(&self, distance: Millimeters) -> Steps {
        Steps(self.scale_to_steps(distance.0))
    }

    /// Convert steps to a distance.
    #[inline]
    pub fn to_mm(&self, steps: Steps) -> Millimeters {
        Millimeters(steps.0 as f64 * self.mm_per_step())
    }

    /// Convert mm/s to steps/s.
    #[inline]
    pub fn velocity_to_steps(&self, velocity: MillimetersPerSec) -> i64 {
        self.scale_to_steps(velocity.0)
    }

    /// Convert steps/s to mm/s.
    #[inline]
    pub fn velocity_to_mm(&self, steps_per_sec: i64) -> MillimetersPerSec {
        MillimetersPerSec(steps_per_sec as f64 * self.mm_per_step())
    }

    /// Convert mm/s² to steps/s².
    #[inline]
    pub fn acceleration_to_steps(&self, acceleration: MillimetersPerSecSquared) -> i64 {
        self.scale_to_steps(acceleration.0)
    }

    /// Convert steps/s² to mm/s².
    #[inline]
    pub fn acceleration_to_mm(&self, steps_per_sec2: i64) -> MillimetersPerSecSquared {
        MillimetersPerSecSquared(steps_per_sec2 as f64 * self.mm_per_step())
    }

    // Float-to-int `as` saturates; NaN maps to 0.
    fn scale_to_steps(&self, value: f64) -> i64 {
        (value / self.mm_per_step()).round_ties_even() as i64
    }
}
