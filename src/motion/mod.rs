//! Motion module for mcode-stage.
//!
//! Sequences controller commands into the stage operations an operator runs:
//! homing, configured absolute moves, jogs and profile updates.

mod delay;
mod profile;
mod stage;

pub use delay::StdDelay;
pub use profile::MotionProfile;
pub use stage::Stage;
