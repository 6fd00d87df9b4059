//! Controller facade for MCode stepper controllers.
//!
//! Provides named-register access and the motion verbs, built on the transport.

mod builder;
mod facade;
mod variable;

pub use builder::ControllerBuilder;
pub use facade::Controller;
pub use variable::{
    assignment_command, query_command, registers, Scalar, VariableValue, HOME_COMMAND,
    PAUSE_COMMAND,
};
