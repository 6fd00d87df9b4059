//! Register names and the values written to them.

use core::fmt;

use crate::config::units::Steps;

/// Names of the controller registers this crate addresses.
pub mod registers {
    /// Maximum velocity (steps/s).
    pub const MAX_VELOCITY: &str = "VM";
    /// Initial velocity (steps/s).
    pub const INITIAL_VELOCITY: &str = "VI";
    /// Acceleration (steps/s²).
    pub const ACCELERATION: &str = "A";
    /// Deceleration (steps/s²).
    pub const DECELERATION: &str = "D";
    /// Trip position; two fields, the second held at 0.
    pub const TRIP_POSITION: &str = "TP";
    /// Trip enable.
    pub const TRIP_ENABLE: &str = "TE";
    /// Counter 1 (move counter, zero after homing).
    pub const COUNTER: &str = "C1";
    /// Microstep resolution select.
    pub const MICROSTEPS: &str = "MS";
    /// Moving flag.
    pub const MOVING: &str = "MV";
    /// Move absolute.
    pub const MOVE_ABSOLUTE: &str = "MA";
    /// Move relative.
    pub const MOVE_RELATIVE: &str = "MR";
}

/// Home command.
pub const HOME_COMMAND: &str = "HM 1";

/// Pause command.
pub const PAUSE_COMMAND: &str = "PS";

/// A single register field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scalar {
    /// Decimal integer.
    Int(i64),
    /// Verbatim text.
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{v}"),
            Scalar::Text(s) => f.write_str(s),
        }
    }
}

/// Value written to a register: one field or several comma-joined fields.
///
/// Not range-checked; the controller decides what is legal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariableValue {
    /// `NAME=v`
    Scalar(Scalar),
    /// `NAME=v1,v2,...`
    Sequence(Vec<Scalar>),
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Scalar(v) => write!(f, "{v}"),
            VariableValue::Sequence(values) => {
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{v}")?;
                }
                Ok(())
            }
        }
    }
}

macro_rules! int_scalar {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Scalar {
                fn from(v: $t) -> Self {
                    Scalar::Int(i64::from(v))
                }
            }

            impl From<$t> for VariableValue {
                fn from(v: $t) -> Self {
                    VariableValue::Scalar(v.into())
                }
            }
        )*
    };
}

int_scalar!(i8, i16, i32, i64, u8, u16, u32, bool);

impl From<Steps> for Scalar {
    fn from(v: Steps) -> Self {
        Scalar::Int(v.value())
    }
}

impl From<Steps> for VariableValue {
    fn from(v: Steps) -> Self {
        VariableValue::Scalar(v.into())
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::Text(v.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Text(v)
    }
}

impl From<&str> for VariableValue {
    fn from(v: &str) -> Self {
        VariableValue::Scalar(v.into())
    }
}

impl From<String> for VariableValue {
    fn from(v: String) -> Self {
        VariableValue::Scalar(v.into())
    }
}

impl<T: Into<Scalar>> From<Vec<T>> for VariableValue {
    fn from(values: Vec<T>) -> Self {
        VariableValue::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Scalar>, const N: usize> From<[T; N]> for VariableValue {
    fn from(values: [T; N]) -> Self {
        VariableValue::Sequence(values.into_iter().map(Into::into).collect())
    }
}

impl<A: Into<Scalar>, B: Into<Scalar>> From<(A, B)> for VariableValue {
    fn from((a, b): (A, B)) -> Self {
        VariableValue::Sequence(vec![a.into(), b.into()])
    }
}

/// `PR <name>`
pub fn query_command(name: &str) -> String {
    format!("PR {name}")
}

/// `<name>=<value>`
pub fn assignment_command(name: &str, value: &VariableValue) -> String {
    format!("{name}={value}")
}
