//! Error types for mcode-stage.
//!
//! Provides unified error handling across the transport, the controller facade,
//! configuration and motion orchestration.

use std::io;
use std::time::Duration;

use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for all mcode-stage operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The TCP connection to the controller could not be established.
    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        /// Address that was dialed (`host:port`).
        addr: String,
        /// Underlying socket error.
        #[source]
        source: io::Error,
    },

    /// No response bytes arrived within the read timeout.
    ///
    /// The connection is closed before this is returned.
    #[error("Timed out after {timeout:?} waiting for reply to '{command}'")]
    Timeout {
        /// Command that was in flight.
        command: String,
        /// Configured read timeout.
        timeout: Duration,
    },

    /// The controller closed the stream before a sentinel was received.
    ///
    /// The connection is closed before this is returned.
    #[error("Connection closed by the controller (received {partial:?})")]
    ConnectionClosed {
        /// Text received before the peer closed.
        partial: String,
    },

    /// Malformed, mismatched or unusable response.
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// An operation was invoked on a client with no open connection.
    ///
    /// This is a usage error, not a recoverable device condition.
    #[error("Not connected to a controller")]
    NotConnected,

    /// Any other socket failure. The connection is closed before this is returned.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration parsing or validation error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Motion orchestration error.
    #[error("Motion error: {0}")]
    Motion(#[from] MotionError),
}

impl Error {
    /// True for errors caused by misuse of the API rather than by the device or network.
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            Error::NotConnected | Error::Protocol(ProtocolError::InvalidCommand { .. })
        )
    }

    /// True when the error left the client without a usable connection.
    pub fn is_connection_lost(&self) -> bool {
        matches!(
            self,
            Error::Timeout { .. } | Error::ConnectionClosed { .. } | Error::Io(_)
        )
    }
}

/// MCode framing and response errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolError {
    /// The first response line did not equal the transmitted command.
    #[error("Unexpected response to '{command}': {lines:?}")]
    EchoMismatch {
        /// Command that was sent.
        command: String,
        /// Every line of the received response.
        lines: Vec<String>,
    },

    /// A variable read returned only the echo line.
    #[error("Missing value in response to '{command}': {lines:?}")]
    MissingValue {
        /// Command that was sent.
        command: String,
        /// Every line of the received response.
        lines: Vec<String>,
    },

    /// A register value could not be parsed as the expected type.
    #[error("Register {register} returned unparsable value '{value}'")]
    InvalidValue {
        /// Register name.
        register: String,
        /// Raw value text.
        value: String,
    },

    /// A command cannot be framed (embedded line break or non-ASCII text).
    #[error("Invalid command {command:?}: {reason}")]
    InvalidCommand {
        /// Rejected command text.
        command: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// The controller sent bytes outside the ASCII range.
    #[error("Response contains non-ASCII bytes: {bytes:02x?}")]
    NonAscii {
        /// Raw response bytes.
        bytes: Vec<u8>,
    },
}

/// Configuration-related errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Failed to parse TOML configuration
    #[error("Parse error: {0}")]
    ParseError(String),
    /// File I/O error
    #[error("I/O error: {0}")]
    IoError(String),
    /// Invalid microstep value
    #[error("Invalid microsteps: {0}. Valid values: 1, 2, 4, 5, 8, 10, 16, 25, 32, 50, 64, 100, 125, 128, 250, 256")]
    InvalidMicrosteps(u16),
    /// The controller reports a different microstep setting than configured
    #[error("Controller reports {actual} microsteps but configuration expects {expected}")]
    MicrostepMismatch {
        /// Configured divisor.
        expected: u16,
        /// Value read from the MS register.
        actual: i64,
    },
    /// Port 0 is not dialable
    #[error("Invalid port: 0")]
    InvalidPort,
    /// Timeout must be positive
    #[error("Invalid {name}: {value}. Must be > 0")]
    InvalidTimeout {
        /// Setting name.
        name: &'static str,
        /// Configured seconds.
        value: f64,
    },
    /// Lead screw travel must be positive
    #[error("Invalid lead: {0} mm. Must be > 0")]
    InvalidLead(f64),
    /// Full steps per revolution must be positive
    #[error("Invalid full steps per revolution: 0")]
    InvalidStepsPerRevolution,
    /// Poll interval must be positive
    #[error("Invalid poll interval: 0 ms")]
    InvalidPollInterval,
    /// Invalid soft limits (min must be < max)
    #[error("Invalid soft limits: min ({min}) must be < max ({max})")]
    InvalidSoftLimits {
        /// Minimum limit value
        min: f64,
        /// Maximum limit value
        max: f64,
    },
    /// A setup command cannot be sent as-is
    #[error("Invalid setup command {0:?}")]
    InvalidSetupCommand(String),
}

/// Motion orchestration errors.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MotionError {
    /// The stage kept reporting motion past the configured wait limit.
    #[error("Stage still moving after {0:?}")]
    WaitTimeout(Duration),
    /// The move counter did not return to zero after homing.
    #[error("Stage not homed: counter reads {counter}")]
    NotHomed {
        /// Counter value after the homing attempt.
        counter: i64,
    },
    /// Target position lies outside the soft limits.
    #[error("Target {target} mm outside limits [{min}, {max}]")]
    LimitExceeded {
        /// Requested target in millimeters.
        target: f64,
        /// Lower limit.
        min: f64,
        /// Upper limit.
        max: f64,
    },
}
