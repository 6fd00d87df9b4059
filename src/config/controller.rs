//! Controller endpoint configuration from TOML.

use std::time::Duration;

use serde::Deserialize;

use crate::transport::{TransportSettings, DEFAULT_PORT, DEFAULT_READ_TIMEOUT};

/// Factory address of the controller's Ethernet interface.
pub const DEFAULT_HOST: &str = "192.168.33.1";

/// Where the controller lives and how long to wait for it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Host name or IPv4/IPv6 address.
    pub host: String,

    /// TCP port.
    pub port: u16,

    /// Per-read timeout in seconds.
    pub read_timeout_secs: f64,

    /// Dial timeout in seconds. Absent means the OS default.
    pub connect_timeout_secs: Option<f64>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            read_timeout_secs: DEFAULT_READ_TIMEOUT.as_secs_f64(),
            connect_timeout_secs: None,
        }
    }
}

impl ControllerConfig {
    /// `host:port` for logging.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Socket settings for the transport.
    ///
    /// Values that do not form a valid [`Duration`] fall back to the defaults;
    /// [`validate_config`](super::validate_config) rejects them earlier.
    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            read_timeout: Duration::try_from_secs_f64(self.read_timeout_secs)
                .unwrap_or(DEFAULT_READ_TIMEOUT),
            connect_timeout: self
                .connect_timeout_secs
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok()),
        }
    }
}
