//! Builder pattern for Controller.

use std::net::TcpStream;
use std::time::Duration;

use tracing::Span;

use crate::config::{ControllerConfig, StageConfig};
use crate::error::Result;
use crate::transport::{Link, Transport, TransportSettings, DEFAULT_PORT};

use super::facade::Controller;

/// Builder for creating Controller instances.
///
/// ```rust,ignore
/// let controller = Controller::builder()
///     .host("192.168.10.77")
///     .read_timeout(Duration::from_secs(10))
///     .connect()?;
/// ```
#[derive(Debug, Default)]
pub struct ControllerBuilder {
    host: Option<String>,
    port: Option<u16>,
    settings: TransportSettings,
    span: Option<Span>,
}

impl Controller<TcpStream> {
    /// Create a builder with default settings.
    pub fn builder() -> ControllerBuilder {
        ControllerBuilder::new()
    }
}

impl ControllerBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the controller host name or address.
    pub fn host(mut self, host: &str) -> Self {
        self.host = Some(host.to_owned());
        self
    }

    /// Set the controller TCP port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Set the read timeout.
    pub fn read_timeout(mut self, timeout: Duration) -> Self {
        self.settings.read_timeout = timeout;
        self
    }

    /// Set the dial timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.settings.connect_timeout = Some(timeout);
        self
    }

    /// Record transport events under this span.
    pub fn span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Configure endpoint and timeouts from a ControllerConfig.
    pub fn from_controller_config(mut self, config: &ControllerConfig) -> Self {
        self.host = Some(config.host.clone());
        self.port = Some(config.port);
        self.settings = config.transport_settings();
        self
    }

    /// Configure from a full StageConfig.
    pub fn from_config(self, config: &StageConfig) -> Self {
        self.from_controller_config(&config.controller)
    }

    /// Build a disconnected controller.
    pub fn build(self) -> Controller<TcpStream> {
        let transport = Transport::new(self.settings);
        let transport = match self.span {
            Some(span) => transport.with_span(span),
            None => transport,
        };
        Controller::from_transport(transport)
    }

    /// Build a controller over an already-open stream.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Io`] if the read timeout cannot be applied to `stream`.
    pub fn build_with_stream<S: Link>(self, stream: S) -> Result<Controller<S>> {
        let transport = Transport::from_stream(stream, self.settings)?;
        let transport = match self.span {
            Some(span) => transport.with_span(span),
            None => transport,
        };
        Ok(Controller::from_transport(transport))
    }

    /// Build and connect.
    ///
    /// Host defaults to `192.168.33.1`, port to 503.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Connect`] if the socket cannot be established.
    pub fn connect(self) -> Result<Controller<TcpStream>> {
        let host = self
            .host
            .clone()
            .unwrap_or_else(|| crate::config::DEFAULT_HOST.to_owned());
        let port = self.port.unwrap_or(DEFAULT_PORT);
        let mut controller = self.build();
        controller.connect(&host, port)?;
        Ok(controller)
    }
}
