//! TCP connection and one-command/one-response exchange.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::{debug, field, info, info_span, warn, Span};

use crate::error::{Error, ProtocolError, Result};

use super::framing::{encode_command, Response, ResponseBuffer};
use super::link::{is_disconnect, is_timeout, Link};

/// Default MCode TCP port.
pub const DEFAULT_PORT: u16 = 503;

/// Read timeout applied to every connection unless configured otherwise.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Size of each socket read.
pub const READ_CHUNK_SIZE: usize = 1024;

/// Connection lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// No socket is open.
    Disconnected,
    /// A socket is open and owned by the transport.
    Connected,
}

/// Socket timeouts.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportSettings {
    /// Maximum wait for response bytes.
    pub read_timeout: Duration,
    /// Dial timeout. `None` leaves it to the OS.
    pub connect_timeout: Option<Duration>,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            read_timeout: DEFAULT_READ_TIMEOUT,
            connect_timeout: None,
        }
    }
}

/// Owns the controller socket and frames commands over it.
///
/// Exactly one command is in flight at a time: `send_command` writes the frame
/// and blocks until the full response is parsed. The socket is closed on
/// `close()`, on drop, and whenever a read or write fails (timeout, peer close,
/// other I/O error), after which the transport is `Disconnected` and must be
/// reconnected.
pub struct Transport<S: Link = TcpStream> {
    stream: Option<S>,
    peer: Option<String>,
    settings: TransportSettings,
    span: Span,
}

fn default_span() -> Span {
    info_span!("mcode", peer = field::Empty)
}

impl Transport<TcpStream> {
    /// Create a disconnected transport.
    pub fn new(settings: TransportSettings) -> Self {
        Self {
            stream: None,
            peer: None,
            settings,
            span: default_span(),
        }
    }

    /// Open a TCP connection to the controller.
    ///
    /// Any existing socket is closed first. The read timeout is applied to the
    /// new socket before it is stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the socket cannot be established.
    pub fn connect(&mut self, host: &str, port: u16) -> Result<()> {
        self.close();

        let addr = format!("{host}:{port}");
        let stream = self
            .dial(host, port)
            .and_then(|stream| {
                stream.set_read_timeout(Some(self.settings.read_timeout))?;
                stream.set_nodelay(true)?;
                Ok(stream)
            })
            .map_err(|source| {
                warn!(parent: &self.span, %addr, error = %source, "connect failed");
                Error::Connect {
                    addr: addr.clone(),
                    source,
                }
            })?;

        self.span.record("peer", addr.as_str());
        info!(parent: &self.span, %addr, "connected");
        self.stream = Some(stream);
        self.peer = Some(addr);
        Ok(())
    }

    fn dial(&self, host: &str, port: u16) -> io::Result<TcpStream> {
        let Some(timeout) = self.settings.connect_timeout else {
            return TcpStream::connect((host, port));
        };

        let mut last_err = None;
        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, timeout) {
                Ok(stream) => return Ok(stream),
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or_else(|| {
            io::Error::new(ErrorKind::InvalidInput, "host resolved to no addresses")
        }))
    }
}

impl<S: Link> Transport<S> {
    /// Wrap an already-open stream. The transport starts `Connected`.
    ///
    /// The configured read timeout is applied to the stream first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the stream rejects the read timeout.
    pub fn from_stream(mut stream: S, settings: TransportSettings) -> Result<Self> {
        stream.set_read_timeout(Some(settings.read_timeout))?;
        Ok(Self {
            stream: Some(stream),
            peer: None,
            settings,
            span: default_span(),
        })
    }

    /// Replace the span all transport events are recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// The span transport events are recorded under.
    #[inline]
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Current connection state.
    #[inline]
    pub fn state(&self) -> ConnectionState {
        if self.stream.is_some() {
            ConnectionState::Connected
        } else {
            ConnectionState::Disconnected
        }
    }

    /// True while a socket is open.
    #[inline]
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    /// `host:port` of the current connection, if opened via `connect`.
    #[inline]
    pub fn peer(&self) -> Option<&str> {
        self.peer.as_deref()
    }

    /// Socket timeouts in use.
    #[inline]
    pub fn settings(&self) -> &TransportSettings {
        &self.settings
    }

    /// Release the socket. No-op when already closed.
    pub fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            if let Err(e) = stream.shutdown() {
                debug!(parent: &self.span, error = %e, "shutdown failed");
            }
            info!(parent: &self.span, peer = ?self.peer, "connection closed");
        }
        self.peer = None;
    }

    /// Send one command and return its validated response.
    ///
    /// Transmits `command` followed by a single carriage return, then reads
    /// until a sentinel arrives.
    ///
    /// # Errors
    ///
    /// - [`Error::NotConnected`] if no socket is open
    /// - [`ProtocolError::InvalidCommand`] if `command` holds CR/LF or non-ASCII text
    /// - [`ProtocolError::EchoMismatch`] if line 0 of the reply differs from `command`
    /// - [`Error::Timeout`], [`Error::ConnectionClosed`], [`Error::Io`] on socket failure
    pub fn send_command(&mut self, command: &str) -> Result<Response> {
        if self.stream.is_none() {
            return Err(Error::NotConnected);
        }
        let frame = encode_command(command)?;

        debug!(parent: &self.span, command, "sending command");
        let written = match self.stream.as_mut() {
            Some(stream) => stream.write_all(&frame).and_then(|()| stream.flush()),
            None => return Err(Error::NotConnected),
        };
        if let Err(e) = written {
            return Err(self.fail(e, command, String::new()));
        }

        let response = self.read_response(command)?;
        if response.echo() != Some(command) {
            warn!(parent: &self.span, command, lines = ?response.lines, "echo mismatch");
            return Err(ProtocolError::EchoMismatch {
                command: command.to_owned(),
                lines: response.lines,
            }
            .into());
        }
        Ok(response)
    }

    /// Read one response frame from the socket.
    ///
    /// Reads in chunks of [`READ_CHUNK_SIZE`] until the accumulated bytes hold
    /// a `'>'` or `'?'`, strips the trailing sentinel run and returns the
    /// non-empty lines. No echo validation is done here.
    pub fn receive_response(&mut self) -> Result<Response> {
        self.read_response("")
    }

    fn read_response(&mut self, command: &str) -> Result<Response> {
        let mut buffer = ResponseBuffer::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];

        loop {
            let read = match self.stream.as_mut() {
                Some(stream) => stream.read(&mut chunk),
                None => return Err(Error::NotConnected),
            };

            match read {
                Ok(0) => {
                    let partial = buffer.lossy_text();
                    warn!(parent: &self.span, command, ?partial, "connection closed by the controller");
                    self.drop_stream();
                    return Err(Error::ConnectionClosed { partial });
                }
                Ok(n) => {
                    if buffer.push(&chunk[..n]) {
                        break;
                    }
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    let partial = buffer.lossy_text();
                    return Err(self.fail(e, command, partial));
                }
            }
        }

        debug!(parent: &self.span, received = ?buffer.lossy_text(), "received response");
        match buffer.parse() {
            Some(parsed) => Ok(parsed?),
            None => Err(Error::ConnectionClosed {
                partial: buffer.lossy_text(),
            }),
        }
    }

    fn drop_stream(&mut self) {
        self.stream = None;
        self.peer = None;
    }

    /// Drop the socket and classify a failed read or write.
    fn fail(&mut self, err: io::Error, command: &str, partial: String) -> Error {
        self.drop_stream();
        if is_timeout(&err) {
            warn!(parent: &self.span, command, timeout = ?self.settings.read_timeout, "read timed out");
            Error::Timeout {
                command: command.to_owned(),
                timeout: self.settings.read_timeout,
            }
        } else if is_disconnect(&err) {
            warn!(parent: &self.span, command, error = %err, "connection lost");
            Error::ConnectionClosed { partial }
        } else {
            warn!(parent: &self.span, command, error = %err, "socket error");
            Error::Io(err)
        }
    }
}

impl<S: Link> Drop for Transport<S> {
    fn drop(&mut self) {
        self.close();
    }
}
