//! Byte-stream seam between the transport and the socket.

use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

/// A bidirectional byte stream the transport can own.
///
/// Implemented for [`TcpStream`]; tests supply in-memory implementations.
pub trait Link: Read + Write {
    /// Bound how long a `read` may block. `None` blocks indefinitely.
    fn set_read_timeout(&mut self, _timeout: Option<Duration>) -> io::Result<()> {
        Ok(())
    }

    /// Release the underlying resource. Called once from `close()`.
    fn shutdown(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Link for TcpStream {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> io::Result<()> {
        TcpStream::set_read_timeout(self, timeout)
    }

    fn shutdown(&mut self) -> io::Result<()> {
        TcpStream::shutdown(self, Shutdown::Both)
    }
}

/// True for the error kinds a blocking socket reports when its read timeout expires.
#[inline]
pub(crate) fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// True for the error kinds that mean the peer went away.
#[inline]
pub(crate) fn is_disconnect(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::BrokenPipe
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::ConnectionAborted
            | io::ErrorKind::UnexpectedEof
    )
}
