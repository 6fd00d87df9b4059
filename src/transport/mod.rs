//! Transport layer: the TCP connection and MCode framing.
//!
//! Knows nothing about motor semantics. One command produces exactly one
//! response; the echo of the command is validated before the response is
//! handed back.

mod connection;
pub mod framing;
mod link;
#[cfg(test)]
pub(crate) mod mock;

pub use connection::{
    ConnectionState, Transport, TransportSettings, DEFAULT_PORT, DEFAULT_READ_TIMEOUT,
    READ_CHUNK_SIZE,
};
pub use framing::{Response, Sentinel};
pub use link::Link;
