//! # Error Types
//!
//! Error handling for the transport layer.
//!
//! All failures surface through a single [`TransportError`] enum so callers
//! match on one type regardless of which transport produced the error.
//!
//! ## Error Categories
//! - **Startup**: bind and configuration failures, fatal to a listener
//! - **Decode**: truncated or oversized frames, local to one frame
//! - **Connection**: I/O failures, closed peers, timeouts, local to one connection
//! - **Payload**: typed payload (de)serialization failures
//!
//! Decode and connection errors never propagate past the connection or
//! datagram that produced them; only bind-time errors fail a listener as a
//! whole.

use std::io;
use std::net::SocketAddr;
use thiserror::Error;

/// Primary error type for all transport operations.
#[derive(Error, Debug)]
pub enum TransportError {
    /// Binding the listening socket failed. Fatal to listener startup; the
    /// caller gets no handle and no event channel.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: io::Error,
    },

    /// Fewer bytes than the fixed frame header were available.
    #[error("truncated header: got {actual} of {expected} bytes")]
    TruncatedHeader { expected: usize, actual: usize },

    /// The header declared more payload bytes than were available.
    #[error("truncated payload: got {actual} of {declared} declared bytes")]
    TruncatedPayload { declared: usize, actual: usize },

    /// The header declared a payload larger than the configured maximum.
    #[error("frame payload of {0} bytes exceeds maximum")]
    OversizedFrame(usize),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("connection closed")]
    ConnectionClosed,

    #[error("operation timed out")]
    Timeout,

    #[error("serialize error: {0}")]
    Serialize(String),

    #[error("deserialize error: {0}")]
    Deserialize(String),

    /// A typed payload was parsed out of a request carrying a different kind tag.
    #[error("request kind mismatch: expected {expected}, got {actual}")]
    KindMismatch { expected: u8, actual: u8 },

    #[error("configuration error: {0}")]
    Config(String),

    /// Host address lookup failed. Informational lookups only; never fatal
    /// to listener startup.
    #[error("address discovery failed: {0}")]
    Discovery(String),
}

impl TransportError {
    /// True for frame-local decode failures that leave a read loop running.
    pub fn is_decode(&self) -> bool {
        matches!(
            self,
            TransportError::TruncatedHeader { .. }
                | TransportError::TruncatedPayload { .. }
                | TransportError::OversizedFrame(_)
        )
    }
}

/// Type alias for Results using TransportError
pub type Result<T> = std::result::Result<T, TransportError>;
