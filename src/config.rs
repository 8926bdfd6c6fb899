//! # Listener Configuration
//!
//! Programmatic configuration for TCP and UDP listeners.
//!
//! There is no config file and no CLI surface: a [`ListenerConfig`] is built
//! in code, validated once, and handed to a listener's `start` function.
//! Defaults are production-safe; `with_*` builders override individual knobs.

use crate::error::{Result, TransportError};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Max allowed payload size (16 MB)
pub const MAX_PAYLOAD_SIZE: usize = 16 * 1024 * 1024;

/// Default capacity of the event channel. A full channel stalls the
/// producing read loop, which in turn stalls the underlying socket.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// Default cap on concurrently served TCP connections.
pub const DEFAULT_MAX_CONNECTIONS: usize = 1024;

/// Default liveness window for TCP connection reads. Elapsing is not an
/// error; the reader loops again.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(5);

/// Largest datagram the UDP receive loop will buffer.
pub const MAX_DATAGRAM_SIZE: usize = 64 * 1024;

/// Configuration for a single listener, TCP or UDP.
#[derive(Debug, Clone)]
pub struct ListenerConfig {
    /// Interface to bind. Defaults to all interfaces.
    pub ip: IpAddr,

    /// Port to bind. Port 0 picks an ephemeral port; the bound address is
    /// reported by `ListenerHandle::local_addr`.
    pub port: u16,

    /// Capacity of the event channel between the listener and the application.
    pub channel_capacity: usize,

    /// Admission control: connections past this cap are refused at accept
    /// time. Ignored by UDP, which has no connection concept.
    pub max_connections: usize,

    /// Liveness window applied to each TCP frame read.
    pub read_timeout: Duration,

    /// Largest payload a single frame may declare.
    pub max_frame_size: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            ip: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 0,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
            max_connections: DEFAULT_MAX_CONNECTIONS,
            read_timeout: DEFAULT_READ_TIMEOUT,
            max_frame_size: MAX_PAYLOAD_SIZE,
        }
    }
}

impl ListenerConfig {
    /// Configuration with defaults for everything except the port.
    pub fn new(port: u16) -> Self {
        Self {
            port,
            ..Self::default()
        }
    }

    pub fn with_ip(mut self, ip: IpAddr) -> Self {
        self.ip = ip;
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    pub fn with_max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_max_frame_size(mut self, size: usize) -> Self {
        self.max_frame_size = size;
        self
    }

    /// The address a listener built from this configuration binds.
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip, self.port)
    }

    /// Validate the configuration. Called by the listeners before binding.
    pub fn validate(&self) -> Result<()> {
        if self.channel_capacity == 0 {
            return Err(TransportError::Config(
                "channel_capacity must be at least 1".to_string(),
            ));
        }
        if self.max_connections == 0 {
            return Err(TransportError::Config(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.max_frame_size == 0 || self.max_frame_size > MAX_PAYLOAD_SIZE {
            return Err(TransportError::Config(format!(
                "max_frame_size must be between 1 and {MAX_PAYLOAD_SIZE}"
            )));
        }
        if self.read_timeout.is_zero() {
            return Err(TransportError::Config(
                "read_timeout must be non-zero".to_string(),
            ));
        }
        Ok(())
    }
}
