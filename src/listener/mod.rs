//! # Listeners
//!
//! Inbound transport supervisors and the event channel types they share.
//!
//! Both supervisors follow the same contract: `start` binds the socket (bind
//! failure is fatal and immediate), spawns a driver task, and returns a
//! [`ListenerHandle`]. Decoded requests arrive on a bounded mpsc channel as
//! [`NetworkEvent`]s; a full channel stalls the producing read loop, which
//! stalls the socket, which is deliberate backpressure. Malformed input is reported
//! out of band as [`DecodeFault`]s and never tears down the listener.
//!
//! Stopping is cooperative: [`ListenerHandle::stop`] closes the stop signal
//! once, the driver task exits at its next suspension point and drops the
//! socket. Accepted TCP connections are not forcibly closed; their readers
//! terminate independently on end-of-stream, I/O error, or an
//! application-driven close.

pub mod tcp;
pub mod udp;

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::core::frame::Request;
use crate::discovery;
use crate::error::{Result, TransportError};

/// A decoded request tagged with its addressable counterpart.
#[derive(Debug, Clone)]
pub struct NetworkEvent {
    pub request: Request,
    pub peer: PeerHandle,
}

/// The addressable counterpart of a received request.
#[derive(Debug, Clone)]
pub enum PeerHandle {
    /// TCP: a live connection that can be replied on or closed.
    Stream(ConnectionHandle),
    /// UDP: the sender's address. There is no connection object; replies go
    /// through [`client::send_udp`](crate::client::send_udp).
    Datagram(SocketAddr),
}

impl PeerHandle {
    /// Remote address of the peer, whichever transport it arrived on.
    pub fn addr(&self) -> SocketAddr {
        match self {
            PeerHandle::Stream(conn) => conn.peer_addr(),
            PeerHandle::Datagram(addr) => *addr,
        }
    }
}

/// Write side of an accepted TCP connection.
///
/// Cloning is cheap and shares the underlying socket; the read side stays
/// with the reader task that produced the event.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    peer_addr: SocketAddr,
    writer: Arc<Mutex<OwnedWriteHalf>>,
}

impl ConnectionHandle {
    pub(crate) fn new(peer_addr: SocketAddr, writer: OwnedWriteHalf) -> Self {
        Self {
            peer_addr,
            writer: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Send a framed reply on this connection.
    pub async fn reply(&self, request: &Request) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(&request.to_bytes()).await?;
        Ok(())
    }

    /// Shut down the write side. The peer observes end-of-stream; the reader
    /// task winds down when the peer closes its half.
    pub async fn close(&self) -> Result<()> {
        self.writer.lock().await.shutdown().await?;
        Ok(())
    }
}

/// Out-of-band notification that a peer sent something undecodable.
#[derive(Debug)]
pub struct DecodeFault {
    pub peer: SocketAddr,
    pub error: TransportError,
}

/// Lifecycle state of a listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerState {
    Running,
    Stopped,
}

/// Handle to a running listener.
///
/// Owns the stop signal. [`stop`](Self::stop) transitions `Running →
/// Stopped` exactly once; further calls are no-ops. Dropping the handle
/// stops the listener.
#[derive(Debug)]
pub struct ListenerHandle {
    local_addr: SocketAddr,
    state: ListenerState,
    shutdown: Option<mpsc::Sender<()>>,
    driver: Option<JoinHandle<()>>,
}

impl ListenerHandle {
    pub(crate) fn new(
        local_addr: SocketAddr,
        shutdown: mpsc::Sender<()>,
        driver: JoinHandle<()>,
    ) -> Self {
        Self {
            local_addr,
            state: ListenerState::Running,
            shutdown: Some(shutdown),
            driver: Some(driver),
        }
    }

    /// The address actually bound, with the real port when the
    /// configuration asked for port 0.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn state(&self) -> ListenerState {
        self.state
    }

    /// Signal the driver task to stop and close the listening socket.
    ///
    /// Idempotent. In-flight TCP connections finish independently; events
    /// already in the channel remain consumable.
    pub fn stop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            info!(local_addr = %self.local_addr, "stopping listener");
            // Dropping the only sender closes the channel: a one-shot
            // broadcast every select loop observes on its next wakeup.
            drop(shutdown);
            self.state = ListenerState::Stopped;
        }
    }

    /// Wait for the driver task to exit. Returns immediately if it already
    /// has; does not itself trigger a stop.
    pub async fn join(&mut self) {
        if let Some(driver) = self.driver.take() {
            let _ = driver.await;
        }
    }
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Forward a malformed-input notification to the observer, if any.
/// Best-effort: a full or dropped observer never blocks a read loop.
pub(crate) fn report_fault(
    faults: &Option<mpsc::Sender<DecodeFault>>,
    peer: SocketAddr,
    error: TransportError,
) {
    let Some(tx) = faults else { return };
    if let Err(err) = tx.try_send(DecodeFault { peer, error }) {
        debug!(%peer, "fault observer unavailable: {err}");
    }
}

/// Log the host's routable interface address at listener startup.
/// Informational only; lookup failure never aborts startup.
pub(crate) async fn log_host_address() {
    match discovery::local_ip().await {
        Ok(ip) => info!(local_ip = %ip, "host address"),
        Err(err) => debug!("local address lookup failed: {err}"),
    }
}
