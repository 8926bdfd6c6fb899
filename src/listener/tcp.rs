//! # TCP Listener Supervisor
//!
//! Owns a bound TCP socket, accepts connections on a dedicated task, and
//! spawns one reader task per accepted connection. Every decoded frame is
//! delivered to the shared event channel as a
//! [`NetworkEvent`] whose peer is a [`PeerHandle::Stream`], so the
//! application can reply on the same connection.
//!
//! One connection's slowness never blocks acceptance of the next; within a
//! single connection, frames reach the channel in the order they were read.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::timeout;
use tokio_util::codec::FramedRead;
use tracing::{debug, error, info, warn};

use super::{
    log_host_address, report_fault, ConnectionHandle, DecodeFault, ListenerHandle, NetworkEvent,
    PeerHandle,
};
use crate::config::ListenerConfig;
use crate::core::codec::FrameCodec;
use crate::error::{Result, TransportError};

/// Bind a TCP listener and start accepting connections.
///
/// Decoded requests are delivered on `events`; the returned handle stops the
/// accept loop and closes the listening socket. Bind failure fails fast with
/// [`TransportError::Bind`]; there is no retry and no handle. Decode faults are logged;
/// use [`start_with_observer`] to also receive them out of band.
pub async fn start(
    config: ListenerConfig,
    events: mpsc::Sender<NetworkEvent>,
) -> Result<ListenerHandle> {
    start_with_observer(config, events, None).await
}

/// Like [`start`], additionally forwarding malformed-input notifications to
/// `faults`.
pub async fn start_with_observer(
    config: ListenerConfig,
    events: mpsc::Sender<NetworkEvent>,
    faults: Option<mpsc::Sender<DecodeFault>>,
) -> Result<ListenerHandle> {
    config.validate()?;

    let addr = config.socket_addr();
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| TransportError::Bind { addr, source })?;
    let local_addr = listener.local_addr()?;

    info!(%local_addr, "tcp listener started");
    log_host_address().await;

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    let driver = tokio::spawn(accept_loop(listener, config, events, faults, shutdown_rx));
    Ok(ListenerHandle::new(local_addr, shutdown_tx, driver))
}

async fn accept_loop(
    listener: TcpListener,
    config: ListenerConfig,
    events: mpsc::Sender<NetworkEvent>,
    faults: Option<mpsc::Sender<DecodeFault>>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    let permits = Arc::new(Semaphore::new(config.max_connections));

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("tcp listener stopping");
                break;
            }
            _ = events.closed() => {
                debug!("event channel closed, tcp listener exiting");
                break;
            }
            accepted = listener.accept() => {
                match accepted {
                    Ok((stream, peer)) => {
                        match permits.clone().try_acquire_owned() {
                            Ok(permit) => {
                                debug!(%peer, "connection accepted");
                                tokio::spawn(connection_reader(
                                    stream,
                                    peer,
                                    config.clone(),
                                    events.clone(),
                                    faults.clone(),
                                    permit,
                                ));
                            }
                            Err(_) => {
                                warn!(%peer, limit = config.max_connections,
                                    "connection limit reached, refusing");
                                drop(stream);
                            }
                        }
                    }
                    Err(err) => error!("accept failed: {err}"),
                }
            }
        }
    }
    // the listening socket closes when `listener` drops here
}

/// Per-connection read loop. Owns the read half; the write half is shared
/// with the application through the events' [`ConnectionHandle`].
async fn connection_reader(
    stream: TcpStream,
    peer: SocketAddr,
    config: ListenerConfig,
    events: mpsc::Sender<NetworkEvent>,
    faults: Option<mpsc::Sender<DecodeFault>>,
    _permit: OwnedSemaphorePermit,
) {
    let (read_half, write_half) = stream.into_split();
    let handle = ConnectionHandle::new(peer, write_half);
    let mut frames = FramedRead::new(read_half, FrameCodec::new(config.max_frame_size));

    loop {
        match timeout(config.read_timeout, frames.next()).await {
            // Liveness tick: nothing arrived within the window. Not an
            // error; the connection stays open.
            Err(_) => continue,
            Ok(None) => {
                debug!(%peer, "connection closed by peer");
                break;
            }
            Ok(Some(Ok(request))) => {
                let event = NetworkEvent {
                    request,
                    peer: PeerHandle::Stream(handle.clone()),
                };
                if events.send(event).await.is_err() {
                    debug!(%peer, "event channel closed, dropping connection");
                    break;
                }
            }
            Ok(Some(Err(err))) => {
                warn!(%peer, "failed to decode frame: {err}");
                report_fault(&faults, peer, err);
                // A hostile length prefix or I/O failure desyncs the byte
                // stream; only this connection terminates.
                break;
            }
        }
    }
}
