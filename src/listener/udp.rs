//! # UDP Listener Supervisor
//!
//! Owns a bound UDP socket and runs a single receive loop. UDP has no
//! per-peer connection object, so there is nothing to spawn per sender.
//! Each datagram is decoded as exactly one frame: the transport already
//! preserves message boundaries, so no accumulation across reads is needed.
//! A datagram carrying a truncated frame is reported and dropped; the loop
//! continues.

use tokio::net::UdpSocket;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use super::{log_host_address, report_fault, DecodeFault, ListenerHandle, NetworkEvent, PeerHandle};
use crate::config::{ListenerConfig, MAX_DATAGRAM_SIZE};
use crate::core::frame::Request;
use crate::error::{Result, TransportError};

/// Bind a UDP listener and start receiving datagrams.
///
/// Returns the receiving end of the event channel (sized by
/// `config.channel_capacity`) together with the stop handle. Bind failure
/// fails fast with [`TransportError::Bind`].
pub async fn start(
    config: ListenerConfig,
) -> Result<(mpsc::Receiver<NetworkEvent>, ListenerHandle)> {
    start_with_observer(config, None).await
}

/// Like [`start`], additionally forwarding malformed-input notifications to
/// `faults`.
pub async fn start_with_observer(
    config: ListenerConfig,
    faults: Option<mpsc::Sender<DecodeFault>>,
) -> Result<(mpsc::Receiver<NetworkEvent>, ListenerHandle)> {
    config.validate()?;

    let addr = config.socket_addr();
    let socket = UdpSocket::bind(addr)
        .await
        .map_err(|source| TransportError::Bind { addr, source })?;
    let local_addr = socket.local_addr()?;

    info!(%local_addr, "udp listener started");
    log_host_address().await;

    let (event_tx, event_rx) = mpsc::channel(config.channel_capacity);
    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    let driver = tokio::spawn(receive_loop(socket, event_tx, faults, shutdown_rx));
    Ok((event_rx, ListenerHandle::new(local_addr, shutdown_tx, driver)))
}

async fn receive_loop(
    socket: UdpSocket,
    events: mpsc::Sender<NetworkEvent>,
    faults: Option<mpsc::Sender<DecodeFault>>,
    mut shutdown_rx: mpsc::Receiver<()>,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("udp listener stopping");
                break;
            }
            received = socket.recv_from(&mut buf) => {
                match received {
                    Ok((len, peer)) => match Request::from_bytes(&buf[..len]) {
                        Ok(request) => {
                            let event = NetworkEvent {
                                request,
                                peer: PeerHandle::Datagram(peer),
                            };
                            if events.send(event).await.is_err() {
                                debug!("event channel closed, udp listener exiting");
                                break;
                            }
                        }
                        // One datagram is one frame; a bad one is dropped.
                        Err(err) => {
                            warn!(%peer, "failed to decode datagram: {err}");
                            report_fault(&faults, peer, err);
                        }
                    },
                    Err(err) => error!("recv failed: {err}"),
                }
            }
        }
    }
    // the socket closes when it drops here
}
