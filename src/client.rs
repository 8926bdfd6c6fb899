//! # Outbound Helpers
//!
//! Client-side counterparts to the listeners: fire-and-forget UDP send, an
//! open-and-send TCP connect, and a single-shot request/reply exchange.
//! They share the frame format with the listeners, so anything sent here
//! decodes on the other side's event channel unchanged.
//!
//! These helpers are deliberately connection-per-call: no pooling, no
//! multiplexing. An application holding a [`PeerHandle`] from an inbound
//! event replies through that handle instead.
//!
//! [`PeerHandle`]: crate::listener::PeerHandle

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use tokio::net::{TcpStream, ToSocketAddrs, UdpSocket};
use tokio::time::timeout;
use tokio_util::codec::Framed;
use tracing::debug;

use crate::core::codec::FrameCodec;
use crate::core::frame::Request;
use crate::error::{Result, TransportError};

/// Send one framed request as a single datagram and return immediately.
///
/// Binds an ephemeral local port per call, so concurrent senders never
/// collide. Fire-and-forget: delivery is not confirmed.
pub async fn send_udp<A: ToSocketAddrs>(target: A, request: &Request) -> Result<()> {
    let socket = UdpSocket::bind("0.0.0.0:0").await?;
    socket.send_to(&request.to_bytes(), target).await?;
    Ok(())
}

/// Open a TCP connection and send one framed request.
///
/// Returns the framed stream so the caller can read replies or send further
/// frames; dropping it closes the connection.
pub async fn connect_and_send<A: ToSocketAddrs>(
    target: A,
    request: Request,
) -> Result<Framed<TcpStream, FrameCodec>> {
    let stream = TcpStream::connect(target).await?;
    let peer = stream.peer_addr()?;
    let mut framed = Framed::new(stream, FrameCodec::default());
    framed.send(request).await?;
    debug!(%peer, "request sent");
    Ok(framed)
}

/// Single request/reply exchange: connect, send one frame, await exactly one
/// reply frame, then drop the connection.
///
/// Fails with [`TransportError::Timeout`] when no reply arrives within
/// `reply_timeout`, and [`TransportError::ConnectionClosed`] when the peer
/// closes without replying.
pub async fn exchange<A: ToSocketAddrs>(
    target: A,
    request: Request,
    reply_timeout: Duration,
) -> Result<Request> {
    let mut framed = connect_and_send(target, request).await?;
    match timeout(reply_timeout, framed.next()).await {
        Err(_) => Err(TransportError::Timeout),
        Ok(None) => Err(TransportError::ConnectionClosed),
        Ok(Some(reply)) => reply,
    }
}
