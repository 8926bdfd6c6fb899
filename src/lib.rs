//! # netframe
//!
//! Length-prefixed request framing and listeners for TCP and UDP transports.
//!
//! Inbound traffic on a configured port is decoded into discrete, typed
//! [`Request`]s and delivered to application code through one event channel,
//! regardless of which transport carried it.
//!
//! ## Architecture
//! - [`core`]: the wire format with pure frame encode/decode, a tokio codec
//!   for byte streams, and a statically-typed payload trait
//! - [`listener`]: TCP and UDP supervisors producing [`NetworkEvent`]s,
//!   with a cooperative stop contract
//! - [`client`]: outbound helpers sharing the same frame format
//! - [`discovery`]: informational host address lookups
//!
//! ## Wire Format
//! ```text
//! [Kind(1)] [Length(4, little-endian)] [Payload(N)]
//! ```
//!
//! ## Quick Start
//! ```no_run
//! use netframe::{listener::tcp, ListenerConfig, PeerHandle, Request};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> netframe::Result<()> {
//!     let (events, mut requests) = mpsc::channel(256);
//!     let mut listener = tcp::start(ListenerConfig::new(5050), events).await?;
//!
//!     while let Some(event) = requests.recv().await {
//!         println!("request kind {} from {}", event.request.kind, event.peer.addr());
//!         if let PeerHandle::Stream(conn) = &event.peer {
//!             conn.reply(&Request::empty(0)).await?;
//!         }
//!     }
//!
//!     listener.stop();
//!     Ok(())
//! }
//! ```
//!
//! ## Concurrency Model
//! One task per accepted TCP connection, one for the UDP receive loop, one
//! for the TCP accept loop. Frames from a single TCP connection reach the
//! event channel in read order; across connections and transports, events
//! interleave by arrival. The channel is bounded: a slow consumer stalls
//! the producing read loops rather than growing a queue.

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod client;
pub mod config;
pub mod core;
pub mod discovery;
pub mod error;
pub mod listener;

pub use crate::config::ListenerConfig;
pub use crate::core::codec::FrameCodec;
pub use crate::core::frame::Request;
pub use crate::core::payload::FramePayload;
pub use crate::error::{Result, TransportError};
pub use crate::listener::{
    ConnectionHandle, DecodeFault, ListenerHandle, ListenerState, NetworkEvent, PeerHandle,
};
