//! # Core Framing Components
//!
//! The wire format, the codecs that produce and consume it, and the typed
//! payload bridge.
//!
//! ## Components
//! - **Frame**: the [`frame::Request`] type with pure encode/decode
//! - **Codec**: tokio codec for framing requests over byte streams
//! - **Payload**: statically-typed payload encoding on top of the opaque bytes
//!
//! ## Wire Format
//! ```text
//! [Kind(1)] [Length(4, little-endian)] [Payload(N)]
//! ```
//!
//! No magic number, no version byte, no checksum: framing relies entirely on
//! the length prefix and on transport reliability (TCP) or per-datagram
//! delivery (UDP). The one-byte kind tag is a fixed part of this wire
//! contract.

pub mod codec;
pub mod frame;
pub mod payload;
