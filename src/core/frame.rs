//! Frame type and pure wire encoding.
//!
//! A frame is `[kind(1)] [payload length(4, LE)] [payload]`. The length
//! prefix exists because TCP is a byte stream with no message boundaries:
//! without it a reader cannot tell where one request ends and the next
//! begins. UDP reuses the same layout so both transports speak one format.

use crate::config::MAX_PAYLOAD_SIZE;
use crate::error::{Result, TransportError};
use bytes::{Buf, BufMut};

/// Width of the request kind tag. Fixed per the wire contract.
pub const KIND_WIDTH: usize = 1;

/// Width of the little-endian payload length field.
pub const LEN_WIDTH: usize = 4;

/// Bytes preceding the payload in every frame.
pub const HEADER_SIZE: usize = KIND_WIDTH + LEN_WIDTH;

/// One decoded request: a kind tag and an opaque payload.
///
/// The payload is opaque to the transport; its meaning per kind is defined
/// by the application, usually through
/// [`FramePayload`](crate::core::payload::FramePayload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Application-defined discriminator.
    pub kind: u8,
    /// Raw payload bytes. May be empty.
    pub payload: Vec<u8>,
}

impl Request {
    pub fn new(kind: u8, payload: Vec<u8>) -> Self {
        Self { kind, payload }
    }

    /// A type-only signal with no body.
    pub fn empty(kind: u8) -> Self {
        Self {
            kind,
            payload: Vec::new(),
        }
    }

    /// Size of this request on the wire.
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.payload.len()
    }

    /// Encode into wire bytes. Deterministic: the same request always
    /// produces byte-identical output.
    pub fn to_bytes(&self) -> Vec<u8> {
        debug_assert!(self.payload.len() <= MAX_PAYLOAD_SIZE);
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.put_u8(self.kind);
        buf.put_u32_le(self.payload.len() as u32);
        buf.put_slice(&self.payload);
        buf
    }

    /// Decode one frame from the front of `bytes`.
    ///
    /// Trailing bytes past the declared length are not consumed, so callers
    /// can carve frames off a larger buffer one at a time. Malformed input
    /// always returns an error, never a partially populated request.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        if bytes.len() < HEADER_SIZE {
            return Err(TransportError::TruncatedHeader {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let mut header = &bytes[..HEADER_SIZE];
        let kind = header.get_u8();
        let declared = header.get_u32_le() as usize;

        if declared > MAX_PAYLOAD_SIZE {
            return Err(TransportError::OversizedFrame(declared));
        }

        let rest = &bytes[HEADER_SIZE..];
        if rest.len() < declared {
            return Err(TransportError::TruncatedPayload {
                declared,
                actual: rest.len(),
            });
        }

        Ok(Self {
            kind,
            payload: rest[..declared].to_vec(),
        })
    }
}
