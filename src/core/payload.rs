//! Statically-typed payload encoding.
//!
//! The transport treats payloads as opaque bytes. Applications that want
//! typed messages implement [`FramePayload`] per message shape: the kind tag
//! is an associated constant resolved at compile time, and the byte
//! conversion defaults to bincode through serde. No runtime type inspection
//! anywhere.
//!
//! ```
//! use netframe::{FramePayload, Request};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize, Deserialize)]
//! struct Ping {
//!     seq: u32,
//! }
//!
//! impl FramePayload for Ping {
//!     const KIND: u8 = 1;
//! }
//!
//! # fn main() -> netframe::Result<()> {
//! let request = Request::from_payload(&Ping { seq: 7 })?;
//! let ping: Ping = request.parse_payload()?;
//! assert_eq!(ping.seq, 7);
//! # Ok(())
//! # }
//! ```

use crate::core::frame::Request;
use crate::error::{Result, TransportError};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A typed value that can travel as the payload of a [`Request`].
pub trait FramePayload: Serialize + DeserializeOwned {
    /// Wire tag identifying this payload shape. Part of the application's
    /// wire contract; two payload types must not share a kind.
    const KIND: u8;

    /// Serialize into opaque payload bytes.
    fn to_payload(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| TransportError::Serialize(e.to_string()))
    }

    /// Deserialize from opaque payload bytes.
    fn from_payload(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| TransportError::Deserialize(e.to_string()))
    }
}

impl Request {
    /// Build a framed request from a typed payload.
    pub fn from_payload<T: FramePayload>(value: &T) -> Result<Self> {
        Ok(Self::new(T::KIND, value.to_payload()?))
    }

    /// Parse the payload as `T`, checking the kind tag first.
    pub fn parse_payload<T: FramePayload>(&self) -> Result<T> {
        if self.kind != T::KIND {
            return Err(TransportError::KindMismatch {
                expected: T::KIND,
                actual: self.kind,
            });
        }
        T::from_payload(&self.payload)
    }
}
