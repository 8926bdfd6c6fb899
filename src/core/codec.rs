//! Tokio codec for framing requests over byte streams.
//!
//! [`FrameCodec`] speaks the same wire format as
//! [`Request::to_bytes`]/[`Request::from_bytes`] but accumulates partial
//! frames across reads, so a frame split at any byte boundary decodes once
//! the rest arrives. Used with `FramedRead` by the TCP reader tasks and with
//! `Framed` by the outbound helpers.

use crate::config::MAX_PAYLOAD_SIZE;
use crate::core::frame::{Request, HEADER_SIZE, LEN_WIDTH};
use crate::error::TransportError;
use bytes::{Buf, BufMut, BytesMut};
use tokio_util::codec::{Decoder, Encoder};

/// Streaming codec for length-prefixed request frames.
#[derive(Debug, Clone)]
pub struct FrameCodec {
    max_frame_size: usize,
}

impl FrameCodec {
    pub fn new(max_frame_size: usize) -> Self {
        Self { max_frame_size }
    }
}

impl Default for FrameCodec {
    fn default() -> Self {
        Self::new(MAX_PAYLOAD_SIZE)
    }
}

impl Decoder for FrameCodec {
    type Item = Request;
    type Error = TransportError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Request>, TransportError> {
        if src.len() < HEADER_SIZE {
            return Ok(None);
        }

        // Length is validated before any allocation or buffering decision.
        let declared = u32::from_le_bytes([src[1], src[2], src[3], src[4]]) as usize;
        if declared > self.max_frame_size {
            return Err(TransportError::OversizedFrame(declared));
        }

        let frame_len = HEADER_SIZE + declared;
        if src.len() < frame_len {
            src.reserve(frame_len - src.len());
            return Ok(None);
        }

        let kind = src.get_u8();
        src.advance(LEN_WIDTH);
        let payload = src.split_to(declared).to_vec();
        Ok(Some(Request { kind, payload }))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Request>, TransportError> {
        match self.decode(src)? {
            Some(frame) => Ok(Some(frame)),
            None if src.is_empty() => Ok(None),
            // Bytes left at end-of-stream can never complete a frame.
            None if src.len() < HEADER_SIZE => Err(TransportError::TruncatedHeader {
                expected: HEADER_SIZE,
                actual: src.len(),
            }),
            None => {
                let declared = u32::from_le_bytes([src[1], src[2], src[3], src[4]]) as usize;
                Err(TransportError::TruncatedPayload {
                    declared,
                    actual: src.len() - HEADER_SIZE,
                })
            }
        }
    }
}

impl Encoder<Request> for FrameCodec {
    type Error = TransportError;

    fn encode(&mut self, item: Request, dst: &mut BytesMut) -> Result<(), TransportError> {
        if item.payload.len() > self.max_frame_size {
            return Err(TransportError::OversizedFrame(item.payload.len()));
        }

        dst.reserve(item.encoded_len());
        dst.put_u8(item.kind);
        dst.put_u32_le(item.payload.len() as u32);
        dst.put_slice(&item.payload);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn encoder_matches_pure_encoding() {
        let request = Request::new(9, b"payload".to_vec());
        let mut buf = BytesMut::new();
        FrameCodec::default().encode(request.clone(), &mut buf).unwrap();
        assert_eq!(&buf[..], &request.to_bytes()[..]);
    }

    #[test]
    fn decodes_frame_fed_one_byte_at_a_time() {
        let request = Request::new(3, b"dribble".to_vec());
        let wire = request.to_bytes();

        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::new();
        for (i, byte) in wire.iter().enumerate() {
            buf.put_u8(*byte);
            let decoded = codec.decode(&mut buf).unwrap();
            if i + 1 < wire.len() {
                assert!(decoded.is_none(), "decoded early at byte {i}");
            } else {
                assert_eq!(decoded.unwrap(), request);
            }
        }
        assert!(buf.is_empty());
    }

    #[test]
    fn decodes_back_to_back_frames() {
        let first = Request::new(1, b"one".to_vec());
        let second = Request::empty(2);

        let mut buf = BytesMut::new();
        buf.put_slice(&first.to_bytes());
        buf.put_slice(&second.to_bytes());

        let mut codec = FrameCodec::default();
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), first);
        assert_eq!(codec.decode(&mut buf).unwrap().unwrap(), second);
        assert!(codec.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn oversized_length_is_rejected_before_payload_arrives() {
        let mut codec = FrameCodec::new(16);
        let mut buf = BytesMut::new();
        buf.put_u8(1);
        buf.put_u32_le(17);

        match codec.decode(&mut buf) {
            Err(TransportError::OversizedFrame(17)) => {}
            other => panic!("expected OversizedFrame, got {other:?}"),
        }
    }

    #[test]
    fn oversized_payload_is_not_encoded() {
        let mut codec = FrameCodec::new(4);
        let mut buf = BytesMut::new();
        let result = codec.encode(Request::new(1, vec![0; 5]), &mut buf);
        assert!(matches!(result, Err(TransportError::OversizedFrame(5))));
        assert!(buf.is_empty());
    }

    #[test]
    fn leftover_header_bytes_error_at_eof() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&[0x01, 0x02][..]);
        assert!(matches!(
            codec.decode_eof(&mut buf),
            Err(TransportError::TruncatedHeader {
                expected: HEADER_SIZE,
                actual: 2
            })
        ));
    }

    #[test]
    fn leftover_payload_bytes_error_at_eof() {
        let wire = Request::new(1, b"abcdef".to_vec()).to_bytes();
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::from(&wire[..wire.len() - 2]);
        assert!(matches!(
            codec.decode_eof(&mut buf),
            Err(TransportError::TruncatedPayload {
                declared: 6,
                actual: 4
            })
        ));
    }

    #[test]
    fn clean_eof_is_not_an_error() {
        let mut codec = FrameCodec::default();
        let mut buf = BytesMut::new();
        assert!(codec.decode_eof(&mut buf).unwrap().is_none());
    }
}
