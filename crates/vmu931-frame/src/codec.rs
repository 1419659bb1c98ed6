use std::time::Duration;

use bytes::{Buf, BufMut, Bytes, BytesMut};
use tracing::trace;

use crate::error::{FrameError, Result};

/// First byte of every frame.
pub const START_MARKER: u8 = 0x01;

/// Last byte of every frame.
pub const END_MARKER: u8 = 0x04;

/// Bytes of framing counted by the size byte: start + size + tag + end.
///
/// The declared size is the full on-wire length of the frame, so the payload
/// is always `declared - FRAME_OVERHEAD` bytes long.
pub const FRAME_OVERHEAD: usize = 4;

/// Largest payload a single frame can carry.
pub const MAX_PAYLOAD: usize = u8::MAX as usize - FRAME_OVERHEAD;

/// Default delay between command bytes.
///
/// The firmware needs at least 1 ms between bytes to recognise a command.
pub const DEFAULT_COMMAND_PACING: Duration = Duration::from_millis(5);

/// A validated frame: the message-type tag and its raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// ASCII message-type tag (e.g. `b'q'`).
    pub tag: u8,
    /// Payload bytes between the tag and the end marker.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(tag: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            tag,
            payload: payload.into(),
        }
    }

    /// The tag as a character, for logging.
    pub fn tag_char(&self) -> char {
        char::from(self.tag)
    }

    /// The total wire size of this frame (markers + tag + payload).
    pub fn wire_size(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }
}

/// Why a frame was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidFrame {
    /// The byte where the end marker belongs was something else.
    #[error("invalid footer {found:#04x} on '{}' frame (expected 0x04)", tag_char(.tag))]
    BadFooter { tag: u8, found: u8 },

    /// The size byte is smaller than the framing overhead.
    #[error("declared size {0} is smaller than the 4-byte frame overhead")]
    MalformedSize(u8),
}

fn tag_char(tag: &u8) -> char {
    char::from(*tag)
}

/// Outcome of decoding one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    Frame(Frame),
    Invalid(InvalidFrame),
}

/// Discard bytes up to the next start marker.
///
/// Returns how many bytes were skipped. Each skipped byte is a
/// resynchronization event, not an error. If no marker is buffered, the
/// whole buffer is discarded.
pub fn synchronize(src: &mut BytesMut) -> usize {
    let skip = src
        .iter()
        .position(|&b| b == START_MARKER)
        .unwrap_or(src.len());

    for byte in &src[..skip] {
        trace!("skipping {byte:#04x} while waiting for start marker");
    }

    src.advance(skip);
    skip
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌────────┬──────────┬─────────┬──────────────────┬────────┐
/// │ Start  │ Size     │ Tag     │ Payload          │ End    │
/// │ 0x01   │ (1B)     │ (ASCII) │ (Size - 4 bytes) │ 0x04   │
/// └────────┴──────────┴─────────┴──────────────────┴────────┘
/// ```
pub fn encode_frame(tag: u8, payload: &[u8], dst: &mut BytesMut) -> Result<()> {
    if payload.len() > MAX_PAYLOAD {
        return Err(FrameError::PayloadTooLarge {
            size: payload.len(),
            max: MAX_PAYLOAD,
        });
    }
    dst.reserve(FRAME_OVERHEAD + payload.len());
    dst.put_u8(START_MARKER);
    dst.put_u8((FRAME_OVERHEAD + payload.len()) as u8);
    dst.put_u8(tag);
    dst.put_slice(payload);
    dst.put_u8(END_MARKER);
    Ok(())
}

/// Decode a frame from a buffer that starts at a start marker.
///
/// Returns `None` if the buffer does not begin with a start marker or does
/// not hold a complete frame yet. Otherwise consumes the frame bytes and
/// reports either the frame or the reason it was dropped. A malformed size
/// only consumes the start and size bytes so scanning can resume right after.
pub fn decode_frame(src: &mut BytesMut) -> Option<Decoded> {
    if src.first() != Some(&START_MARKER) || src.len() < 2 {
        return None;
    }

    let declared = src[1];
    let total = declared as usize;
    if total < FRAME_OVERHEAD {
        src.advance(2);
        return Some(Decoded::Invalid(InvalidFrame::MalformedSize(declared)));
    }

    if src.len() < total {
        return None; // Need more data
    }

    let mut raw = src.split_to(total);
    let tag = raw[2];
    let found = raw[total - 1];
    if found != END_MARKER {
        return Some(Decoded::Invalid(InvalidFrame::BadFooter { tag, found }));
    }

    raw.advance(3);
    raw.truncate(total - FRAME_OVERHEAD);
    Some(Decoded::Frame(Frame {
        tag,
        payload: raw.freeze(),
    }))
}

/// Configuration for the frame reader and command writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameConfig {
    /// Delay after each command byte. Default: 5 ms.
    pub command_pacing: Duration,
    /// Maximum bytes pulled from the source per read. Default: 256.
    pub read_chunk_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            command_pacing: DEFAULT_COMMAND_PACING,
            read_chunk_size: 256,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_frame(decoded: Option<Decoded>) -> Frame {
        match decoded {
            Some(Decoded::Frame(frame)) => frame,
            other => panic!("expected frame, got {other:?}"),
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let mut buf = BytesMut::new();
        let payload = [0x00, 0x00, 0x00, 0x01, 0x42, 0x34, 0x00, 0x00];

        encode_frame(b'h', &payload, &mut buf).unwrap();

        assert_eq!(buf.len(), FRAME_OVERHEAD + payload.len());
        assert_eq!(buf[1] as usize, buf.len());

        let frame = expect_frame(decode_frame(&mut buf));
        assert_eq!(frame.tag, b'h');
        assert_eq!(frame.payload.as_ref(), payload);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_decode_incomplete_header() {
        let mut buf = BytesMut::from(&[START_MARKER][..]);
        assert!(decode_frame(&mut buf).is_none());
        assert_eq!(buf.len(), 1);
    }

    #[test]
    fn test_decode_incomplete_payload() {
        let mut buf = BytesMut::new();
        encode_frame(b'e', &[0u8; 16], &mut buf).unwrap();
        buf.truncate(10);

        assert!(decode_frame(&mut buf).is_none());
        assert_eq!(buf.len(), 10);
    }

    #[test]
    fn test_decode_requires_start_marker() {
        let mut buf = BytesMut::from(&[0xFF, 0x04, b'h', 0x04][..]);
        assert!(decode_frame(&mut buf).is_none());
    }

    #[test]
    fn test_bad_footer_consumes_frame() {
        let mut buf = BytesMut::new();
        encode_frame(b'a', &[0xAA; 16], &mut buf).unwrap();
        let last = buf.len() - 1;
        buf[last] = 0x05;

        let decoded = decode_frame(&mut buf);
        assert_eq!(
            decoded,
            Some(Decoded::Invalid(InvalidFrame::BadFooter {
                tag: b'a',
                found: 0x05
            }))
        );
        assert!(buf.is_empty());
    }

    #[test]
    fn test_malformed_size_consumes_header_only() {
        let mut buf = BytesMut::from(&[START_MARKER, 0x02, b'q', 0x04][..]);

        let decoded = decode_frame(&mut buf);
        assert_eq!(
            decoded,
            Some(Decoded::Invalid(InvalidFrame::MalformedSize(2)))
        );
        assert_eq!(buf.as_ref(), &[b'q', 0x04]);
    }

    #[test]
    fn test_empty_payload() {
        let mut buf = BytesMut::new();
        encode_frame(b's', b"", &mut buf).unwrap();

        let frame = expect_frame(decode_frame(&mut buf));
        assert_eq!(frame.tag, b's');
        assert!(frame.payload.is_empty());
    }

    #[test]
    fn test_payload_too_large() {
        let mut buf = BytesMut::new();
        let err = encode_frame(b'q', &[0u8; MAX_PAYLOAD + 1], &mut buf).unwrap_err();
        assert!(matches!(err, FrameError::PayloadTooLarge { .. }));
        assert!(buf.is_empty());
    }

    #[test]
    fn test_synchronize_skips_noise() {
        let mut buf = BytesMut::from(&[0x42, 0xFF, 0x04, START_MARKER, 0x05][..]);
        assert_eq!(synchronize(&mut buf), 3);
        assert_eq!(buf.as_ref(), &[START_MARKER, 0x05]);
        assert_eq!(synchronize(&mut buf), 0);
    }

    #[test]
    fn test_synchronize_without_marker_drains() {
        let mut buf = BytesMut::from(&[0x10, 0x20, 0x30][..]);
        assert_eq!(synchronize(&mut buf), 3);
        assert!(buf.is_empty());
    }

    #[test]
    fn test_multiple_frames() {
        let mut buf = BytesMut::new();
        encode_frame(b'h', &[1u8; 8], &mut buf).unwrap();
        encode_frame(b'g', &[2u8; 16], &mut buf).unwrap();

        let f1 = expect_frame(decode_frame(&mut buf));
        assert_eq!(f1.tag, b'h');
        assert_eq!(f1.payload.len(), 8);

        let f2 = expect_frame(decode_frame(&mut buf));
        assert_eq!(f2.tag, b'g');
        assert_eq!(f2.payload.len(), 16);

        assert!(buf.is_empty());
    }

    #[test]
    fn test_frame_wire_size() {
        let frame = Frame::new(b'h', Bytes::from_static(&[0u8; 8]));
        assert_eq!(frame.wire_size(), 12);
        assert_eq!(frame.tag_char(), 'h');
    }
}
