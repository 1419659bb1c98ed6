use std::io::{ErrorKind, Read};

use bytes::BytesMut;
use tracing::{debug, warn};

use crate::codec::{decode_frame, synchronize, Decoded, Frame, FrameConfig};
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Counters kept by a [`FrameReader`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Frames that passed footer and size validation.
    pub frames: u64,
    /// Frames dropped for a bad footer or malformed size.
    pub invalid_frames: u64,
    /// Bytes discarded while scanning for a start marker.
    pub resync_bytes: u64,
}

/// Reads frames from any `Read` byte source.
///
/// Handles partial reads and resynchronization internally. Each call to
/// [`read_frame`](Self::read_frame) yields at most one frame: an invalid frame
/// is dropped and reported as `Ok(None)` rather than retried.
pub struct FrameReader<T> {
    inner: T,
    buf: BytesMut,
    chunk: Vec<u8>,
    config: FrameConfig,
    stats: FrameStats,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            chunk: vec![0u8; config.read_chunk_size.max(1)],
            config,
            stats: FrameStats::default(),
        }
    }

    /// Read the next frame (blocking).
    ///
    /// Returns `Ok(None)` when the next frame had a bad footer or a malformed
    /// size; call again for the following one. Returns
    /// `Err(FrameError::ConnectionClosed)` when EOF is reached.
    pub fn read_frame(&mut self) -> Result<Option<Frame>> {
        loop {
            let skipped = synchronize(&mut self.buf);
            if skipped > 0 {
                self.stats.resync_bytes += skipped as u64;
                debug!(skipped, "discarded bytes while scanning for start marker");
            }

            match decode_frame(&mut self.buf) {
                Some(Decoded::Frame(frame)) => {
                    self.stats.frames += 1;
                    debug!(
                        tag = %frame.tag_char(),
                        size = frame.wire_size(),
                        "frame received"
                    );
                    return Ok(Some(frame));
                }
                Some(Decoded::Invalid(reason)) => {
                    self.stats.invalid_frames += 1;
                    warn!(%reason, "skipping invalid frame");
                    return Ok(None);
                }
                None => self.fill()?,
            }
        }
    }

    fn fill(&mut self) -> Result<()> {
        loop {
            let read = match self.inner.read(&mut self.chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.buf.extend_from_slice(&self.chunk[..read]);
            return Ok(());
        }
    }

    /// Counters since this reader was created.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Bytes read from the source but not yet decoded.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Borrow the underlying source.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying source.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner source.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame reader configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use bytes::{BufMut, BytesMut};

    use super::*;
    use crate::codec::{encode_frame, END_MARKER, START_MARKER};

    fn heading_payload() -> [u8; 8] {
        [0x00, 0x00, 0x00, 0x01, 0x42, 0x34, 0x00, 0x00]
    }

    #[test]
    fn read_single_frame() {
        let mut wire = BytesMut::new();
        encode_frame(b'h', &heading_payload(), &mut wire).unwrap();

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));
        let frame = reader.read_frame().unwrap().unwrap();

        assert_eq!(frame.tag, b'h');
        assert_eq!(frame.payload.as_ref(), heading_payload());
        assert_eq!(reader.stats().frames, 1);
    }

    #[test]
    fn read_multiple_frames() {
        let mut wire = BytesMut::new();
        encode_frame(b'q', &[1u8; 20], &mut wire).unwrap();
        encode_frame(b'e', &[2u8; 16], &mut wire).unwrap();
        encode_frame(b'h', &[3u8; 8], &mut wire).unwrap();

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));

        let f1 = reader.read_frame().unwrap().unwrap();
        let f2 = reader.read_frame().unwrap().unwrap();
        let f3 = reader.read_frame().unwrap().unwrap();

        assert_eq!((f1.tag, f1.payload.len()), (b'q', 20));
        assert_eq!((f2.tag, f2.payload.len()), (b'e', 16));
        assert_eq!((f3.tag, f3.payload.len()), (b'h', 8));
    }

    #[test]
    fn noise_before_frame_is_discarded() {
        let noise = [0x00, 0x55, 0xAA, END_MARKER, 0x7F];
        let mut wire = BytesMut::new();
        wire.put_slice(&noise);
        encode_frame(b'h', &heading_payload(), &mut wire).unwrap();

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));
        let frame = reader.read_frame().unwrap().unwrap();

        assert_eq!(frame.tag, b'h');
        assert_eq!(frame.payload.as_ref(), heading_payload());
        assert_eq!(reader.stats().resync_bytes, noise.len() as u64);
    }

    #[test]
    fn bad_footer_yields_nothing_then_next_frame() {
        let mut wire = BytesMut::new();
        encode_frame(b'a', &[0xEE; 16], &mut wire).unwrap();
        let last = wire.len() - 1;
        wire[last] = 0x00;
        encode_frame(b'h', &heading_payload(), &mut wire).unwrap();

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));

        assert!(reader.read_frame().unwrap().is_none());
        let frame = reader.read_frame().unwrap().unwrap();
        assert_eq!(frame.tag, b'h');

        let stats = reader.stats();
        assert_eq!(stats.invalid_frames, 1);
        assert_eq!(stats.frames, 1);
    }

    #[test]
    fn malformed_size_yields_nothing_then_resyncs() {
        let mut wire = BytesMut::new();
        wire.put_slice(&[START_MARKER, 0x03, 0x99]);
        encode_frame(b'h', &heading_payload(), &mut wire).unwrap();

        let mut reader = FrameReader::new(Cursor::new(wire.to_vec()));

        assert!(reader.read_frame().unwrap().is_none());
        let frame = reader.read_frame().unwrap().unwrap();
        assert_eq!(frame.tag, b'h');
        assert_eq!(reader.stats().resync_bytes, 1);
    }

    #[test]
    fn partial_read_handling() {
        let mut wire = BytesMut::new();
        encode_frame(b'g', &[7u8; 16], &mut wire).unwrap();

        let byte_reader = ByteByByteReader {
            bytes: wire.to_vec(),
            pos: 0,
        };
        let mut reader = FrameReader::new(byte_reader);

        let frame = reader.read_frame().unwrap().unwrap();
        assert_eq!(frame.tag, b'g');
        assert_eq!(frame.payload.as_ref(), [7u8; 16]);
    }

    #[test]
    fn one_byte_reads_reuse_the_chunk_buffer() {
        let mut wire = BytesMut::new();
        for _ in 0..3 {
            encode_frame(b'h', &heading_payload(), &mut wire).unwrap();
        }

        let mut reader = FrameReader::new(ByteByByteReader {
            bytes: wire.to_vec(),
            pos: 0,
        });
        let chunk_ptr = reader.chunk.as_ptr();

        for _ in 0..3 {
            let frame = reader.read_frame().unwrap().unwrap();
            assert_eq!(frame.payload.as_ref(), heading_payload());
        }
        assert_eq!(reader.chunk.as_ptr(), chunk_ptr);
        assert_eq!(reader.chunk.len(), FrameConfig::default().read_chunk_size);
        assert_eq!(reader.stats().frames, 3);
    }

    #[test]
    fn connection_closed_cleanly() {
        let mut reader = FrameReader::new(Cursor::new(Vec::<u8>::new()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_mid_frame() {
        let mut partial = BytesMut::new();
        partial.put_slice(&[START_MARKER, 24, b'q']);
        partial.put_slice(&[0u8; 5]);

        let mut reader = FrameReader::new(Cursor::new(partial.to_vec()));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn connection_closed_during_noise() {
        let mut reader = FrameReader::new(Cursor::new(vec![0x22, 0x33]));
        let err = reader.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
        assert_eq!(reader.stats().resync_bytes, 2);
    }

    #[derive(Debug)]
    struct ByteByByteReader {
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for ByteByByteReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            if buf.is_empty() {
                return Ok(0);
            }

            buf[0] = self.bytes[self.pos];
            self.pos += 1;
            Ok(1)
        }
    }

    #[test]
    fn accessors_and_into_inner() {
        let cursor = Cursor::new(Vec::<u8>::new());
        let mut reader = FrameReader::new(cursor);

        assert_eq!(reader.buffered(), 0);
        assert_eq!(reader.config(), &FrameConfig::default());
        let _ = reader.get_ref();
        let _ = reader.get_mut();
        let _inner = reader.into_inner();
    }

    #[test]
    fn read_would_block_propagates_io_error() {
        let mut wire = BytesMut::new();
        encode_frame(b'h', &heading_payload(), &mut wire).unwrap();

        let reader = FailOnceThenData {
            kind: ErrorKind::WouldBlock,
            failed: false,
            bytes: wire.to_vec(),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let err = framed.read_frame().unwrap_err();
        assert!(matches!(err, FrameError::Io(e) if e.kind() == ErrorKind::WouldBlock));
    }

    #[test]
    fn interrupted_read_retries() {
        let mut wire = BytesMut::new();
        encode_frame(b'h', &heading_payload(), &mut wire).unwrap();

        let reader = FailOnceThenData {
            kind: ErrorKind::Interrupted,
            failed: false,
            bytes: wire.to_vec(),
            pos: 0,
        };
        let mut framed = FrameReader::new(reader);
        let frame = framed.read_frame().unwrap().unwrap();

        assert_eq!(frame.tag, b'h');
    }

    struct FailOnceThenData {
        kind: ErrorKind,
        failed: bool,
        bytes: Vec<u8>,
        pos: usize,
    }

    impl Read for FailOnceThenData {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if !self.failed {
                self.failed = true;
                return Err(std::io::Error::from(self.kind));
            }
            if self.pos >= self.bytes.len() {
                return Ok(0);
            }
            let remaining = self.bytes.len() - self.pos;
            let n = remaining.min(buf.len());
            buf[..n].copy_from_slice(&self.bytes[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }
}
