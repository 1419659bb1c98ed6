use std::io::{ErrorKind, Write};
use std::time::Duration;

use tracing::debug;

use crate::codec::FrameConfig;
use crate::error::{FrameError, Result};

/// Attempts per byte when the port reports `WouldBlock` or `TimedOut`.
const MAX_WRITE_ATTEMPTS: u32 = 8;

const RETRY_BACKOFF: Duration = Duration::from_millis(1);

fn is_transient(kind: ErrorKind) -> bool {
    matches!(kind, ErrorKind::WouldBlock | ErrorKind::TimedOut)
}

/// Writes command bytes to any `Write` sink, one byte at a time.
///
/// The device only recognises a command when its bytes arrive at least 1 ms
/// apart, so every byte is written, flushed, and followed by
/// `FrameConfig::command_pacing` of sleep.
pub struct CommandWriter<T> {
    inner: T,
    config: FrameConfig,
}

impl<T: Write> CommandWriter<T> {
    /// Create a new command writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new command writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self { inner, config }
    }

    /// Send a command (blocking for `len * command_pacing` at least).
    ///
    /// A write that keeps stalling is retried a bounded number of times. On
    /// error the device may already hold the first bytes of the command.
    pub fn send(&mut self, command: &[u8]) -> Result<()> {
        for &byte in command {
            self.write_byte(byte)?;
            self.flush()?;
            debug!("sent {byte:#04x}");
            if !self.config.command_pacing.is_zero() {
                std::thread::sleep(self.config.command_pacing);
            }
        }
        Ok(())
    }

    fn write_byte(&mut self, byte: u8) -> Result<()> {
        let mut attempts = 0;
        loop {
            match self.inner.write(&[byte]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(_) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_transient(err.kind()) && attempts + 1 < MAX_WRITE_ATTEMPTS => {
                    attempts += 1;
                    debug!(attempts, kind = ?err.kind(), "write stalled, retrying");
                    std::thread::sleep(RETRY_BACKOFF);
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self) -> Result<()> {
        let mut attempts = 0;
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if is_transient(err.kind()) && attempts + 1 < MAX_WRITE_ATTEMPTS => {
                    attempts += 1;
                    std::thread::sleep(RETRY_BACKOFF);
                }
                Err(err) => return Err(FrameError::Io(err)),
            }
        }
    }

    /// Delay applied after each byte.
    pub fn pacing(&self) -> Duration {
        self.config.command_pacing
    }

    /// Update the delay applied after each byte.
    pub fn set_pacing(&mut self, pacing: Duration) {
        self.config.command_pacing = pacing;
    }

    /// Borrow the underlying sink.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying sink.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the writer and return the inner sink.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}
