use std::io::{ErrorKind, Read, Write};
use std::time::Duration;

use serialport::{ClearBuffer, SerialPort};

use crate::error::Result;

/// Poll interval used against the driver when reads should block forever.
pub(crate) const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A connected device stream implementing `Read + Write`.
///
/// This is the fundamental I/O type returned by transport operations.
/// Reads block until at least one byte arrives, unless a read timeout was
/// configured, in which case `ErrorKind::TimedOut` is surfaced to the caller.
pub struct DeviceStream {
    inner: DeviceStreamInner,
    read_timeout: Option<Duration>,
}

enum DeviceStreamInner {
    Serial(Box<dyn SerialPort>),
}

impl Read for DeviceStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        loop {
            let result = match &mut self.inner {
                DeviceStreamInner::Serial(port) => port.read(buf),
            };
            match result {
                Err(err) if err.kind() == ErrorKind::TimedOut && self.read_timeout.is_none() => {
                    continue
                }
                other => return other,
            }
        }
    }
}

impl Write for DeviceStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.inner {
            DeviceStreamInner::Serial(port) => port.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.inner {
            DeviceStreamInner::Serial(port) => port.flush(),
        }
    }
}

impl DeviceStream {
    /// Wrap an opened serial port.
    pub(crate) fn from_serial(port: Box<dyn SerialPort>, read_timeout: Option<Duration>) -> Self {
        Self {
            inner: DeviceStreamInner::Serial(port),
            read_timeout,
        }
    }

    /// Set the read timeout. `None` blocks until data arrives.
    pub fn set_read_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        match &mut self.inner {
            DeviceStreamInner::Serial(port) => port.set_timeout(driver_timeout(timeout))?,
        }
        self.read_timeout = timeout;
        Ok(())
    }

    /// Current read timeout.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout
    }

    /// Try to clone this stream (creates a new handle on the same device).
    pub fn try_clone(&self) -> Result<Self> {
        match &self.inner {
            DeviceStreamInner::Serial(port) => {
                let cloned = port.try_clone()?;
                Ok(Self::from_serial(cloned, self.read_timeout))
            }
        }
    }

    /// Discard bytes already buffered by the driver but not yet read.
    pub fn clear_input(&self) -> Result<()> {
        match &self.inner {
            DeviceStreamInner::Serial(port) => port.clear(ClearBuffer::Input)?,
        }
        Ok(())
    }

    /// Device name reported by the driver, if any.
    pub fn name(&self) -> Option<String> {
        match &self.inner {
            DeviceStreamInner::Serial(port) => port.name(),
        }
    }
}

impl std::fmt::Debug for DeviceStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.inner {
            DeviceStreamInner::Serial(port) => f
                .debug_struct("DeviceStream")
                .field("type", &"serial")
                .field("name", &port.name())
                .field("read_timeout", &self.read_timeout)
                .finish(),
        }
    }
}

/// Timeout handed to the driver for a requested stream read timeout.
pub(crate) fn driver_timeout(timeout: Option<Duration>) -> Duration {
    timeout.unwrap_or(POLL_INTERVAL)
}
