use tracing::{debug, info};
use vmu931_proto::{AccelResolution, Command, GyroResolution, Status, Stream, Streams};

use crate::error::{DeviceError, Result};

/// Stream and resolution settings to bring the device to.
///
/// Resolutions are written whenever they are `Some`, because the device does
/// not always report them. `None` leaves the current resolution alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreamConfig {
    pub streams: Streams,
    pub gyroscope_resolution: Option<GyroResolution>,
    pub accelerometer_resolution: Option<AccelResolution>,
}

impl StreamConfig {
    /// Exactly these streams on, resolutions untouched.
    pub fn streams(streams: Streams) -> Self {
        Self {
            streams,
            ..Self::default()
        }
    }

    pub fn with_gyroscope_resolution(mut self, resolution: GyroResolution) -> Self {
        self.gyroscope_resolution = Some(resolution);
        self
    }

    pub fn with_accelerometer_resolution(mut self, resolution: AccelResolution) -> Self {
        self.accelerometer_resolution = Some(resolution);
        self
    }
}

/// Last status reported by the device.
///
/// Only status messages change the snapshot. Sending a toggle does not, since
/// the device is the authority on what it is streaming.
#[derive(Debug, Clone, Default)]
pub struct StateTracker {
    current: Option<Status>,
}

impl StateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last observed status, if any.
    pub fn current(&self) -> Option<Status> {
        self.current
    }

    /// Replace the snapshot with a freshly reported status.
    pub fn observe(&mut self, status: Status) {
        match self.current.replace(status) {
            Some(previous) if previous == status => debug!("device status unchanged"),
            Some(previous) => info!(
                from = ?previous.streaming.enabled(),
                to = ?status.streaming.enabled(),
                "device status changed"
            ),
            None => info!(streams = ?status.streaming.enabled(), "device status observed"),
        }
    }

    /// Forget the snapshot. [`reconcile`](Self::reconcile) fails with
    /// [`DeviceError::StatusUnknown`] until a new status is observed.
    pub fn clear(&mut self) {
        self.current = None;
    }

    /// Commands that move the device from the snapshot to `desired`.
    ///
    /// One toggle per stream whose state differs, in [`Stream::ALL`] order,
    /// followed by the requested resolutions.
    pub fn reconcile(&self, desired: &StreamConfig) -> Result<Vec<Command>> {
        let current = self.current.ok_or(DeviceError::StatusUnknown)?;

        let mut commands: Vec<Command> = Stream::ALL
            .into_iter()
            .filter(|&stream| current.streaming.get(stream) != desired.streams.get(stream))
            .map(Stream::toggle)
            .collect();

        if let Some(resolution) = desired.gyroscope_resolution {
            commands.push(Command::SetGyroscopeResolution(resolution));
        }
        if let Some(resolution) = desired.accelerometer_resolution {
            commands.push(Command::SetAccelerometerResolution(resolution));
        }

        debug!(count = commands.len(), "reconciled stream configuration");
        Ok(commands)
    }
}
