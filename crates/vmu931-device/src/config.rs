use std::time::Duration;

use vmu931_frame::FrameConfig;
use vmu931_transport::SerialConfig;

use crate::tracker::StreamConfig;

/// Wait between a status request and the first read of its answer.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(50);

/// Frames parsed while waiting for a requested status before giving up.
pub const DEFAULT_STATUS_FRAME_BUDGET: usize = 256;

/// Configuration for a device connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Serial port settings.
    pub serial: SerialConfig,
    /// Reader and command pacing settings.
    pub frame: FrameConfig,
    /// Delay after a status request before reading. Default: 50 ms.
    pub settle_delay: Duration,
    /// Frames to parse while waiting for a status. Default: 256.
    pub status_frame_budget: usize,
    /// Stream configuration applied right after opening.
    pub initial_streams: Option<StreamConfig>,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            serial: SerialConfig::default(),
            frame: FrameConfig::default(),
            settle_delay: DEFAULT_SETTLE_DELAY,
            status_frame_budget: DEFAULT_STATUS_FRAME_BUDGET,
            initial_streams: None,
        }
    }
}
