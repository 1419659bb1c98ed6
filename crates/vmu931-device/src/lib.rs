//! Device state tracking and stream reconciliation for the VMU931.
//!
//! This is the "just works" layer. Open a device, parse messages one at a
//! time, and ask for a stream configuration: the device is only sent the
//! toggles needed to get from the last observed status to the one requested.

pub mod config;
pub mod connector;
pub mod device;
pub mod error;
pub mod tracker;

pub use config::{DeviceConfig, DEFAULT_SETTLE_DELAY, DEFAULT_STATUS_FRAME_BUDGET};
pub use connector::{open, open_with_config, SerialDevice};
pub use device::Device;
pub use error::{DeviceError, Result};
pub use tracker::{StateTracker, StreamConfig};
