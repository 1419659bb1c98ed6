//! Serial protocol driver for the Variense VMU931 inertial measurement unit.
//!
//! The device streams framed binary messages (orientation, raw sensor
//! readings, compass heading, status) over a USB serial port and accepts
//! four-byte ASCII commands that toggle streams and set sensor resolutions.
//!
//! # Crate Structure
//!
//! - [`transport`]: serial port access
//! - [`frame`]: start/size/tag/footer framing with resynchronization, paced command writes
//! - [`proto`]: message payloads, status bit-fields and the command vocabulary
//! - [`device`]: state tracking and stream reconciliation (behind `device` feature)

/// Re-export transport types.
pub mod transport {
    pub use vmu931_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use vmu931_frame::*;
}

/// Re-export protocol types.
pub mod proto {
    pub use vmu931_proto::*;
}

/// Re-export device types (requires `device` feature).
#[cfg(feature = "device")]
pub mod device {
    pub use vmu931_device::*;
}
