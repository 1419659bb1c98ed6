//! Serial byte transport for the Variense VMU931.
//!
//! The VMU931 enumerates as a USB CDC serial device. This crate opens it and
//! hands out a [`DeviceStream`] (blocking `Read + Write`) that the framing
//! layer reads frames from and writes paced commands to.
//!
//! This is the lowest layer of the workspace; it knows nothing about frames.

pub mod error;
pub mod serial;
pub mod traits;

pub use error::{Result, TransportError};
pub use serial::{PortInfo, PortKind, SerialConfig, SerialTransport, DEFAULT_BAUD_RATE};
pub use traits::DeviceStream;
