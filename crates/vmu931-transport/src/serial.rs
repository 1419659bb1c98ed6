use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPortType, StopBits};
use tracing::{debug, info};

use crate::error::{Result, TransportError};
use crate::traits::{driver_timeout, DeviceStream};

/// Line rate used when none is configured.
///
/// The VMU931 is a USB CDC device and ignores the rate, but drivers still
/// require one.
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Configuration for opening a serial device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Line rate in bits per second. Default: 115200.
    pub baud_rate: u32,
    /// Read timeout. `None` (the default) blocks until bytes arrive.
    pub read_timeout: Option<Duration>,
    /// Discard bytes buffered by the driver before handing out the stream.
    pub clear_on_open: bool,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout: None,
            clear_on_open: true,
        }
    }
}

/// A serial port visible to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// Device path or name (e.g. `/dev/ttyACM0`, `COM3`).
    pub name: String,
    /// Bus the port is attached to.
    pub kind: PortKind,
    /// USB product string, when reported.
    pub product: Option<String>,
}

/// Bus a serial port is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortKind {
    Usb { vid: u16, pid: u16 },
    Pci,
    Bluetooth,
    Unknown,
}

/// Serial transport for the VMU931.
pub struct SerialTransport;

impl SerialTransport {
    /// Open a serial device with default configuration.
    pub fn open(path: &str) -> Result<DeviceStream> {
        Self::open_with_config(path, &SerialConfig::default())
    }

    /// Open a serial device with explicit configuration (8N1, no flow control).
    pub fn open_with_config(path: &str, config: &SerialConfig) -> Result<DeviceStream> {
        let port = serialport::new(path, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(driver_timeout(config.read_timeout))
            .open()
            .map_err(|source| TransportError::Open {
                path: path.to_string(),
                source,
            })?;

        let stream = DeviceStream::from_serial(port, config.read_timeout);
        if config.clear_on_open {
            debug!(path, "discarding stale input");
            stream.clear_input()?;
        }

        info!(path, baud = config.baud_rate, "opened serial device");
        Ok(stream)
    }

    /// Enumerate serial ports on this host.
    pub fn list_ports() -> Result<Vec<PortInfo>> {
        let ports = serialport::available_ports()?;
        Ok(ports
            .into_iter()
            .map(|port| {
                let (kind, product) = match port.port_type {
                    SerialPortType::UsbPort(usb) => (
                        PortKind::Usb {
                            vid: usb.vid,
                            pid: usb.pid,
                        },
                        usb.product,
                    ),
                    SerialPortType::PciPort => (PortKind::Pci, None),
                    SerialPortType::BluetoothPort => (PortKind::Bluetooth, None),
                    SerialPortType::Unknown => (PortKind::Unknown, None),
                };
                PortInfo {
                    name: port.port_name,
                    kind,
                    product,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_blocks_and_clears() {
        let cfg = SerialConfig::default();
        assert_eq!(cfg.baud_rate, DEFAULT_BAUD_RATE);
        assert!(cfg.read_timeout.is_none());
        assert!(cfg.clear_on_open);
    }

    #[test]
    fn open_missing_device_reports_path() {
        let path = format!("/dev/vmu931-missing-{}", std::process::id());
        let err = SerialTransport::open(&path).unwrap_err();
        match err {
            TransportError::Open { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("expected open error, got {other:?}"),
        }
    }
}
