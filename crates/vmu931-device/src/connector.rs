use vmu931_transport::{DeviceStream, SerialTransport};

use crate::config::DeviceConfig;
use crate::device::Device;
use crate::error::Result;

/// A device on a serial port, reading and writing through two handles.
pub type SerialDevice = Device<DeviceStream, DeviceStream>;

/// Open the device at `path` with default configuration.
pub fn open(path: &str) -> Result<SerialDevice> {
    open_with_config(path, DeviceConfig::default())
}

/// Open the device at `path` with explicit configuration.
///
/// When `config.initial_streams` is set it is applied before returning, which
/// costs at least one status round trip.
pub fn open_with_config(path: &str, config: DeviceConfig) -> Result<SerialDevice> {
    let stream = SerialTransport::open_with_config(path, &config.serial)?;
    let reader_stream = stream.try_clone()?;

    let initial = config.initial_streams;
    let mut device = Device::with_config(reader_stream, stream, config);
    if let Some(desired) = initial {
        device.apply(&desired)?;
    }
    Ok(device)
}

#[cfg(test)]
mod tests {
    use vmu931_transport::TransportError;

    use super::*;
    use crate::error::DeviceError;

    #[test]
    fn open_missing_port_is_transport_error() {
        let path = format!("/dev/vmu931-absent-{}", std::process::id());
        match open(&path) {
            Err(DeviceError::Transport(TransportError::Open { path: reported, .. })) => {
                assert_eq!(reported, path)
            }
            Err(other) => panic!("expected transport open error, got {other:?}"),
            Ok(_) => panic!("missing port should not open"),
        }
    }
}
