use std::fmt;
use std::io;

use vmu931_device::DeviceError;
use vmu931_frame::FrameError;
use vmu931_proto::ProtoError;
use vmu931_transport::TransportError;

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const TRANSPORT_ERROR: i32 = 3;
pub const PERMISSION_DENIED: i32 = 50;
pub const DATA_INVALID: i32 = 60;
pub const USAGE: i32 = 64;
pub const TIMEOUT: i32 = 124;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn io_error(context: &str, err: io::Error) -> CliError {
    let code = match err.kind() {
        io::ErrorKind::PermissionDenied => PERMISSION_DENIED,
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock => TIMEOUT,
        io::ErrorKind::NotFound | io::ErrorKind::BrokenPipe => TRANSPORT_ERROR,
        _ => INTERNAL,
    };
    CliError::new(code, format!("{context}: {err}"))
}

fn serial_error(context: &str, err: &serialport::Error) -> CliError {
    let code = match err.kind() {
        serialport::ErrorKind::Io(io::ErrorKind::PermissionDenied) => PERMISSION_DENIED,
        serialport::ErrorKind::Io(io::ErrorKind::TimedOut) => TIMEOUT,
        _ => TRANSPORT_ERROR,
    };
    CliError::new(code, format!("{context}: {err}"))
}

pub fn transport_error(context: &str, err: TransportError) -> CliError {
    match err {
        TransportError::Open { path, source } => {
            serial_error(&format!("{context} ({path})"), &source)
        }
        TransportError::Serial(source) => serial_error(context, &source),
        TransportError::Io(source) => io_error(context, source),
    }
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    match err {
        FrameError::Io(source) => io_error(context, source),
        FrameError::PayloadTooLarge { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
        FrameError::ConnectionClosed => CliError::new(FAILURE, format!("{context}: {err}")),
    }
}

pub fn proto_error(context: &str, err: ProtoError) -> CliError {
    match err {
        ProtoError::Frame(err) => frame_error(context, err),
        ProtoError::InvalidResolution { .. } | ProtoError::InvalidSelector(_) => {
            CliError::new(USAGE, format!("{context}: {err}"))
        }
        ProtoError::UnknownTag(_) | ProtoError::Truncated { .. } => {
            CliError::new(DATA_INVALID, format!("{context}: {err}"))
        }
    }
}

pub fn device_error(context: &str, err: DeviceError) -> CliError {
    match err {
        DeviceError::Transport(err) => transport_error(context, err),
        DeviceError::Frame(err) => frame_error(context, err),
        DeviceError::Proto(err) => proto_error(context, err),
        DeviceError::StatusUnavailable { .. } => CliError::new(TIMEOUT, format!("{context}: {err}")),
        DeviceError::StatusUnknown => CliError::new(INTERNAL, format!("{context}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_timeout_maps_to_timeout_code() {
        let err = device_error(
            "read failed",
            DeviceError::Frame(FrameError::Io(io::Error::from(io::ErrorKind::TimedOut))),
        );
        assert_eq!(err.code, TIMEOUT);
        assert!(err.message.starts_with("read failed: "));
    }

    #[test]
    fn unanswered_status_maps_to_timeout_code() {
        let err = device_error("status failed", DeviceError::StatusUnavailable { frames: 256 });
        assert_eq!(err.code, TIMEOUT);
    }

    #[test]
    fn bad_resolution_is_usage_error() {
        let err = proto_error(
            "invalid argument",
            vmu931_proto::GyroResolution::from_dps(300).unwrap_err(),
        );
        assert_eq!(err.code, USAGE);
    }

    #[test]
    fn closed_connection_is_failure() {
        let err = device_error("read failed", DeviceError::Frame(FrameError::ConnectionClosed));
        assert_eq!(err.code, FAILURE);
    }
}
