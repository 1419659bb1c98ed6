use std::fmt;

use crate::error::{ProtoError, Result};
use crate::status::{AccelResolution, GyroResolution, Stream};

/// Every command starts with these three bytes.
pub const COMMAND_PREFIX: &[u8; 3] = b"var";

/// Length of every command on the wire.
pub const COMMAND_LEN: usize = 4;

const REQUEST_STATUS: u8 = b's';

/// A command understood by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Flip a stream on or off.
    Toggle(Stream),
    SetGyroscopeResolution(GyroResolution),
    SetAccelerometerResolution(AccelResolution),
    /// Ask the device to emit a status message.
    RequestStatus,
    /// Any other single-letter selector, for probing undocumented commands.
    Raw(u8),
}

impl Command {
    /// Gyroscope resolution command from degrees per second.
    pub fn gyroscope_resolution(dps: u16) -> Result<Self> {
        GyroResolution::from_dps(dps).map(Command::SetGyroscopeResolution)
    }

    /// Accelerometer resolution command from g.
    pub fn accelerometer_resolution(g: u16) -> Result<Self> {
        AccelResolution::from_g(g).map(Command::SetAccelerometerResolution)
    }

    /// Raw command from a printable ASCII selector.
    ///
    /// The status selector maps to [`Command::RequestStatus`].
    pub fn raw(selector: char) -> Result<Self> {
        if selector == char::from(REQUEST_STATUS) {
            Ok(Command::RequestStatus)
        } else if selector.is_ascii_graphic() {
            Ok(Command::Raw(selector as u8))
        } else {
            Err(ProtoError::InvalidSelector(selector))
        }
    }

    /// Fourth byte of the command.
    pub fn selector(self) -> u8 {
        match self {
            Command::Toggle(stream) => stream.selector(),
            Command::SetGyroscopeResolution(res) => res.selector(),
            Command::SetAccelerometerResolution(res) => res.selector(),
            Command::RequestStatus => REQUEST_STATUS,
            Command::Raw(selector) => selector,
        }
    }

    /// The four ASCII bytes sent to the device.
    pub fn encode(self) -> [u8; COMMAND_LEN] {
        let [a, b, c] = *COMMAND_PREFIX;
        [a, b, c, self.selector()]
    }

    /// Whether the command can change streaming or resolution state.
    ///
    /// Raw commands are assumed to, since their effect is unknown.
    pub fn mutates_state(self) -> bool {
        !matches!(self, Command::RequestStatus)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Toggle(stream) => write!(f, "toggle-{stream}"),
            Command::SetGyroscopeResolution(res) => {
                write!(f, "set-gyroscope-resolution({})", res.dps())
            }
            Command::SetAccelerometerResolution(res) => {
                write!(f, "set-accelerometer-resolution({})", res.g())
            }
            Command::RequestStatus => f.write_str("request-status"),
            Command::Raw(selector) => write!(f, "raw({})", char::from(*selector)),
        }
    }
}
