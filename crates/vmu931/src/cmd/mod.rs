use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};
use vmu931_device::{open_with_config, DeviceConfig, SerialDevice};
use vmu931_proto::{MessageKind, Stream, Streams};
use vmu931_transport::SerialConfig;

use crate::exit::{device_error, CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod configure;
pub mod ports;
pub mod send;
pub mod status;
pub mod stream;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print messages as they arrive.
    Stream(StreamArgs),
    /// Request and print the device status.
    Status(StatusArgs),
    /// Set exactly which streams are on, and optionally the resolutions.
    Configure(ConfigureArgs),
    /// Send a single command.
    Send(SendArgs),
    /// List serial ports.
    Ports(PortsArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Stream(args) => stream::run(args, format),
        Command::Status(args) => status::run(args, format),
        Command::Configure(args) => configure::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Ports(args) => ports::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Stream names accepted on the command line.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StreamName {
    Heading,
    Euler,
    Magnetometer,
    Quaternions,
    Gyroscope,
    Accelerometer,
}

impl From<StreamName> for Stream {
    fn from(name: StreamName) -> Self {
        match name {
            StreamName::Heading => Stream::Heading,
            StreamName::Euler => Stream::Euler,
            StreamName::Magnetometer => Stream::Magnetometer,
            StreamName::Quaternions => Stream::Quaternions,
            StreamName::Gyroscope => Stream::Gyroscope,
            StreamName::Accelerometer => Stream::Accelerometer,
        }
    }
}

/// Message kinds accepted by `stream --kinds`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindName {
    Quaternion,
    Euler,
    Accelerometer,
    Gyroscope,
    Magnetometer,
    Heading,
    Status,
}

impl From<KindName> for MessageKind {
    fn from(name: KindName) -> Self {
        match name {
            KindName::Quaternion => MessageKind::Quaternion,
            KindName::Euler => MessageKind::Euler,
            KindName::Accelerometer => MessageKind::Accelerometer,
            KindName::Gyroscope => MessageKind::Gyroscope,
            KindName::Magnetometer => MessageKind::Magnetometer,
            KindName::Heading => MessageKind::Heading,
            KindName::Status => MessageKind::Status,
        }
    }
}

/// Named commands accepted by `send`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CommandName {
    ToggleHeading,
    ToggleEuler,
    ToggleMagnetometer,
    ToggleQuaternions,
    ToggleGyroscope,
    ToggleAccelerometer,
    RequestStatus,
}

impl From<CommandName> for vmu931_proto::Command {
    fn from(name: CommandName) -> Self {
        use vmu931_proto::Command as Cmd;
        match name {
            CommandName::ToggleHeading => Cmd::Toggle(Stream::Heading),
            CommandName::ToggleEuler => Cmd::Toggle(Stream::Euler),
            CommandName::ToggleMagnetometer => Cmd::Toggle(Stream::Magnetometer),
            CommandName::ToggleQuaternions => Cmd::Toggle(Stream::Quaternions),
            CommandName::ToggleGyroscope => Cmd::Toggle(Stream::Gyroscope),
            CommandName::ToggleAccelerometer => Cmd::Toggle(Stream::Accelerometer),
            CommandName::RequestStatus => Cmd::RequestStatus,
        }
    }
}

pub fn streams_from(names: &[StreamName]) -> Streams {
    let streams: Vec<Stream> = names.iter().copied().map(Stream::from).collect();
    Streams::only(&streams)
}

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Serial port the device is attached to.
    #[arg(env = "VMU931_PORT")]
    pub port: String,
    /// Only print these message kinds (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub kinds: Option<Vec<KindName>>,
    /// Reconcile the device to exactly these streams before printing.
    #[arg(long, value_delimiter = ',')]
    pub enable: Option<Vec<StreamName>>,
    /// Exit after printing N messages.
    #[arg(long)]
    pub count: Option<usize>,
    /// Fail if no message arrives for this long (e.g. 5s, 500ms).
    #[arg(long)]
    pub timeout: Option<String>,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Serial port the device is attached to.
    #[arg(env = "VMU931_PORT")]
    pub port: String,
    /// Read timeout while waiting for the status (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct ConfigureArgs {
    /// Serial port the device is attached to.
    #[arg(env = "VMU931_PORT")]
    pub port: String,
    /// Streams to leave on (comma-separated); all others are turned off.
    #[arg(long, value_delimiter = ',')]
    pub streams: Vec<StreamName>,
    /// Gyroscope resolution in degrees per second (250, 500, 1000, 2000).
    #[arg(long, value_name = "DPS")]
    pub gyro_resolution: Option<u16>,
    /// Accelerometer resolution in g (2, 4, 8, 16).
    #[arg(long, value_name = "G")]
    pub accel_resolution: Option<u16>,
    /// Read timeout while waiting for status replies (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub timeout: String,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Serial port the device is attached to.
    #[arg(env = "VMU931_PORT")]
    pub port: String,
    /// Command to send.
    #[arg(required_unless_present = "raw", conflicts_with = "raw")]
    pub command: Option<CommandName>,
    /// Send "var" followed by this selector character.
    #[arg(long, value_name = "CHAR")]
    pub raw: Option<char>,
    /// Read timeout while waiting for the status read back (e.g. 2s, 500ms).
    #[arg(long, default_value = "2s")]
    pub timeout: String,
}

#[derive(Args, Debug, Default)]
pub struct PortsArgs {}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Open the device with a bounded read timeout.
pub fn open_device(port: &str, read_timeout: Option<Duration>) -> CliResult<SerialDevice> {
    let config = DeviceConfig {
        serial: SerialConfig {
            read_timeout,
            ..SerialConfig::default()
        },
        ..DeviceConfig::default()
    };
    open_with_config(port, config).map_err(|err| device_error("open failed", err))
}

pub fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, millis) = if let Some(num) = input.strip_suffix("ms") {
        (num, true)
    } else if let Some(num) = input.strip_suffix('s') {
        (num, false)
    } else {
        (input, false)
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    Ok(if millis {
        Duration::from_millis(value)
    } else {
        Duration::from_secs(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_duration_seconds_and_millis() {
        assert_eq!(parse_duration("2s").unwrap(), Duration::from_secs(2));
        assert_eq!(parse_duration("150ms").unwrap(), Duration::from_millis(150));
        assert_eq!(parse_duration("3").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn parse_duration_rejects_invalid_values() {
        assert_eq!(parse_duration("0s").unwrap_err().code, USAGE);
        assert_eq!(parse_duration("soon").unwrap_err().code, USAGE);
        assert_eq!(parse_duration(" ").unwrap_err().code, USAGE);
    }

    #[test]
    fn stream_names_build_exact_set() {
        let streams = streams_from(&[StreamName::Heading, StreamName::Gyroscope]);
        assert_eq!(streams.enabled(), vec![Stream::Heading, Stream::Gyroscope]);
    }

    #[test]
    fn command_names_encode_expected_bytes() {
        let cmd = vmu931_proto::Command::from(CommandName::ToggleMagnetometer);
        assert_eq!(&cmd.encode(), b"varc");
        let cmd = vmu931_proto::Command::from(CommandName::RequestStatus);
        assert_eq!(&cmd.encode(), b"vars");
    }
}
