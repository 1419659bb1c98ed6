mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "vmu931", version, about = "VMU931 IMU command-line tool")]
struct Cli {
    /// Output format.
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "warn",
        env = "VMU931_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let format = cli.format.unwrap_or_else(OutputFormat::default_for_stdout);
    match cmd::run(cli.command, format) {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{CommandName, KindName, StreamName};

    #[test]
    fn parses_stream_subcommand() {
        let cli = Cli::try_parse_from([
            "vmu931",
            "stream",
            "/dev/ttyACM0",
            "--kinds",
            "heading,euler",
            "--enable",
            "heading,euler",
            "--count",
            "5",
        ])
        .expect("stream args should parse");

        match cli.command {
            Command::Stream(args) => {
                assert_eq!(args.port, "/dev/ttyACM0");
                assert_eq!(args.kinds, Some(vec![KindName::Heading, KindName::Euler]));
                assert_eq!(
                    args.enable,
                    Some(vec![StreamName::Heading, StreamName::Euler])
                );
                assert_eq!(args.count, Some(5));
            }
            other => panic!("expected stream command, got {other:?}"),
        }
    }

    #[test]
    fn parses_configure_with_resolutions() {
        let cli = Cli::try_parse_from([
            "vmu931",
            "--format",
            "json",
            "configure",
            "/dev/ttyACM0",
            "--streams",
            "quaternions",
            "--gyro-resolution",
            "500",
            "--accel-resolution",
            "8",
        ])
        .expect("configure args should parse");

        match cli.command {
            Command::Configure(args) => {
                assert_eq!(args.streams, vec![StreamName::Quaternions]);
                assert_eq!(args.gyro_resolution, Some(500));
                assert_eq!(args.accel_resolution, Some(8));
            }
            other => panic!("expected configure command, got {other:?}"),
        }
    }

    #[test]
    fn parses_named_send() {
        let cli = Cli::try_parse_from(["vmu931", "send", "/dev/ttyACM0", "toggle-heading"])
            .expect("send args should parse");
        match cli.command {
            Command::Send(args) => assert_eq!(args.command, Some(CommandName::ToggleHeading)),
            other => panic!("expected send command, got {other:?}"),
        }
    }

    #[test]
    fn rejects_named_and_raw_together() {
        let err = Cli::try_parse_from([
            "vmu931",
            "send",
            "/dev/ttyACM0",
            "request-status",
            "--raw",
            "x",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn rejects_unknown_stream_name() {
        let err = Cli::try_parse_from(["vmu931", "configure", "/dev/ttyACM0", "--streams", "compass"])
            .expect_err("unknown stream should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }
}
