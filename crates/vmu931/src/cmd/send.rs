use vmu931_proto::Command;

use crate::cmd::{open_device, parse_duration, SendArgs};
use crate::exit::{device_error, proto_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::{print_sent, OutputFormat};

pub fn run(args: SendArgs, format: OutputFormat) -> CliResult<i32> {
    let command = resolve_command(&args)?;
    let timeout = parse_duration(&args.timeout)?;
    let mut device = open_device(&args.port, Some(timeout))?;

    // A status request is answered by the read-back itself.
    if command != Command::RequestStatus {
        device
            .send(command)
            .map_err(|err| device_error("send failed", err))?;
    }

    let status = if command.mutates_state() || command == Command::RequestStatus {
        let status = device
            .sync_status()
            .map_err(|err| device_error("status read-back failed", err))?;
        Some(status)
    } else {
        None
    };
    print_sent(command, status.as_ref(), format);

    Ok(SUCCESS)
}

fn resolve_command(args: &SendArgs) -> CliResult<Command> {
    if let Some(selector) = args.raw {
        return Command::raw(selector).map_err(|err| proto_error("invalid --raw", err));
    }
    args.command
        .map(Command::from)
        .ok_or_else(|| CliError::new(USAGE, "a command or --raw is required"))
}
