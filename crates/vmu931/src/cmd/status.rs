use crate::cmd::{open_device, parse_duration, StatusArgs};
use crate::exit::{device_error, CliResult, SUCCESS};
use crate::output::{print_status, OutputFormat};

pub fn run(args: StatusArgs, format: OutputFormat) -> CliResult<i32> {
    let timeout = parse_duration(&args.timeout)?;
    let mut device = open_device(&args.port, Some(timeout))?;

    let status = device
        .sync_status()
        .map_err(|err| device_error("status request failed", err))?;
    print_status(&status, format);

    Ok(SUCCESS)
}
