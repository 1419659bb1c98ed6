use vmu931_device::StreamConfig;
use vmu931_proto::{AccelResolution, GyroResolution};

use crate::cmd::{open_device, parse_duration, streams_from, ConfigureArgs};
use crate::exit::{device_error, proto_error, CliResult, SUCCESS};
use crate::output::{print_applied, OutputFormat};

pub fn run(args: ConfigureArgs, format: OutputFormat) -> CliResult<i32> {
    let desired = desired_config(&args)?;
    let timeout = parse_duration(&args.timeout)?;
    let mut device = open_device(&args.port, Some(timeout))?;

    let sent = device
        .apply(&desired)
        .map_err(|err| device_error("configure failed", err))?;
    print_applied(&sent, device.status().as_ref(), format);

    Ok(SUCCESS)
}

/// Validated before the port is opened, so bad input never reaches the device.
fn desired_config(args: &ConfigureArgs) -> CliResult<StreamConfig> {
    let mut desired = StreamConfig::streams(streams_from(&args.streams));
    if let Some(dps) = args.gyro_resolution {
        let resolution =
            GyroResolution::from_dps(dps).map_err(|err| proto_error("invalid argument", err))?;
        desired = desired.with_gyroscope_resolution(resolution);
    }
    if let Some(g) = args.accel_resolution {
        let resolution =
            AccelResolution::from_g(g).map_err(|err| proto_error("invalid argument", err))?;
        desired = desired.with_accelerometer_resolution(resolution);
    }
    Ok(desired)
}
