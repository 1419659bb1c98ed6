use std::io::ErrorKind;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::info;
use vmu931_device::{DeviceError, StreamConfig};
use vmu931_frame::FrameError;
use vmu931_proto::MessageKind;

use crate::cmd::{open_device, parse_duration, streams_from, StreamArgs};
use crate::exit::{device_error, transport_error, CliError, CliResult, SUCCESS, TIMEOUT};
use crate::output::{print_message, OutputFormat};

/// Read timeout while printing, so Ctrl-C is noticed on a quiet device.
const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Read timeout while reconciling streams before printing.
const SETUP_TIMEOUT: Duration = Duration::from_secs(2);

pub fn run(args: StreamArgs, format: OutputFormat) -> CliResult<i32> {
    let idle_limit = args.timeout.as_deref().map(parse_duration).transpose()?;
    let kinds: Option<Vec<MessageKind>> = args
        .kinds
        .as_ref()
        .map(|kinds| kinds.iter().copied().map(MessageKind::from).collect());

    let mut device = open_device(&args.port, Some(SETUP_TIMEOUT))?;

    if let Some(enable) = &args.enable {
        let desired = StreamConfig::streams(streams_from(enable));
        let sent = device
            .apply(&desired)
            .map_err(|err| device_error("configure failed", err))?;
        info!(sent = sent.len(), "streams reconciled");
    }

    device
        .reader_mut()
        .get_mut()
        .set_read_timeout(Some(POLL_INTERVAL))
        .map_err(|err| transport_error("set read timeout failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    let mut printed = 0usize;
    let mut last_message = Instant::now();

    while running.load(Ordering::SeqCst) {
        let message = match device.parse() {
            Ok(Some(message)) => message,
            Ok(None) => continue,
            Err(DeviceError::Frame(FrameError::Io(err))) if err.kind() == ErrorKind::TimedOut => {
                if let Some(limit) = idle_limit {
                    if last_message.elapsed() >= limit {
                        return Err(CliError::new(
                            TIMEOUT,
                            format!("no message received within {limit:?}"),
                        ));
                    }
                }
                continue;
            }
            Err(err) => return Err(device_error("read failed", err)),
        };
        last_message = Instant::now();

        if let Some(kinds) = &kinds {
            if !kinds.contains(&message.kind()) {
                continue;
            }
        }

        print_message(&message, format);
        printed = printed.saturating_add(1);

        if let Some(count) = args.count {
            if printed >= count {
                break;
            }
        }
    }

    let stats = device.stats();
    info!(
        printed,
        frames = stats.frames,
        invalid = stats.invalid_frames,
        resync_bytes = stats.resync_bytes,
        "stream finished"
    );
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
