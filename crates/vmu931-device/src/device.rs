use std::io::{Read, Write};

use tracing::{debug, info, warn};
use vmu931_frame::{CommandWriter, FrameReader, FrameStats};
use vmu931_proto::{Command, Message, Status};

use crate::config::DeviceConfig;
use crate::error::{DeviceError, Result};
use crate::tracker::{StateTracker, StreamConfig};

/// A VMU931 connection: frames in, paced commands out, and the last status
/// the device reported.
///
/// `R` and `W` are usually two handles on the same serial port.
pub struct Device<R, W> {
    reader: FrameReader<R>,
    writer: CommandWriter<W>,
    tracker: StateTracker,
    config: DeviceConfig,
    unconfirmed: bool,
}

impl<R: Read, W: Write> Device<R, W> {
    /// Create a device over a byte source and command sink.
    pub fn new(source: R, sink: W) -> Self {
        Self::with_config(source, sink, DeviceConfig::default())
    }

    /// Create a device with explicit configuration.
    pub fn with_config(source: R, sink: W, config: DeviceConfig) -> Self {
        let reader = FrameReader::with_config(source, config.frame.clone());
        let writer = CommandWriter::with_config(sink, config.frame.clone());
        Self::from_parts(reader, writer, config)
    }

    /// Assemble a device from an existing reader and writer.
    pub fn from_parts(reader: FrameReader<R>, writer: CommandWriter<W>, config: DeviceConfig) -> Self {
        Self {
            reader,
            writer,
            tracker: StateTracker::new(),
            config,
            unconfirmed: false,
        }
    }

    /// Read the next frame and decode it.
    ///
    /// Returns `Ok(None)` when the frame was invalid or carried an unknown
    /// tag. Status messages update the tracked snapshot before being
    /// returned.
    pub fn parse(&mut self) -> Result<Option<Message>> {
        let Some(frame) = self.reader.read_frame()? else {
            return Ok(None);
        };

        let message = match vmu931_proto::decode(&frame) {
            Ok(message) => message,
            Err(err) => {
                warn!(error = %err, tag = %frame.tag_char(), "skipping undecodable frame");
                return Ok(None);
            }
        };

        debug!(kind = %message.kind(), "message parsed");
        if let Message::Status(status) = message {
            self.tracker.observe(status);
            self.unconfirmed = false;
        }
        Ok(Some(message))
    }

    /// Like [`parse`](Self::parse), also handing each message to `callback`.
    pub fn parse_with<F>(&mut self, mut callback: F) -> Result<Option<Message>>
    where
        F: FnMut(&Message),
    {
        let message = self.parse()?;
        if let Some(message) = &message {
            callback(message);
        }
        Ok(message)
    }

    /// Send one command, paced byte by byte.
    ///
    /// After a command that changes device state, the tracked status is
    /// treated as stale until the device reports a new one.
    pub fn send(&mut self, command: Command) -> Result<()> {
        debug!(%command, "sending command");
        if command.mutates_state() {
            self.unconfirmed = true;
        }
        self.writer.send(&command.encode())?;
        Ok(())
    }

    /// Ask the device to report its status.
    pub fn request_status(&mut self) -> Result<()> {
        self.send(Command::RequestStatus)
    }

    /// Request a status and wait for it to arrive.
    ///
    /// Other messages parsed while waiting are dropped. Gives up with
    /// [`DeviceError::StatusUnavailable`] after `status_frame_budget` frames.
    pub fn sync_status(&mut self) -> Result<Status> {
        self.request_status()?;
        if !self.config.settle_delay.is_zero() {
            std::thread::sleep(self.config.settle_delay);
        }

        let budget = self.config.status_frame_budget;
        for _ in 0..budget {
            if let Some(Message::Status(status)) = self.parse()? {
                return Ok(status);
            }
        }

        warn!(frames = budget, "status request went unanswered");
        Err(DeviceError::StatusUnavailable { frames: budget })
    }

    /// Bring the device to `desired` and return the commands that were sent.
    ///
    /// Fetches a status first when none has been observed or a state-changing
    /// command was sent since the last one, and again after sending anything
    /// so the snapshot reflects what the device did.
    pub fn apply(&mut self, desired: &StreamConfig) -> Result<Vec<Command>> {
        if self.tracker.current().is_none() || self.unconfirmed {
            self.sync_status()?;
        }

        let commands = self.tracker.reconcile(desired)?;
        for &command in &commands {
            self.send(command)?;
        }

        if !commands.is_empty() {
            let status = self.sync_status()?;
            if status.streaming != desired.streams {
                warn!(
                    wanted = ?desired.streams.enabled(),
                    reported = ?status.streaming.enabled(),
                    "device did not reach the requested streams"
                );
            }
        }
        info!(sent = commands.len(), "stream configuration applied");
        Ok(commands)
    }

    /// Last status the device reported.
    pub fn status(&self) -> Option<Status> {
        self.tracker.current()
    }

    pub fn tracker(&self) -> &StateTracker {
        &self.tracker
    }

    /// Whether a state-changing command was sent after the last status.
    pub fn is_unconfirmed(&self) -> bool {
        self.unconfirmed
    }

    /// Frame counters for this connection.
    pub fn stats(&self) -> FrameStats {
        self.reader.stats()
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn reader(&self) -> &FrameReader<R> {
        &self.reader
    }

    /// Mutable access to the reader, e.g. to adjust the source's timeout.
    pub fn reader_mut(&mut self) -> &mut FrameReader<R> {
        &mut self.reader
    }

    pub fn writer(&self) -> &CommandWriter<W> {
        &self.writer
    }
}
