//! Feeds a recorded-style byte stream through a device, no hardware needed.
//!
//! The stream starts mid-frame, carries one corrupted frame, and ends with a
//! status report. Every message that survives is printed.
//!
//! Run with:
//!   cargo run --example simulate

use std::io::Cursor;

use bytes::BytesMut;
use vmu931::device::{Device, DeviceError};
use vmu931::frame::FrameError;
use vmu931::proto::{encode, Heading, Message, Status, Stream, Streams, Vector3};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut wire = BytesMut::new();
    wire.extend_from_slice(&[0x34, 0x00, 0x00, 0x04]);

    for ts in 0..3u32 {
        encode(
            &Message::Heading(Heading {
                timestamp: ts * 10,
                h: 90.0 + ts as f32,
            }),
            &mut wire,
        )?;
        encode(
            &Message::Accelerometer(Vector3 {
                timestamp: ts * 10,
                x: 0.01,
                y: -0.02,
                z: 1.0,
            }),
            &mut wire,
        )?;
    }

    // Heading frame with its footer overwritten.
    wire.extend_from_slice(&[0x01, 0x0C, b'h', 0, 0, 0, 40, 0x42, 0xB4, 0, 0, 0xFF]);

    encode(
        &Message::Status(Status {
            streaming: Streams::only(&[Stream::Heading, Stream::Accelerometer]),
            ..Status::default()
        }),
        &mut wire,
    )?;

    let mut device = Device::new(Cursor::new(wire.to_vec()), std::io::sink());

    loop {
        match device.parse_with(|message| println!("{message:?}")) {
            Ok(_) => {}
            Err(DeviceError::Frame(FrameError::ConnectionClosed)) => break,
            Err(err) => return Err(err.into()),
        }
    }

    let stats = device.stats();
    eprintln!(
        "frames={} invalid={} resync_bytes={}",
        stats.frames, stats.invalid_frames, stats.resync_bytes
    );
    if let Some(status) = device.status() {
        eprintln!("device reports streams: {:?}", status.streaming.enabled());
    }
    Ok(())
}
