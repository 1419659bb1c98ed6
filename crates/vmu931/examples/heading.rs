//! Turns on the heading stream only and prints ten headings.
//!
//! Run with:
//!   cargo run --example heading -- /dev/ttyACM0

use vmu931::device::{open, StreamConfig};
use vmu931::proto::{Message, Stream, Streams};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let port = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("VMU931_PORT").ok())
        .ok_or("usage: heading <serial-port>")?;

    let mut device = open(&port)?;
    let sent = device.apply(&StreamConfig::streams(Streams::only(&[Stream::Heading])))?;
    eprintln!("sent {} command(s)", sent.len());

    let mut printed = 0;
    while printed < 10 {
        if let Some(Message::Heading(heading)) = device.parse()? {
            println!("{:>10} ms  {:7.2} deg", heading.timestamp, heading.h);
            printed += 1;
        }
    }
    Ok(())
}
