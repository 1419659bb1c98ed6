//! Frame synchronization and decoding for the VMU931 byte stream.
//!
//! Every message from the device is framed as:
//! - A start marker byte (`0x01`)
//! - A size byte counting the whole frame, markers included
//! - An ASCII message-type tag
//! - The payload (`size - 4` bytes)
//! - An end marker byte (`0x04`)
//!
//! The reader resynchronizes on the start marker after noise or a mid-stream
//! attach, and drops frames whose footer or size is wrong. The writer sends
//! commands one byte at a time at the pace the device firmware requires.

pub mod codec;
pub mod error;
pub mod reader;
pub mod writer;

pub use codec::{
    decode_frame, encode_frame, synchronize, Decoded, Frame, FrameConfig, InvalidFrame,
    DEFAULT_COMMAND_PACING, END_MARKER, FRAME_OVERHEAD, MAX_PAYLOAD, START_MARKER,
};
pub use error::{FrameError, Result};
pub use reader::{FrameReader, FrameStats};
pub use writer::CommandWriter;
