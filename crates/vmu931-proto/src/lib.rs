//! Message payload codecs and command vocabulary for the VMU931.
//!
//! Frames from [`vmu931_frame`] carry an ASCII tag and a big-endian payload.
//! This crate turns them into typed [`Message`]s, decodes the packed status
//! bit-fields, and encodes the four-byte ASCII commands the device accepts.

pub mod codec;
pub mod command;
pub mod error;
pub mod message;
pub mod status;

pub use codec::{decode, decode_payload, encode, encode_payload};
pub use command::{Command, COMMAND_LEN, COMMAND_PREFIX};
pub use error::{ProtoError, Result};
pub use message::{Heading, Message, MessageKind, Quaternion, Vector3};
pub use status::{AccelResolution, GyroResolution, Status, Stream, Streams, STATUS_PAYLOAD_LEN};
