use crate::message::MessageKind;

/// Errors that can occur while decoding payloads or building commands.
#[derive(Debug, thiserror::Error)]
pub enum ProtoError {
    /// The frame tag does not name a known message type.
    #[error("no decoder for message tag {:?}", tag_char(.0))]
    UnknownTag(u8),

    /// The payload is shorter than the message schema.
    #[error("{kind} payload truncated ({actual} bytes, expected at least {expected})")]
    Truncated {
        kind: MessageKind,
        expected: usize,
        actual: usize,
    },

    /// A resolution outside the set the device supports.
    #[error("invalid {sensor} resolution {value} (expected one of {allowed})")]
    InvalidResolution {
        sensor: &'static str,
        value: u16,
        allowed: &'static str,
    },

    /// A raw command selector that is not a printable ASCII character.
    #[error("invalid command selector {0:?} (expected printable ASCII)")]
    InvalidSelector(char),

    /// Frame-level error while encoding.
    #[error("frame error: {0}")]
    Frame(#[from] vmu931_frame::FrameError),
}

fn tag_char(tag: &u8) -> char {
    char::from(*tag)
}

pub type Result<T> = std::result::Result<T, ProtoError>;
