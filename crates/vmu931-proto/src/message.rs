use std::fmt;

use serde::Serialize;

use crate::status::Status;

/// Orientation quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quaternion {
    /// Device timestamp in milliseconds.
    pub timestamp: u32,
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Three-axis reading: Euler angles, acceleration, angular rate or field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Vector3 {
    /// Device timestamp in milliseconds.
    pub timestamp: u32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Compass heading in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Heading {
    /// Device timestamp in milliseconds.
    pub timestamp: u32,
    pub h: f32,
}

/// A decoded device message.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    Quaternion(Quaternion),
    Euler(Vector3),
    Accelerometer(Vector3),
    Gyroscope(Vector3),
    Magnetometer(Vector3),
    Heading(Heading),
    Status(Status),
}

impl Message {
    /// The kind of this message.
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Quaternion(_) => MessageKind::Quaternion,
            Message::Euler(_) => MessageKind::Euler,
            Message::Accelerometer(_) => MessageKind::Accelerometer,
            Message::Gyroscope(_) => MessageKind::Gyroscope,
            Message::Magnetometer(_) => MessageKind::Magnetometer,
            Message::Heading(_) => MessageKind::Heading,
            Message::Status(_) => MessageKind::Status,
        }
    }

    /// Device timestamp, for the kinds that carry one.
    pub fn timestamp(&self) -> Option<u32> {
        match self {
            Message::Quaternion(q) => Some(q.timestamp),
            Message::Euler(v)
            | Message::Accelerometer(v)
            | Message::Gyroscope(v)
            | Message::Magnetometer(v) => Some(v.timestamp),
            Message::Heading(h) => Some(h.timestamp),
            Message::Status(_) => None,
        }
    }

    /// The status snapshot, if this is a status message.
    pub fn as_status(&self) -> Option<&Status> {
        match self {
            Message::Status(status) => Some(status),
            _ => None,
        }
    }
}

/// Message types, keyed by their wire tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Quaternion,
    Euler,
    Accelerometer,
    Gyroscope,
    Magnetometer,
    Heading,
    Status,
}

impl MessageKind {
    pub const ALL: [MessageKind; 7] = [
        MessageKind::Quaternion,
        MessageKind::Euler,
        MessageKind::Accelerometer,
        MessageKind::Gyroscope,
        MessageKind::Magnetometer,
        MessageKind::Heading,
        MessageKind::Status,
    ];

    /// ASCII tag carried in the frame header.
    pub fn tag(self) -> u8 {
        match self {
            MessageKind::Quaternion => b'q',
            MessageKind::Euler => b'e',
            MessageKind::Accelerometer => b'a',
            MessageKind::Gyroscope => b'g',
            MessageKind::Magnetometer => b'c',
            MessageKind::Heading => b'h',
            MessageKind::Status => b's',
        }
    }

    /// Look up a kind by wire tag.
    pub fn from_tag(tag: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Minimum payload length the decoder consumes.
    pub fn payload_len(self) -> usize {
        match self {
            MessageKind::Quaternion => 20,
            MessageKind::Euler
            | MessageKind::Accelerometer
            | MessageKind::Gyroscope
            | MessageKind::Magnetometer => 16,
            MessageKind::Heading => 8,
            MessageKind::Status => crate::status::STATUS_PAYLOAD_LEN,
        }
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            MessageKind::Quaternion => "quaternion",
            MessageKind::Euler => "euler",
            MessageKind::Accelerometer => "accelerometer",
            MessageKind::Gyroscope => "gyroscope",
            MessageKind::Magnetometer => "magnetometer",
            MessageKind::Heading => "heading",
            MessageKind::Status => "status",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_unique_and_reversible() {
        for kind in MessageKind::ALL {
            assert_eq!(MessageKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(MessageKind::from_tag(b'z'), None);
        assert_eq!(MessageKind::from_tag(b'Q'), None);
    }

    #[test]
    fn timestamp_accessor() {
        let heading = Message::Heading(Heading {
            timestamp: 42,
            h: 90.0,
        });
        assert_eq!(heading.timestamp(), Some(42));
        assert_eq!(heading.kind(), MessageKind::Heading);
        assert!(heading.as_status().is_none());

        let status = Message::Status(Status::default());
        assert_eq!(status.timestamp(), None);
        assert!(status.as_status().is_some());
    }

    #[test]
    fn serializes_with_kind_tag() {
        let msg = Message::Euler(Vector3 {
            timestamp: 7,
            x: 1.0,
            y: 2.0,
            z: 3.0,
        });
        let json = serde_json::to_value(msg).unwrap();
        assert_eq!(json["kind"], "euler");
        assert_eq!(json["timestamp"], 7);
        assert_eq!(json["z"], 3.0);
    }
}
