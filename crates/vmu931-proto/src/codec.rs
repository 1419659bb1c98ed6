use bytes::{Buf, BufMut, BytesMut};
use vmu931_frame::{encode_frame, Frame};

use crate::error::{ProtoError, Result};
use crate::message::{Heading, Message, MessageKind, Quaternion, Vector3};
use crate::status::Status;

/// Decode a frame into a message.
pub fn decode(frame: &Frame) -> Result<Message> {
    decode_payload(frame.tag, frame.payload.as_ref())
}

/// Decode a payload for the given wire tag.
///
/// Each kind reads its fixed big-endian schema from the front of the payload
/// and ignores anything after it.
pub fn decode_payload(tag: u8, payload: &[u8]) -> Result<Message> {
    let kind = MessageKind::from_tag(tag).ok_or(ProtoError::UnknownTag(tag))?;

    let expected = kind.payload_len();
    if payload.len() < expected {
        return Err(ProtoError::Truncated {
            kind,
            expected,
            actual: payload.len(),
        });
    }

    let mut buf = payload;
    let message = match kind {
        MessageKind::Quaternion => Message::Quaternion(Quaternion {
            timestamp: buf.get_u32(),
            w: buf.get_f32(),
            x: buf.get_f32(),
            y: buf.get_f32(),
            z: buf.get_f32(),
        }),
        MessageKind::Euler => Message::Euler(get_vector(&mut buf)),
        MessageKind::Accelerometer => Message::Accelerometer(get_vector(&mut buf)),
        MessageKind::Gyroscope => Message::Gyroscope(get_vector(&mut buf)),
        MessageKind::Magnetometer => Message::Magnetometer(get_vector(&mut buf)),
        MessageKind::Heading => Message::Heading(Heading {
            timestamp: buf.get_u32(),
            h: buf.get_f32(),
        }),
        MessageKind::Status => Message::Status(Status::decode(payload)?),
    };
    Ok(message)
}

fn get_vector(buf: &mut &[u8]) -> Vector3 {
    Vector3 {
        timestamp: buf.get_u32(),
        x: buf.get_f32(),
        y: buf.get_f32(),
        z: buf.get_f32(),
    }
}

fn put_vector(v: &Vector3, dst: &mut BytesMut) {
    dst.put_u32(v.timestamp);
    dst.put_f32(v.x);
    dst.put_f32(v.y);
    dst.put_f32(v.z);
}

/// Encode a message payload (no framing).
pub fn encode_payload(message: &Message, dst: &mut BytesMut) {
    dst.reserve(message.kind().payload_len());
    match message {
        Message::Quaternion(q) => {
            dst.put_u32(q.timestamp);
            dst.put_f32(q.w);
            dst.put_f32(q.x);
            dst.put_f32(q.y);
            dst.put_f32(q.z);
        }
        Message::Euler(v)
        | Message::Accelerometer(v)
        | Message::Gyroscope(v)
        | Message::Magnetometer(v) => put_vector(v, dst),
        Message::Heading(h) => {
            dst.put_u32(h.timestamp);
            dst.put_f32(h.h);
        }
        Message::Status(status) => status.encode(dst),
    }
}

/// Encode a message as a complete wire frame, as the device would send it.
pub fn encode(message: &Message, dst: &mut BytesMut) -> Result<()> {
    let mut payload = BytesMut::new();
    encode_payload(message, &mut payload);
    encode_frame(message.kind().tag(), &payload, dst)?;
    Ok(())
}
