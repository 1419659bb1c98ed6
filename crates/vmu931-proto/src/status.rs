//! Device status snapshot and its packed bit-field encoding.
//!
//! Status payload layout (first seven bytes, the rest is ignored):
//!
//! ```text
//! byte 0      sensors enabled   bit2 magnetometer, bit1 gyroscope, bit0 accelerometer
//! byte 1      resolutions       bits 7..4 gyroscope 2000/1000/500/250 dps,
//!                               bits 3..0 accelerometer 16/8/4/2 g
//! byte 2      output rate       bit0 low output rate
//! bytes 3..7  streams (u32 BE)  bit6 heading, bit4 euler, bit3 magnetometer,
//!                               bit2 quaternions, bit1 gyroscope, bit0 accelerometer
//! ```
//!
//! Bit 5 of the stream word is unused by the firmware. Each resolution nibble
//! is priority encoded: the highest set bit wins, no bit means unknown.

use std::fmt;

use bytes::{Buf, BufMut, BytesMut};
use serde::Serialize;

use crate::command::Command;
use crate::error::{ProtoError, Result};
use crate::message::MessageKind;

/// Bytes of the status payload that carry data.
pub const STATUS_PAYLOAD_LEN: usize = 7;

const MAGNETOMETER_ENABLED: u8 = 1 << 2;
const GYROSCOPE_ENABLED: u8 = 1 << 1;
const ACCELEROMETER_ENABLED: u8 = 1 << 0;
const LOW_OUTPUT_RATE: u8 = 1 << 0;

/// Gyroscope full-scale range in degrees per second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u16")]
pub enum GyroResolution {
    Dps250,
    Dps500,
    Dps1000,
    Dps2000,
}

impl GyroResolution {
    /// Ascending order; decoding walks it from the top.
    pub const ALL: [GyroResolution; 4] = [
        GyroResolution::Dps250,
        GyroResolution::Dps500,
        GyroResolution::Dps1000,
        GyroResolution::Dps2000,
    ];

    /// Range in degrees per second.
    pub fn dps(self) -> u16 {
        match self {
            GyroResolution::Dps250 => 250,
            GyroResolution::Dps500 => 500,
            GyroResolution::Dps1000 => 1000,
            GyroResolution::Dps2000 => 2000,
        }
    }

    /// Parse a range in degrees per second.
    pub fn from_dps(value: u16) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.dps() == value)
            .ok_or(ProtoError::InvalidResolution {
                sensor: "gyroscope",
                value,
                allowed: "250, 500, 1000 or 2000",
            })
    }

    fn status_bit(self) -> u8 {
        match self {
            GyroResolution::Dps250 => 1 << 4,
            GyroResolution::Dps500 => 1 << 5,
            GyroResolution::Dps1000 => 1 << 6,
            GyroResolution::Dps2000 => 1 << 7,
        }
    }

    /// Command selector digit (`'0'..='3'`).
    pub fn selector(self) -> u8 {
        match self {
            GyroResolution::Dps250 => b'0',
            GyroResolution::Dps500 => b'1',
            GyroResolution::Dps1000 => b'2',
            GyroResolution::Dps2000 => b'3',
        }
    }

    fn from_status_byte(byte: u8) -> Option<Self> {
        Self::ALL
            .into_iter()
            .rev()
            .find(|r| byte & r.status_bit() != 0)
    }
}

impl From<GyroResolution> for u16 {
    fn from(value: GyroResolution) -> Self {
        value.dps()
    }
}

impl TryFrom<u16> for GyroResolution {
    type Error = ProtoError;

    fn try_from(value: u16) -> Result<Self> {
        Self::from_dps(value)
    }
}

impl fmt::Display for GyroResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dps", self.dps())
    }
}

/// Accelerometer full-scale range in g.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "u16")]
pub enum AccelResolution {
    G2,
    G4,
    G8,
    G16,
}

impl AccelResolution {
    /// Ascending order; decoding walks it from the top.
    pub const ALL: [AccelResolution; 4] = [
        AccelResolution::G2,
        AccelResolution::G4,
        AccelResolution::G8,
        AccelResolution::G16,
    ];

    /// Range in g.
    pub fn g(self) -> u16 {
        match self {
            AccelResolution::G2 => 2,
            AccelResolution::G4 => 4,
            AccelResolution::G8 => 8,
            AccelResolution::G16 => 16,
        }
    }

    /// Parse a range in g.
    pub fn from_g(value: u16) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.g() == value)
            .ok_or(ProtoError::InvalidResolution {
                sensor: "accelerometer",
                value,
                allowed: "2, 4, 8 or 16",
            })
    }

    fn status_bit(self) -> u8 {
        match self {
            AccelResolution::G2 => 1 << 0,
            AccelResolution::G4 => 1 << 1,
            AccelResolution::G8 => 1 << 2,
            AccelResolution::G16 => 1 << 3,
        }
    }

    /// Command selector digit (`'4'..='7'`).
    pub fn selector(self) -> u8 {
        match self {
            AccelResolution::G2 => b'4',
            AccelResolution::G4 => b'5',
            AccelResolution::G8 => b'6',
            AccelResolution::G16 => b'7',
        }
    }

    fn from_status_byte(byte: u8) -> Option<Self> {
        Self::ALL
            .into_iter()
            .rev()
            .find(|r| byte & r.status_bit() != 0)
    }
}

impl From<AccelResolution> for u16 {
    fn from(value: AccelResolution) -> Self {
        value.g()
    }
}

impl TryFrom<u16> for AccelResolution {
    type Error = ProtoError;

    fn try_from(value: u16) -> Result<Self> {
        Self::from_g(value)
    }
}

impl fmt::Display for AccelResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} g", self.g())
    }
}

/// A data stream the device can be toggled to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stream {
    Heading,
    Euler,
    Magnetometer,
    Quaternions,
    Gyroscope,
    Accelerometer,
}

impl Stream {
    /// Reconciliation order.
    pub const ALL: [Stream; 6] = [
        Stream::Heading,
        Stream::Euler,
        Stream::Magnetometer,
        Stream::Quaternions,
        Stream::Gyroscope,
        Stream::Accelerometer,
    ];

    fn status_bit(self) -> u32 {
        match self {
            Stream::Heading => 1 << 6,
            Stream::Euler => 1 << 4,
            Stream::Magnetometer => 1 << 3,
            Stream::Quaternions => 1 << 2,
            Stream::Gyroscope => 1 << 1,
            Stream::Accelerometer => 1 << 0,
        }
    }

    /// Letter that toggles this stream (`"var" + letter`).
    pub fn selector(self) -> u8 {
        match self {
            Stream::Heading => b'h',
            Stream::Euler => b'e',
            Stream::Magnetometer => b'c',
            Stream::Quaternions => b'q',
            Stream::Gyroscope => b'g',
            Stream::Accelerometer => b'a',
        }
    }

    /// Message kind carried by this stream.
    pub fn message_kind(self) -> MessageKind {
        match self {
            Stream::Heading => MessageKind::Heading,
            Stream::Euler => MessageKind::Euler,
            Stream::Magnetometer => MessageKind::Magnetometer,
            Stream::Quaternions => MessageKind::Quaternion,
            Stream::Gyroscope => MessageKind::Gyroscope,
            Stream::Accelerometer => MessageKind::Accelerometer,
        }
    }

    /// Command flipping this stream on or off.
    pub fn toggle(self) -> Command {
        Command::Toggle(self)
    }

    pub fn name(self) -> &'static str {
        match self {
            Stream::Heading => "heading",
            Stream::Euler => "euler",
            Stream::Magnetometer => "magnetometer",
            Stream::Quaternions => "quaternions",
            Stream::Gyroscope => "gyroscope",
            Stream::Accelerometer => "accelerometer",
        }
    }
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Which streams are on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Streams {
    pub heading: bool,
    pub euler: bool,
    pub magnetometer: bool,
    pub quaternions: bool,
    pub gyroscope: bool,
    pub accelerometer: bool,
}

impl Streams {
    /// Only the given streams on.
    pub fn only(streams: &[Stream]) -> Self {
        let mut out = Self::default();
        for &stream in streams {
            out.set(stream, true);
        }
        out
    }

    pub fn get(&self, stream: Stream) -> bool {
        match stream {
            Stream::Heading => self.heading,
            Stream::Euler => self.euler,
            Stream::Magnetometer => self.magnetometer,
            Stream::Quaternions => self.quaternions,
            Stream::Gyroscope => self.gyroscope,
            Stream::Accelerometer => self.accelerometer,
        }
    }

    pub fn set(&mut self, stream: Stream, on: bool) {
        let field = match stream {
            Stream::Heading => &mut self.heading,
            Stream::Euler => &mut self.euler,
            Stream::Magnetometer => &mut self.magnetometer,
            Stream::Quaternions => &mut self.quaternions,
            Stream::Gyroscope => &mut self.gyroscope,
            Stream::Accelerometer => &mut self.accelerometer,
        };
        *field = on;
    }

    /// Streams that are on, in reconciliation order.
    pub fn enabled(&self) -> Vec<Stream> {
        Stream::ALL
            .into_iter()
            .filter(|&stream| self.get(stream))
            .collect()
    }

    fn from_word(word: u32) -> Self {
        let mut out = Self::default();
        for stream in Stream::ALL {
            out.set(stream, word & stream.status_bit() != 0);
        }
        out
    }

    fn to_word(self) -> u32 {
        Stream::ALL
            .into_iter()
            .filter(|&stream| self.get(stream))
            .fold(0, |word, stream| word | stream.status_bit())
    }
}

/// Complete device configuration as reported by a status message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Status {
    pub magnetometer_enabled: bool,
    pub gyroscope_enabled: bool,
    pub accelerometer_enabled: bool,
    /// `None` when no resolution bit is set.
    pub gyroscope_resolution: Option<GyroResolution>,
    /// `None` when no resolution bit is set.
    pub accelerometer_resolution: Option<AccelResolution>,
    pub low_output_rate: bool,
    pub streaming: Streams,
}

impl Status {
    /// Decode a status payload. Bytes past the seventh are ignored.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        if payload.len() < STATUS_PAYLOAD_LEN {
            return Err(ProtoError::Truncated {
                kind: MessageKind::Status,
                expected: STATUS_PAYLOAD_LEN,
                actual: payload.len(),
            });
        }

        let mut buf = payload;
        let sensors = buf.get_u8();
        let resolutions = buf.get_u8();
        let output = buf.get_u8();
        let streams = buf.get_u32();

        Ok(Self {
            magnetometer_enabled: sensors & MAGNETOMETER_ENABLED != 0,
            gyroscope_enabled: sensors & GYROSCOPE_ENABLED != 0,
            accelerometer_enabled: sensors & ACCELEROMETER_ENABLED != 0,
            gyroscope_resolution: GyroResolution::from_status_byte(resolutions),
            accelerometer_resolution: AccelResolution::from_status_byte(resolutions),
            low_output_rate: output & LOW_OUTPUT_RATE != 0,
            streaming: Streams::from_word(streams),
        })
    }

    /// Encode into the seven-byte status payload.
    pub fn encode(&self, dst: &mut BytesMut) {
        let mut sensors = 0u8;
        if self.magnetometer_enabled {
            sensors |= MAGNETOMETER_ENABLED;
        }
        if self.gyroscope_enabled {
            sensors |= GYROSCOPE_ENABLED;
        }
        if self.accelerometer_enabled {
            sensors |= ACCELEROMETER_ENABLED;
        }

        let resolutions = self.gyroscope_resolution.map_or(0, GyroResolution::status_bit)
            | self
                .accelerometer_resolution
                .map_or(0, AccelResolution::status_bit);

        dst.reserve(STATUS_PAYLOAD_LEN);
        dst.put_u8(sensors);
        dst.put_u8(resolutions);
        dst.put_u8(if self.low_output_rate { LOW_OUTPUT_RATE } else { 0 });
        dst.put_u32(self.streaming.to_word());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_bytes(sensors: u8, resolutions: u8, output: u8, streams: u32) -> Vec<u8> {
        let mut payload = vec![sensors, resolutions, output];
        payload.extend_from_slice(&streams.to_be_bytes());
        payload
    }

    #[test]
    fn decodes_sensor_enable_bits() {
        let status = Status::decode(&status_bytes(0b101, 0, 0, 0)).unwrap();
        assert!(status.magnetometer_enabled);
        assert!(!status.gyroscope_enabled);
        assert!(status.accelerometer_enabled);
    }

    #[test]
    fn highest_resolution_bit_wins() {
        let status = Status::decode(&status_bytes(0, 0b1000_1000, 0, 0)).unwrap();
        assert_eq!(status.gyroscope_resolution, Some(GyroResolution::Dps2000));
        assert_eq!(status.accelerometer_resolution, Some(AccelResolution::G16));

        let status = Status::decode(&status_bytes(0, 0b0111_0111, 0, 0)).unwrap();
        assert_eq!(status.gyroscope_resolution, Some(GyroResolution::Dps1000));
        assert_eq!(status.accelerometer_resolution, Some(AccelResolution::G8));
    }

    #[test]
    fn single_resolution_bits() {
        let status = Status::decode(&status_bytes(0, 0b0001_0001, 0, 0)).unwrap();
        assert_eq!(status.gyroscope_resolution, Some(GyroResolution::Dps250));
        assert_eq!(status.accelerometer_resolution, Some(AccelResolution::G2));

        let status = Status::decode(&status_bytes(0, 0b0010_0010, 0, 0)).unwrap();
        assert_eq!(status.gyroscope_resolution, Some(GyroResolution::Dps500));
        assert_eq!(status.accelerometer_resolution, Some(AccelResolution::G4));
    }

    #[test]
    fn no_resolution_bits_is_unknown() {
        let status = Status::decode(&status_bytes(0, 0, 0, 0)).unwrap();
        assert_eq!(status.gyroscope_resolution, None);
        assert_eq!(status.accelerometer_resolution, None);
    }

    #[test]
    fn decodes_low_output_rate() {
        assert!(Status::decode(&status_bytes(0, 0, 1, 0)).unwrap().low_output_rate);
        assert!(!Status::decode(&status_bytes(0, 0, 0xFE, 0)).unwrap().low_output_rate);
    }

    #[test]
    fn decodes_stream_word() {
        let status = Status::decode(&status_bytes(0, 0, 0, 0b0101_0101)).unwrap();
        assert!(status.streaming.heading);
        assert!(status.streaming.euler);
        assert!(!status.streaming.magnetometer);
        assert!(status.streaming.quaternions);
        assert!(!status.streaming.gyroscope);
        assert!(status.streaming.accelerometer);
    }

    #[test]
    fn stream_bit_five_is_ignored() {
        let status = Status::decode(&status_bytes(0, 0, 0, 1 << 5)).unwrap();
        assert_eq!(status.streaming, Streams::default());
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let mut payload = status_bytes(0b111, 0b0100_0100, 0, 1 << 6);
        payload.extend_from_slice(&[0xFF; 5]);

        let status = Status::decode(&payload).unwrap();
        assert_eq!(status.gyroscope_resolution, Some(GyroResolution::Dps1000));
        assert_eq!(status.accelerometer_resolution, Some(AccelResolution::G8));
        assert_eq!(status.streaming.enabled(), vec![Stream::Heading]);
    }

    #[test]
    fn short_payload_is_truncated() {
        let err = Status::decode(&[0, 0, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            ProtoError::Truncated {
                kind: MessageKind::Status,
                expected: 7,
                actual: 4
            }
        ));
    }

    #[test]
    fn encode_matches_wire_layout() {
        let status = Status {
            magnetometer_enabled: true,
            gyroscope_enabled: true,
            accelerometer_enabled: false,
            gyroscope_resolution: Some(GyroResolution::Dps500),
            accelerometer_resolution: Some(AccelResolution::G4),
            low_output_rate: true,
            streaming: Streams::only(&[Stream::Heading, Stream::Gyroscope]),
        };

        let mut buf = BytesMut::new();
        status.encode(&mut buf);

        assert_eq!(buf.as_ref(), status_bytes(0b110, 0b0010_0010, 1, 0b0100_0010));
        assert_eq!(Status::decode(&buf).unwrap(), status);
    }

    #[test]
    fn resolution_lookup_rejects_unknown_values() {
        assert_eq!(GyroResolution::from_dps(1000).unwrap(), GyroResolution::Dps1000);
        assert_eq!(AccelResolution::try_from(8).unwrap(), AccelResolution::G8);
        assert!(matches!(
            GyroResolution::from_dps(300),
            Err(ProtoError::InvalidResolution {
                sensor: "gyroscope",
                value: 300,
                ..
            })
        ));
        assert!(AccelResolution::from_g(18).is_err());
    }

    #[test]
    fn streams_only_and_enabled() {
        let streams = Streams::only(&[Stream::Accelerometer, Stream::Euler]);
        assert_eq!(streams.enabled(), vec![Stream::Euler, Stream::Accelerometer]);
        assert!(!streams.get(Stream::Heading));
    }
}
