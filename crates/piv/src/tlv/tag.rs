//! BER tag identifiers

use std::str::FromStr;

use bytes::{BufMut, BytesMut};
use derive_more::Display;

use super::TlvError;

/// Low five bits of a first tag byte announcing a second byte
const MULTI_BYTE_MARKER: u8 = 0x1F;

/// Constructed bit of the first tag byte
const CONSTRUCTED: u8 = 0x20;

/// A one or two byte BER tag
///
/// The value is the big-endian tag bytes, so `7F49` is stored as `0x7F49`.
/// Construction checks that the value encodes to itself: a one byte tag may
/// not carry the multi-byte marker, a two byte tag must carry it and its
/// second byte may not announce a third.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[display("{_0:02X}")]
pub struct Tag(u16);

impl Tag {
    /// Create a tag, returning `None` when `value` is not a valid one or two byte tag
    pub const fn new(value: u16) -> Option<Self> {
        if value <= 0xFF {
            if value as u8 & MULTI_BYTE_MARKER == MULTI_BYTE_MARKER {
                return None;
            }
        } else {
            let [first, second] = value.to_be_bytes();
            if first & MULTI_BYTE_MARKER != MULTI_BYTE_MARKER || second & 0x80 != 0 {
                return None;
            }
        }
        Some(Self(value))
    }

    /// Tag from a value known to be valid
    pub(crate) const fn from_raw(value: u16) -> Self {
        Self(value)
    }

    /// Numeric value of the tag
    pub const fn value(self) -> u16 {
        self.0
    }

    /// Whether the tag takes two bytes on the wire
    pub const fn is_two_byte(self) -> bool {
        self.0 > 0xFF
    }

    /// Whether the value nests further data objects
    pub const fn is_constructed(self) -> bool {
        self.first_byte() & CONSTRUCTED != 0
    }

    /// Number of bytes the tag occupies on the wire
    pub const fn encoded_len(self) -> usize {
        if self.is_two_byte() { 2 } else { 1 }
    }

    /// Tag bytes as they appear on the wire
    pub fn to_vec(self) -> Vec<u8> {
        self.0.to_be_bytes()[2 - self.encoded_len()..].to_vec()
    }

    /// Append the wire form of the tag to `buf`
    pub(crate) fn write(self, buf: &mut BytesMut) {
        if self.is_two_byte() {
            buf.put_u16(self.0);
        } else {
            buf.put_u8(self.0 as u8);
        }
    }

    const fn first_byte(self) -> u8 {
        if self.is_two_byte() {
            (self.0 >> 8) as u8
        } else {
            self.0 as u8
        }
    }

    /// Whether `byte` starts a two byte tag
    pub(crate) const fn starts_multi_byte(byte: u8) -> bool {
        byte & MULTI_BYTE_MARKER == MULTI_BYTE_MARKER
    }
}

impl TryFrom<u16> for Tag {
    type Error = TlvError;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        Self::new(value).ok_or(TlvError::InvalidTag(value))
    }
}

impl TryFrom<&[u8]> for Tag {
    type Error = TlvError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let value = match *bytes {
            [single] => u16::from(single),
            [first, second] => u16::from_be_bytes([first, second]),
            _ => return Err(TlvError::InvalidTagString(hex::encode_upper(bytes))),
        };
        Self::try_from(value)
    }
}

impl FromStr for Tag {
    type Err = TlvError;

    /// Parse the hex form produced by `Display`, e.g. `"53"` or `"7F49"`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = hex::decode(s).map_err(|_| TlvError::InvalidTagString(s.to_string()))?;
        Self::try_from(bytes.as_slice())
    }
}
