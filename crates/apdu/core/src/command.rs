//! APDU command definitions
//!
//! Short-form ISO/IEC 7816-4 command frames: `CLA INS P1 P2 [Lc data] [Le]`.

use bytes::{BufMut, Bytes, BytesMut};

use crate::Error;

/// Expected length type for APDU commands
pub type ExpectedLength = u8;

/// Class byte bit marking every frame of a chain except the last
pub const CLA_CHAINING: u8 = 0x10;

/// Largest data field a short APDU can carry
pub const MAX_SHORT_DATA: usize = 255;

/// Generic APDU command structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Command class byte
    pub cla: u8,
    /// Instruction byte
    pub ins: u8,
    /// Parameter 1
    pub p1: u8,
    /// Parameter 2
    pub p2: u8,
    /// Command data; `Some` of an empty buffer still emits `Lc = 00`
    pub data: Option<Bytes>,
    /// Expected length (optional)
    pub le: Option<ExpectedLength>,
}

impl Command {
    /// Create a new command with just the header bytes
    pub const fn new(cla: u8, ins: u8, p1: u8, p2: u8) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: None,
        }
    }

    /// Create a new command with expected response length (Le)
    pub const fn new_with_le(cla: u8, ins: u8, p1: u8, p2: u8, le: ExpectedLength) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: None,
            le: Some(le),
        }
    }

    /// Create a new command with data payload
    pub fn new_with_data<T: Into<Bytes>>(cla: u8, ins: u8, p1: u8, p2: u8, data: T) -> Self {
        Self {
            cla,
            ins,
            p1,
            p2,
            data: Some(data.into()),
            le: None,
        }
    }

    /// Set the data field
    pub fn with_data<T: Into<Bytes>>(mut self, data: T) -> Self {
        self.data = Some(data.into());
        self
    }

    /// Set the expected length field
    pub const fn with_le(mut self, le: ExpectedLength) -> Self {
        self.le = Some(le);
        self
    }

    /// Command class (CLA)
    pub const fn class(&self) -> u8 {
        self.cla
    }

    /// Instruction code (INS)
    pub const fn instruction(&self) -> u8 {
        self.ins
    }

    /// Whether the chaining bit is set in the class byte
    pub const fn is_chained(&self) -> bool {
        self.cla & CLA_CHAINING != 0
    }

    /// Length of the data field, zero when absent
    pub fn data_len(&self) -> usize {
        self.data.as_ref().map_or(0, Bytes::len)
    }

    /// Copy of this command's header carrying `chunk` as data
    pub(crate) fn frame(&self, chunk: Bytes, chained: bool) -> Self {
        let cla = if chained {
            self.cla | CLA_CHAINING
        } else {
            self.cla
        };
        Self {
            cla,
            ins: self.ins,
            p1: self.p1,
            p2: self.p2,
            data: Some(chunk),
            le: if chained { None } else { self.le },
        }
    }

    /// Calculate length of serialized command
    pub fn command_length(&self) -> usize {
        let data = self.data.as_ref().map_or(0, |d| 1 + d.len());
        4 + data + usize::from(self.le.is_some())
    }

    /// Convert to raw APDU bytes
    ///
    /// Fails when the data field does not fit a short APDU; oversized payloads
    /// have to go through the executor, which chains them.
    pub fn to_bytes(&self) -> Result<Bytes, Error> {
        let mut buffer = BytesMut::with_capacity(self.command_length());

        buffer.put_u8(self.cla);
        buffer.put_u8(self.ins);
        buffer.put_u8(self.p1);
        buffer.put_u8(self.p2);

        if let Some(data) = &self.data {
            let lc = u8::try_from(data.len())
                .map_err(|_| Error::InvalidCommandLength(data.len()))?;
            buffer.put_u8(lc);
            buffer.put_slice(data);
        }

        if let Some(le) = self.le {
            buffer.put_u8(le);
        }

        Ok(buffer.freeze())
    }
}
