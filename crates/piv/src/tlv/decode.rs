//! Data object decoder

use std::collections::BTreeMap;

use bytes::Bytes;

use super::{DataObject, MAX_DEPTH, Node, Tag, TlvError};

/// Decode a data object list into a branch keyed by tag
///
/// Every object must consume exactly its declared length and the list must
/// end exactly at the end of `data`. Repeated sibling tags keep the last value.
pub fn decode(data: &[u8]) -> Result<Node, TlvError> {
    decode_list(data, 0, 0).map(Node::Branch)
}

/// Decode a data object list keeping the top level in wire order
///
/// Nested values are decoded as with [`decode`].
pub fn parse(data: &[u8]) -> Result<Vec<DataObject>, TlvError> {
    let mut reader = Reader::new(data, 0);
    let mut objects = Vec::new();
    while let Some(raw) = reader.next_object()? {
        objects.push(DataObject {
            tag: raw.tag,
            value: raw.into_node(0)?,
        });
    }
    Ok(objects)
}

/// Walk the top level of a data object list without interpreting any value
///
/// Constructed tags are not descended into, so values that are not BER-TLV
/// themselves, such as the DER certificate behind `70`, come back untouched.
/// The walk stops after the first error.
pub fn walk(data: &[u8]) -> Walk<'_> {
    Walk {
        reader: Reader::new(data, 0),
        failed: false,
    }
}

/// Iterator returned by [`walk`]
#[derive(Debug)]
pub struct Walk<'a> {
    reader: Reader<'a>,
    failed: bool,
}

impl<'a> Iterator for Walk<'a> {
    type Item = Result<(Tag, &'a [u8]), TlvError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        match self.reader.next_object() {
            Ok(raw) => raw.map(|raw| Ok((raw.tag, raw.value))),
            Err(e) => {
                self.failed = true;
                Some(Err(e))
            }
        }
    }
}

fn decode_list(data: &[u8], base: usize, depth: usize) -> Result<BTreeMap<Tag, Node>, TlvError> {
    let mut reader = Reader::new(data, base);
    let mut children = BTreeMap::new();
    while let Some(raw) = reader.next_object()? {
        children.insert(raw.tag, raw.into_node(depth)?);
    }
    Ok(children)
}

/// An object whose value has been sliced but not yet interpreted
struct RawObject<'a> {
    tag: Tag,
    offset: usize,
    value: &'a [u8],
    value_offset: usize,
}

impl RawObject<'_> {
    fn into_node(self, depth: usize) -> Result<Node, TlvError> {
        if !self.tag.is_constructed() {
            return Ok(Node::Leaf(Bytes::copy_from_slice(self.value)));
        }
        if depth >= MAX_DEPTH {
            return Err(TlvError::TooDeep {
                offset: self.offset,
            });
        }
        decode_list(self.value, self.value_offset, depth + 1).map(Node::Branch)
    }
}

/// Cursor over a data object list
///
/// `base` is the offset of `data` within the outermost input so errors can
/// point at the right byte.
#[derive(Debug)]
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    base: usize,
}

impl<'a> Reader<'a> {
    const fn new(data: &'a [u8], base: usize) -> Self {
        Self { data, pos: 0, base }
    }

    const fn offset(&self) -> usize {
        self.base + self.pos
    }

    fn next_object(&mut self) -> Result<Option<RawObject<'a>>, TlvError> {
        if self.pos == self.data.len() {
            return Ok(None);
        }

        let offset = self.offset();
        let tag = self.read_tag()?;
        let length = self.read_length()?;

        let value_offset = self.offset();
        let available = self.data.len() - self.pos;
        if length > available {
            return Err(TlvError::ValueOverflow {
                offset: value_offset,
                length,
                available,
            });
        }

        let data = self.data;
        let value = &data[self.pos..self.pos + length];
        self.pos += length;

        Ok(Some(RawObject {
            tag,
            offset,
            value,
            value_offset,
        }))
    }

    fn read_tag(&mut self) -> Result<Tag, TlvError> {
        let offset = self.offset();
        let first = self.data[self.pos];

        if !Tag::starts_multi_byte(first) {
            self.pos += 1;
            return Ok(Tag::from_raw(u16::from(first)));
        }

        let Some(&second) = self.data.get(self.pos + 1) else {
            return Err(TlvError::TruncatedTag { offset });
        };
        if second & 0x80 != 0 {
            return Err(TlvError::TagTooLong { offset });
        }
        self.pos += 2;
        Ok(Tag::from_raw(u16::from_be_bytes([first, second])))
    }

    fn read_length(&mut self) -> Result<usize, TlvError> {
        let offset = self.offset();
        let Some(&first) = self.data.get(self.pos) else {
            return Err(TlvError::TruncatedLength { offset });
        };

        if first < 0x80 {
            self.pos += 1;
            return Ok(usize::from(first));
        }

        let count = usize::from(first & 0x7F);
        if count == 0 || count > size_of::<usize>() {
            return Err(TlvError::UnsupportedLength {
                offset,
                byte: first,
            });
        }

        let Some(bytes) = self.data.get(self.pos + 1..self.pos + 1 + count) else {
            return Err(TlvError::TruncatedLength { offset });
        };
        self.pos += 1 + count;

        Ok(bytes
            .iter()
            .fold(0usize, |length, byte| (length << 8) | usize::from(*byte)))
    }
}
