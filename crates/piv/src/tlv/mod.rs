//! BER-TLV data objects
//!
//! Card replies are lists of Tag-Length-Value data objects. Constructed tags
//! nest further objects, primitive tags carry raw bytes. [`decode`] turns a
//! reply into a [`Node`] tree keyed by [`Tag`]; when siblings repeat a tag the
//! last one wins. [`parse`] keeps the top level in wire order for replies where
//! repetition matters. [`walk`] lists the top level without decoding any
//! value, for objects whose contents are not BER-TLV even under a
//! constructed tag.
//!
//! ```
//! use pivkey::tlv::{self, Tag};
//!
//! let tree = tlv::decode(&[0x53, 0x01, 0xAB]).unwrap();
//! let data: Tag = "53".parse().unwrap();
//! assert_eq!(tree.get(data).and_then(|n| n.as_bytes()).unwrap().as_ref(), &[0xAB]);
//! ```

mod decode;
mod encode;
mod tag;

use std::collections::BTreeMap;

use bytes::Bytes;

pub use decode::{Walk, decode, parse, walk};
pub use encode::{encode, encode_object, write_object};
pub use tag::Tag;

/// Errors raised while decoding or encoding data objects
///
/// Decoding errors carry the offset, relative to the start of the decoded
/// input, at which the malformed field starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TlvError {
    /// Input ended in the middle of a tag
    #[error("Truncated tag at offset {offset}")]
    TruncatedTag {
        /// Offset of the tag
        offset: usize,
    },

    /// Tag announcing a third byte
    #[error("Tag longer than two bytes at offset {offset}")]
    TagTooLong {
        /// Offset of the tag
        offset: usize,
    },

    /// Input ended in the middle of a length field
    #[error("Truncated length at offset {offset}")]
    TruncatedLength {
        /// Offset of the length field
        offset: usize,
    },

    /// Indefinite, reserved or oversized length form
    #[error("Unsupported length form 0x{byte:02X} at offset {offset}")]
    UnsupportedLength {
        /// Offset of the length field
        offset: usize,
        /// First byte of the length field
        byte: u8,
    },

    /// Declared length runs past the end of the input
    #[error("Value of {length} bytes at offset {offset} exceeds the {available} bytes remaining")]
    ValueOverflow {
        /// Offset of the value
        offset: usize,
        /// Declared length
        length: usize,
        /// Bytes actually left
        available: usize,
    },

    /// Constructed objects nested beyond [`MAX_DEPTH`]
    #[error("Data objects nested deeper than {max} levels at offset {offset}", max = MAX_DEPTH)]
    TooDeep {
        /// Offset of the object that went too deep
        offset: usize,
    },

    /// Value that is not a one or two byte tag
    #[error("Invalid tag {0:04X}")]
    InvalidTag(u16),

    /// Tag text that is not hex for a one or two byte tag
    #[error("Invalid tag string: {0}")]
    InvalidTagString(String),

    /// Constructed tag paired with a leaf, or primitive tag with a branch
    #[error("Tag {tag} does not match the shape of its value")]
    ShapeMismatch {
        /// Offending tag
        tag: Tag,
    },
}

/// Deepest nesting of constructed objects accepted by the decoder
pub const MAX_DEPTH: usize = 32;

/// A decoded value
///
/// Primitive objects become leaves; constructed objects and the top-level list
/// become branches keyed by tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Raw value of a primitive object
    Leaf(Bytes),
    /// Children of a constructed object
    Branch(BTreeMap<Tag, Node>),
}

impl Node {
    /// Leaf holding `value`
    pub fn leaf(value: impl Into<Bytes>) -> Self {
        Self::Leaf(value.into())
    }

    /// Branch built from `(tag, node)` pairs, later pairs replacing earlier ones
    pub fn branch(children: impl IntoIterator<Item = (Tag, Self)>) -> Self {
        Self::Branch(children.into_iter().collect())
    }

    /// Child under `tag`, if this is a branch that has one
    pub fn get(&self, tag: Tag) -> Option<&Self> {
        self.as_branch()?.get(&tag)
    }

    /// Descend through `path` one tag at a time
    pub fn get_path(&self, path: &[Tag]) -> Option<&Self> {
        path.iter().try_fold(self, |node, tag| node.get(*tag))
    }

    /// Raw bytes if this is a leaf
    pub const fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Self::Leaf(bytes) => Some(bytes),
            Self::Branch(_) => None,
        }
    }

    /// Children if this is a branch
    pub const fn as_branch(&self) -> Option<&BTreeMap<Tag, Self>> {
        match self {
            Self::Branch(children) => Some(children),
            Self::Leaf(_) => None,
        }
    }

    /// Take the raw bytes out of a leaf
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            Self::Leaf(bytes) => Some(bytes),
            Self::Branch(_) => None,
        }
    }

    /// Whether this node nests further objects
    pub const fn is_constructed(&self) -> bool {
        matches!(self, Self::Branch(_))
    }
}

/// One top-level data object, as returned by [`parse`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataObject {
    /// Tag of the object
    pub tag: Tag,
    /// Decoded value
    pub value: Node,
}
