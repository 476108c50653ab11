//! Data object encoder
//!
//! Lengths are always written in the shortest definite form.

use bytes::{BufMut, Bytes, BytesMut};

use super::{Node, Tag, TlvError};

/// Encode a node
///
/// A branch becomes its children in tag order; a leaf is returned as is.
/// Fails when a constructed tag holds a leaf or a primitive tag a branch,
/// since the result would not decode back to the same tree.
pub fn encode(node: &Node) -> Result<Bytes, TlvError> {
    match node {
        Node::Leaf(bytes) => Ok(bytes.clone()),
        Node::Branch(children) => {
            let mut buf = BytesMut::new();
            for (tag, child) in children {
                write_node(&mut buf, *tag, child)?;
            }
            Ok(buf.freeze())
        }
    }
}

/// Encode `node` as the value of a single object tagged `tag`
pub fn encode_object(tag: Tag, node: &Node) -> Result<Bytes, TlvError> {
    let mut buf = BytesMut::new();
    write_node(&mut buf, tag, node)?;
    Ok(buf.freeze())
}

/// Append one object with an already encoded value
///
/// Used to lay out command templates whose children must keep a fixed order.
pub fn write_object(buf: &mut BytesMut, tag: Tag, value: &[u8]) {
    tag.write(buf);
    write_length(buf, value.len());
    buf.put_slice(value);
}

fn write_node(buf: &mut BytesMut, tag: Tag, node: &Node) -> Result<(), TlvError> {
    if tag.is_constructed() != node.is_constructed() {
        return Err(TlvError::ShapeMismatch { tag });
    }
    write_object(buf, tag, &encode(node)?);
    Ok(())
}

fn write_length(buf: &mut BytesMut, length: usize) {
    if length < 0x80 {
        buf.put_u8(length as u8);
        return;
    }

    let bytes = length.to_be_bytes();
    let skip = bytes.iter().take_while(|byte| **byte == 0).count();
    let significant = &bytes[skip..];
    buf.put_u8(0x80 | significant.len() as u8);
    buf.put_slice(significant);
}
