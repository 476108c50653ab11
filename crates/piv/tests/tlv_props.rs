//! Property-based tests for the BER-TLV codec.

use pivkey::tlv::{self, Node, Tag, TlvError};
use proptest::prelude::*;

/// One byte tag numbers stop short of the multi-byte marker
fn one_byte(constructed: bool) -> impl Strategy<Value = Tag> {
    (0u8..=3, 0u8..0x1F).prop_map(move |(class, number)| {
        let flag = if constructed { 0x20 } else { 0x00 };
        Tag::new(u16::from(class << 6 | flag | number)).unwrap()
    })
}

/// Two byte tags keep bit 8 of the second byte clear
fn two_byte(constructed: bool) -> impl Strategy<Value = Tag> {
    (0u8..=3, 0u8..0x80).prop_map(move |(class, number)| {
        let flag = if constructed { 0x20 } else { 0x00 };
        Tag::new(u16::from_be_bytes([class << 6 | flag | 0x1F, number])).unwrap()
    })
}

fn tag(constructed: bool) -> impl Strategy<Value = Tag> {
    prop_oneof![one_byte(constructed), two_byte(constructed)]
}

/// Leaves long enough to need the long length forms
fn leaf() -> impl Strategy<Value = Node> {
    prop::collection::vec(any::<u8>(), 0..300).prop_map(Node::leaf)
}

fn branch(entry: impl Strategy<Value = (Tag, Node)>) -> impl Strategy<Value = Node> {
    prop::collection::vec(entry, 0..4).prop_map(Node::branch)
}

/// Trees whose constructed tags always hold branches and primitive tags leaves
fn tree() -> impl Strategy<Value = Node> {
    branch((tag(false), leaf())).prop_recursive(4, 48, 4, |inner| {
        branch(prop_oneof![(tag(false), leaf()), (tag(true), inner)])
    })
}

proptest! {
    /// Property: decoding an encoded tree gives the tree back.
    #[test]
    fn prop_round_trip(tree in tree()) {
        let encoded = tlv::encode(&tree).unwrap();
        prop_assert_eq!(tlv::decode(&encoded).unwrap(), tree);
    }

    /// Property: `parse` sees the same top level as `decode` when tags are unique.
    #[test]
    fn prop_parse_agrees_with_decode(tree in tree()) {
        let encoded = tlv::encode(&tree).unwrap();
        let objects = tlv::parse(&encoded).unwrap();
        let children = tree.as_branch().unwrap();

        prop_assert_eq!(objects.len(), children.len());
        for (object, (tag, node)) in objects.iter().zip(children) {
            prop_assert_eq!(object.tag, *tag);
            prop_assert_eq!(&object.value, node);
        }
    }

    /// Property: a cut anywhere inside an encoding is reported, never truncated silently.
    #[test]
    fn prop_truncation_is_an_error(value in prop::collection::vec(any::<u8>(), 1..300), cut in any::<prop::sample::Index>()) {
        let encoded = tlv::encode_object(Tag::new(0x53).unwrap(), &Node::leaf(value)).unwrap();
        let cut = cut.index(encoded.len() - 1) + 1;
        prop_assume!(cut < encoded.len());

        let err = tlv::decode(&encoded[..cut]).unwrap_err();
        let is_truncation = matches!(
            err,
            TlvError::TruncatedLength { .. } | TlvError::ValueOverflow { .. }
        );
        prop_assert!(is_truncation, "unexpected error {:?}", err);
    }

    /// Property: tags display as uppercase hex and parse back.
    #[test]
    fn prop_tag_text_round_trip(tag in prop_oneof![tag(false), tag(true)]) {
        let text = tag.to_string();
        prop_assert_eq!(text.clone(), text.to_uppercase());
        prop_assert_eq!(text.parse::<Tag>().unwrap(), tag);
        prop_assert_eq!(Tag::try_from(tag.to_vec().as_slice()).unwrap(), tag);
    }
}
