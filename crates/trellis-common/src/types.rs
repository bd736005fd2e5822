//! Key types and index attributes.

use serde::{Deserialize, Serialize};

/// Sentinel for "no file position" used throughout the engine.
///
/// All valid file positions are >= 0, so -1 is a safe sentinel. This value is
/// written to disk wherever a link field is empty.
pub const NO_POSITION: i64 = -1;

/// Supported key types for B+Tree indexing.
///
/// Each key type carries its own comparison semantics, which determine how
/// keys are ordered within an index:
///
/// | Type | Order |
/// |------|-------|
/// | `Block` | unsigned byte-lexicographic, first byte to last |
/// | `NumBlock` | unsigned byte-lexicographic, last byte to first |
/// | `Integer` | native signed 16-bit, little-endian |
/// | `LongInt` | native signed 32-bit, little-endian |
/// | `Text` | C-string compare, stops at the first NUL |
/// | `Logical` | false < true |
/// | `Character` | unsigned byte |
///
/// The discriminants are the on-disk type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum KeyType {
    /// Raw byte block, compared most-significant byte first.
    Block = 1,
    /// Numeric byte block, compared least-significant byte first.
    NumBlock = 2,
    /// 16-bit signed integer.
    Integer = 3,
    /// 32-bit signed integer.
    LongInt = 4,
    /// NUL-terminated string in a fixed buffer.
    Text = 5,
    /// Boolean value, one byte, zero is false.
    Logical = 6,
    /// Single byte character.
    Character = 7,
}

impl KeyType {
    /// Decodes an on-disk type tag.
    pub fn from_tag(tag: u16) -> Option<Self> {
        match tag {
            1 => Some(KeyType::Block),
            2 => Some(KeyType::NumBlock),
            3 => Some(KeyType::Integer),
            4 => Some(KeyType::LongInt),
            5 => Some(KeyType::Text),
            6 => Some(KeyType::Logical),
            7 => Some(KeyType::Character),
            _ => None,
        }
    }

    /// Returns the on-disk type tag.
    pub fn tag(&self) -> u16 {
        *self as u16
    }

    /// Returns the mandatory key size for fixed-width types, or None when the
    /// size is declared at index initialization.
    pub fn fixed_size(&self) -> Option<u16> {
        match self {
            KeyType::Integer => Some(2),
            KeyType::LongInt => Some(4),
            KeyType::Logical | KeyType::Character => Some(1),
            KeyType::Block | KeyType::NumBlock | KeyType::Text => None,
        }
    }
}

/// Per-index attribute flags.
///
/// `UNIQUE` rejects duplicate keys at insert. `ALLOW_DELETE` enables active
/// node rebalancing: splits leave both halves roughly half-full, and
/// deletions borrow from or merge with the right sibling on underflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexAttributes(u16);

impl IndexAttributes {
    /// Keys must be unique; duplicate appends are rejected.
    pub const UNIQUE: u16 = 0x0001;
    /// Deletions rebalance nodes; splits redistribute evenly.
    pub const ALLOW_DELETE: u16 = 0x0002;

    /// No attributes set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Constructs attributes from raw on-disk bits.
    pub const fn from_bits(bits: u16) -> Self {
        Self(bits)
    }

    /// Returns the raw attribute bits.
    pub const fn bits(&self) -> u16 {
        self.0
    }

    /// Returns true if the UNIQUE flag is set.
    pub fn is_unique(&self) -> bool {
        self.0 & Self::UNIQUE != 0
    }

    /// Sets the UNIQUE flag.
    pub fn set_unique(&mut self, unique: bool) {
        if unique {
            self.0 |= Self::UNIQUE;
        } else {
            self.0 &= !Self::UNIQUE;
        }
    }

    /// Returns true if the ALLOW_DELETE flag is set.
    pub fn allows_delete(&self) -> bool {
        self.0 & Self::ALLOW_DELETE != 0
    }

    /// Sets the ALLOW_DELETE flag.
    pub fn set_allow_delete(&mut self, allow: bool) {
        if allow {
            self.0 |= Self::ALLOW_DELETE;
        } else {
            self.0 &= !Self::ALLOW_DELETE;
        }
    }

    /// Convenience constructor for a unique index with deletion support.
    pub fn unique_with_delete() -> Self {
        Self(Self::UNIQUE | Self::ALLOW_DELETE)
    }

    /// Convenience constructor for a non-unique index with deletion support.
    pub fn with_delete() -> Self {
        Self(Self::ALLOW_DELETE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_type_tags() {
        assert_eq!(KeyType::Block.tag(), 1);
        assert_eq!(KeyType::NumBlock.tag(), 2);
        assert_eq!(KeyType::Integer.tag(), 3);
        assert_eq!(KeyType::LongInt.tag(), 4);
        assert_eq!(KeyType::Text.tag(), 5);
        assert_eq!(KeyType::Logical.tag(), 6);
        assert_eq!(KeyType::Character.tag(), 7);
    }

    #[test]
    fn test_key_type_tag_roundtrip() {
        for kt in [
            KeyType::Block,
            KeyType::NumBlock,
            KeyType::Integer,
            KeyType::LongInt,
            KeyType::Text,
            KeyType::Logical,
            KeyType::Character,
        ] {
            assert_eq!(KeyType::from_tag(kt.tag()), Some(kt));
        }
        assert_eq!(KeyType::from_tag(0), None);
        assert_eq!(KeyType::from_tag(99), None);
    }

    #[test]
    fn test_key_type_fixed_size() {
        assert_eq!(KeyType::Integer.fixed_size(), Some(2));
        assert_eq!(KeyType::LongInt.fixed_size(), Some(4));
        assert_eq!(KeyType::Logical.fixed_size(), Some(1));
        assert_eq!(KeyType::Character.fixed_size(), Some(1));
        assert_eq!(KeyType::Text.fixed_size(), None);
        assert_eq!(KeyType::Block.fixed_size(), None);
        assert_eq!(KeyType::NumBlock.fixed_size(), None);
    }

    #[test]
    fn test_attributes_empty() {
        let attrs = IndexAttributes::empty();
        assert!(!attrs.is_unique());
        assert!(!attrs.allows_delete());
        assert_eq!(attrs.bits(), 0);
    }

    #[test]
    fn test_attributes_flags() {
        let mut attrs = IndexAttributes::empty();

        attrs.set_unique(true);
        assert!(attrs.is_unique());
        assert!(!attrs.allows_delete());

        attrs.set_allow_delete(true);
        assert!(attrs.is_unique());
        assert!(attrs.allows_delete());

        attrs.set_unique(false);
        assert!(!attrs.is_unique());
        assert!(attrs.allows_delete());
    }

    #[test]
    fn test_attributes_bits_roundtrip() {
        let attrs = IndexAttributes::unique_with_delete();
        let restored = IndexAttributes::from_bits(attrs.bits());
        assert_eq!(attrs, restored);
        assert_eq!(restored.bits(), 0x0003);
    }

    #[test]
    fn test_key_type_serde_roundtrip() {
        for kt in [KeyType::Text, KeyType::LongInt, KeyType::Block] {
            let serialized = serde_json::to_string(&kt).unwrap();
            let deserialized: KeyType = serde_json::from_str(&serialized).unwrap();
            assert_eq!(kt, deserialized);
        }
    }
}
