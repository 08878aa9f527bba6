//! Field type identifiers for Kestrel tuples.

use serde::{Deserialize, Serialize};

/// On-disk width in bytes of a `Char` field.
///
/// Character values are stored as UTF-8 bytes zero-padded to this width;
/// longer values are rejected at serialization time.
pub const CHAR_WIDTH: usize = 64;

/// Identifier for the supported column types.
///
/// Every type has a fixed serialized width, which is what makes the
/// fixed-width slot layout of heap pages possible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FieldType {
    /// 32-bit signed integer.
    Int = 0,
    /// 64-bit IEEE-754 floating point.
    Double = 1,
    /// Fixed-width character string.
    Char = 2,
}

impl FieldType {
    /// Returns the serialized width of this type in bytes.
    pub const fn fixed_size(&self) -> usize {
        match self {
            FieldType::Int => 4,
            FieldType::Double => 8,
            FieldType::Char => CHAR_WIDTH,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            FieldType::Int => "INT",
            FieldType::Double => "DOUBLE",
            FieldType::Char => "CHAR",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_sizes() {
        assert_eq!(FieldType::Int.fixed_size(), 4);
        assert_eq!(FieldType::Double.fixed_size(), 8);
        assert_eq!(FieldType::Char.fixed_size(), CHAR_WIDTH);
        assert_eq!(FieldType::Char.fixed_size(), 64);
    }

    #[test]
    fn test_display() {
        assert_eq!(FieldType::Int.to_string(), "INT");
        assert_eq!(FieldType::Double.to_string(), "DOUBLE");
        assert_eq!(FieldType::Char.to_string(), "CHAR");
    }

    #[test]
    fn test_hash() {
        use std::collections::HashSet;

        let mut set = HashSet::new();
        set.insert(FieldType::Int);
        set.insert(FieldType::Double);
        set.insert(FieldType::Int); // Duplicate
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_serde_roundtrip() {
        for field_type in [FieldType::Int, FieldType::Double, FieldType::Char] {
            let serialized = serde_json::to_string(&field_type).unwrap();
            let deserialized: FieldType = serde_json::from_str(&serialized).unwrap();
            assert_eq!(field_type, deserialized);
        }
    }
}
