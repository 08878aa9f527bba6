//! Schema definition and the fixed-width row codec.
//!
//! A schema is the ordered, named, typed column list that defines a table's
//! record shape. Because every supported type has a fixed width, the schema
//! also fixes the serialized row width, which heap pages rely on for their
//! slot layout.

use kestrel_common::{FieldType, KestrelError, Result, CHAR_WIDTH};
use serde::{Deserialize, Serialize};

use crate::tuple::{Tuple, Value};

/// A named, typed column in a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Column name, unique within its schema.
    pub name: String,
    /// Column type.
    pub field_type: FieldType,
}

impl Field {
    /// Creates a new field.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
        }
    }
}

/// Ordered column list defining a table's record shape.
///
/// Immutable after construction; one schema is shared by every page and
/// tuple of its table. Per-field byte offsets are precomputed so field
/// access is O(1).
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
    offsets: Vec<usize>,
    row_len: usize,
}

impl Schema {
    /// Creates a schema from a list of fields.
    ///
    /// Fails with `DuplicateField` if two fields share a name.
    pub fn new(fields: Vec<Field>) -> Result<Self> {
        for i in 0..fields.len() {
            for j in i + 1..fields.len() {
                if fields[i].name == fields[j].name {
                    return Err(KestrelError::DuplicateField(fields[i].name.clone()));
                }
            }
        }

        let mut offsets = Vec::with_capacity(fields.len());
        let mut offset = 0;
        for field in &fields {
            offsets.push(offset);
            offset += field.field_type.fixed_size();
        }

        Ok(Self {
            fields,
            offsets,
            row_len: offset,
        })
    }

    /// Creates a schema from parallel type and name lists.
    ///
    /// Fails with `FieldCountMismatch` when the lists differ in length,
    /// then validates names like [`Schema::new`].
    pub fn from_columns(types: Vec<FieldType>, names: Vec<String>) -> Result<Self> {
        if types.len() != names.len() {
            return Err(KestrelError::FieldCountMismatch {
                types: types.len(),
                names: names.len(),
            });
        }
        let fields = names
            .into_iter()
            .zip(types)
            .map(|(name, field_type)| Field { name, field_type })
            .collect();
        Self::new(fields)
    }

    /// Concatenates two schemas, `a`'s fields followed by `b`'s.
    ///
    /// Fails with `DuplicateField` if any name appears in both.
    pub fn merge(a: &Schema, b: &Schema) -> Result<Schema> {
        let fields = a.fields.iter().chain(b.fields.iter()).cloned().collect();
        Self::new(fields)
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the schema has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns all fields in column order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Returns the field at `index`.
    pub fn field(&self, index: usize) -> Option<&Field> {
        self.fields.get(index)
    }

    /// Returns the position of the named field.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f.name == name)
            .ok_or_else(|| KestrelError::FieldNotFound(name.to_string()))
    }

    /// Returns the byte offset of the field at `index` within a serialized
    /// row.
    ///
    /// Fails with `FieldIndexOutOfRange` when `index >= len()`, including
    /// index 0 of an empty schema.
    pub fn offset_of(&self, index: usize) -> Result<usize> {
        self.offsets
            .get(index)
            .copied()
            .ok_or(KestrelError::FieldIndexOutOfRange {
                index,
                len: self.fields.len(),
            })
    }

    /// Serialized width of one row in bytes.
    pub fn row_len(&self) -> usize {
        self.row_len
    }

    /// Returns true if `tuple` matches this schema positionally: same field
    /// count, and each value's type tag equals the declared type.
    pub fn is_compatible(&self, tuple: &Tuple) -> bool {
        tuple.len() == self.fields.len()
            && tuple
                .values()
                .iter()
                .zip(&self.fields)
                .all(|(value, field)| value.field_type() == field.field_type)
    }

    /// Like [`Schema::is_compatible`], but reports what diverged.
    pub fn check_compatible(&self, tuple: &Tuple) -> Result<()> {
        if tuple.len() != self.fields.len() {
            return Err(KestrelError::TypeMismatch {
                expected: format!("{} fields", self.fields.len()),
                actual: format!("{} fields", tuple.len()),
            });
        }
        for (value, field) in tuple.values().iter().zip(&self.fields) {
            if value.field_type() != field.field_type {
                return Err(KestrelError::TypeMismatch {
                    expected: field.field_type.to_string(),
                    actual: value.field_type().to_string(),
                });
            }
        }
        Ok(())
    }

    /// Serializes `tuple` into `buf` starting at offset 0.
    ///
    /// Fields are written contiguously in schema order, little-endian.
    /// `buf` must be at least `row_len()` bytes. `Char` values longer than
    /// [`CHAR_WIDTH`] bytes are rejected with `StringTooLong`; shorter
    /// values are zero-padded to the width.
    pub fn serialize(&self, buf: &mut [u8], tuple: &Tuple) -> Result<()> {
        self.check_compatible(tuple)?;

        let mut offset = 0;
        for value in tuple.values() {
            match value {
                Value::Int(v) => {
                    buf[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
                    offset += 4;
                }
                Value::Double(v) => {
                    buf[offset..offset + 8].copy_from_slice(&v.to_le_bytes());
                    offset += 8;
                }
                Value::Char(s) => {
                    let bytes = s.as_bytes();
                    if bytes.len() > CHAR_WIDTH {
                        return Err(KestrelError::StringTooLong {
                            len: bytes.len(),
                            max: CHAR_WIDTH,
                        });
                    }
                    buf[offset..offset + bytes.len()].copy_from_slice(bytes);
                    buf[offset + bytes.len()..offset + CHAR_WIDTH].fill(0);
                    offset += CHAR_WIDTH;
                }
            }
        }
        Ok(())
    }

    /// Reads one row back from `buf`, the inverse of [`Schema::serialize`].
    ///
    /// `Char` content is the bytes up to the trailing zero padding,
    /// validated as UTF-8.
    pub fn deserialize(&self, buf: &[u8]) -> Result<Tuple> {
        let mut values = Vec::with_capacity(self.fields.len());

        let mut offset = 0;
        for field in &self.fields {
            match field.field_type {
                FieldType::Int => {
                    let v = i32::from_le_bytes([
                        buf[offset],
                        buf[offset + 1],
                        buf[offset + 2],
                        buf[offset + 3],
                    ]);
                    values.push(Value::Int(v));
                    offset += 4;
                }
                FieldType::Double => {
                    let v = f64::from_le_bytes([
                        buf[offset],
                        buf[offset + 1],
                        buf[offset + 2],
                        buf[offset + 3],
                        buf[offset + 4],
                        buf[offset + 5],
                        buf[offset + 6],
                        buf[offset + 7],
                    ]);
                    values.push(Value::Double(v));
                    offset += 8;
                }
                FieldType::Char => {
                    let raw = &buf[offset..offset + CHAR_WIDTH];
                    let end = raw.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
                    values.push(Value::Char(String::from_utf8(raw[..end].to_vec())?));
                    offset += CHAR_WIDTH;
                }
            }
        }

        Ok(Tuple::new(values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_column_schema() -> Schema {
        Schema::new(vec![
            Field::new("id", FieldType::Int),
            Field::new("score", FieldType::Double),
        ])
        .unwrap()
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = Schema::new(vec![
            Field::new("a", FieldType::Int),
            Field::new("a", FieldType::Double),
        ]);
        assert!(matches!(result, Err(KestrelError::DuplicateField(name)) if name == "a"));
    }

    #[test]
    fn test_from_columns_count_mismatch() {
        let result = Schema::from_columns(
            vec![FieldType::Int, FieldType::Double],
            vec!["only".to_string()],
        );
        assert!(matches!(
            result,
            Err(KestrelError::FieldCountMismatch { types: 2, names: 1 })
        ));
    }

    #[test]
    fn test_from_columns_valid() {
        let schema = Schema::from_columns(
            vec![FieldType::Int, FieldType::Char],
            vec!["id".to_string(), "name".to_string()],
        )
        .unwrap();

        assert_eq!(schema.len(), 2);
        assert_eq!(schema.field(0).unwrap().name, "id");
        assert_eq!(schema.field(1).unwrap().field_type, FieldType::Char);
    }

    #[test]
    fn test_index_of() {
        let schema = two_column_schema();
        assert_eq!(schema.index_of("id").unwrap(), 0);
        assert_eq!(schema.index_of("score").unwrap(), 1);
        assert!(matches!(
            schema.index_of("missing"),
            Err(KestrelError::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_offset_of() {
        let schema = Schema::new(vec![
            Field::new("a", FieldType::Int),
            Field::new("b", FieldType::Double),
            Field::new("c", FieldType::Char),
            Field::new("d", FieldType::Int),
        ])
        .unwrap();

        assert_eq!(schema.offset_of(0).unwrap(), 0);
        assert_eq!(schema.offset_of(1).unwrap(), 4);
        assert_eq!(schema.offset_of(2).unwrap(), 12);
        assert_eq!(schema.offset_of(3).unwrap(), 12 + CHAR_WIDTH);
        assert!(matches!(
            schema.offset_of(4),
            Err(KestrelError::FieldIndexOutOfRange { index: 4, len: 4 })
        ));
    }

    #[test]
    fn test_offset_of_empty_schema() {
        // Index 0 is only valid when the schema has at least one field.
        let schema = Schema::new(Vec::new()).unwrap();
        assert!(matches!(
            schema.offset_of(0),
            Err(KestrelError::FieldIndexOutOfRange { index: 0, len: 0 })
        ));
    }

    #[test]
    fn test_row_len() {
        assert_eq!(two_column_schema().row_len(), 12);
        assert_eq!(Schema::new(Vec::new()).unwrap().row_len(), 0);

        let with_char = Schema::new(vec![Field::new("s", FieldType::Char)]).unwrap();
        assert_eq!(with_char.row_len(), CHAR_WIDTH);
    }

    #[test]
    fn test_compatibility() {
        let schema = two_column_schema();

        assert!(schema.is_compatible(&Tuple::new(vec![Value::Int(1), Value::Double(2.0)])));
        // Wrong type at position 1
        assert!(!schema.is_compatible(&Tuple::new(vec![Value::Int(1), Value::Int(2)])));
        // Wrong field count
        assert!(!schema.is_compatible(&Tuple::new(vec![Value::Int(1)])));

        let err = schema
            .check_compatible(&Tuple::new(vec![Value::Int(1), Value::Int(2)]))
            .unwrap_err();
        assert!(matches!(err, KestrelError::TypeMismatch { expected, actual }
            if expected == "DOUBLE" && actual == "INT"));
    }

    #[test]
    fn test_serialize_layout() {
        let schema = two_column_schema();
        let tuple = Tuple::new(vec![Value::Int(0x0403_0201), Value::Double(1.0)]);

        let mut buf = vec![0u8; schema.row_len()];
        schema.serialize(&mut buf, &tuple).unwrap();

        // Little-endian int in the first four bytes
        assert_eq!(&buf[0..4], &[0x01, 0x02, 0x03, 0x04]);
        // Double bit pattern in the next eight
        assert_eq!(&buf[4..12], &1.0f64.to_le_bytes());
    }

    #[test]
    fn test_serialize_deserialize_roundtrip() {
        let schema = Schema::new(vec![
            Field::new("id", FieldType::Int),
            Field::new("score", FieldType::Double),
            Field::new("name", FieldType::Char),
        ])
        .unwrap();
        let tuple = Tuple::new(vec![
            Value::Int(-42),
            Value::Double(3.25),
            Value::Char("kestrel".to_string()),
        ]);

        let mut buf = vec![0u8; schema.row_len()];
        schema.serialize(&mut buf, &tuple).unwrap();
        let recovered = schema.deserialize(&buf).unwrap();

        assert_eq!(recovered, tuple);
    }

    #[test]
    fn test_serialize_incompatible_tuple() {
        let schema = two_column_schema();
        let tuple = Tuple::new(vec![Value::Double(1.0), Value::Int(2)]);

        let mut buf = vec![0u8; schema.row_len()];
        let result = schema.serialize(&mut buf, &tuple);
        assert!(matches!(result, Err(KestrelError::TypeMismatch { .. })));
    }

    #[test]
    fn test_char_zero_padding() {
        let schema = Schema::new(vec![Field::new("s", FieldType::Char)]).unwrap();
        let tuple = Tuple::new(vec![Value::Char("ab".to_string())]);

        let mut buf = vec![0xFFu8; schema.row_len()];
        schema.serialize(&mut buf, &tuple).unwrap();

        assert_eq!(&buf[0..2], b"ab");
        // Padding is explicit zeros, not leftover buffer contents.
        assert!(buf[2..CHAR_WIDTH].iter().all(|&b| b == 0));

        let recovered = schema.deserialize(&buf).unwrap();
        assert_eq!(recovered.get(0), Some(&Value::Char("ab".to_string())));
    }

    #[test]
    fn test_char_too_long_rejected() {
        let schema = Schema::new(vec![Field::new("s", FieldType::Char)]).unwrap();
        let long = "x".repeat(CHAR_WIDTH + 1);
        let tuple = Tuple::new(vec![Value::Char(long)]);

        let mut buf = vec![0u8; schema.row_len()];
        let result = schema.serialize(&mut buf, &tuple);
        assert!(matches!(
            result,
            Err(KestrelError::StringTooLong { len, max })
                if len == CHAR_WIDTH + 1 && max == CHAR_WIDTH
        ));
    }

    #[test]
    fn test_char_exact_width_roundtrip() {
        let schema = Schema::new(vec![Field::new("s", FieldType::Char)]).unwrap();
        let exact = "y".repeat(CHAR_WIDTH);
        let tuple = Tuple::new(vec![Value::Char(exact.clone())]);

        let mut buf = vec![0u8; schema.row_len()];
        schema.serialize(&mut buf, &tuple).unwrap();
        let recovered = schema.deserialize(&buf).unwrap();

        assert_eq!(recovered.get(0), Some(&Value::Char(exact)));
    }

    #[test]
    fn test_merge() {
        let a = Schema::new(vec![Field::new("id", FieldType::Int)]).unwrap();
        let b = Schema::new(vec![Field::new("name", FieldType::Char)]).unwrap();

        let merged = Schema::merge(&a, &b).unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged.field(0).unwrap().name, "id");
        assert_eq!(merged.field(1).unwrap().name, "name");
        assert_eq!(merged.row_len(), 4 + CHAR_WIDTH);
    }

    #[test]
    fn test_merge_name_collision() {
        let a = Schema::new(vec![Field::new("id", FieldType::Int)]).unwrap();
        let b = Schema::new(vec![Field::new("id", FieldType::Char)]).unwrap();

        let result = Schema::merge(&a, &b);
        assert!(matches!(result, Err(KestrelError::DuplicateField(name)) if name == "id"));
    }

    #[test]
    fn test_field_serde_roundtrip() {
        let field = Field::new("id", FieldType::Int);
        let serialized = serde_json::to_string(&field).unwrap();
        let deserialized: Field = serde_json::from_str(&serialized).unwrap();
        assert_eq!(field, deserialized);
    }
}
