// SPDX-License-Identifier: Apache-2.0

//! The bit-packed field descriptor
//!
//! Descriptor byte layout: bit 7 = array, bit 6 = explicit size, low bits =
//! numeric type tag. The layout lives only here and in the accessors on
//! [`FieldType`](crate::types::FieldType).

use crate::encoding::utils::string_to_bytes;
use crate::errors::{Eip712Error, Eip712Result};
use crate::types::FieldDefinition;

/// Descriptor bit set when the field declares array dimensions
const TYPE_ARRAY_BIT: u8 = 0x80;
/// Descriptor bit set when the field carries an explicit element size
const TYPE_SIZE_BIT: u8 = 0x40;

/// Encode one field declaration into a STRUCT_FIELD definition payload
pub fn encode_field_definition<E: std::error::Error>(
    field: &FieldDefinition,
) -> Eip712Result<Vec<u8>, E> {
    let type_name = field.field_type.type_name();
    if matches!(type_name, Some("")) {
        return Err(Eip712Error::InvalidFieldDefinition(format!(
            "custom type for field '{}' has an empty type name",
            field.name
        )));
    }

    let mut data = Vec::new();

    let mut type_desc = field.field_type.type_id();
    if field.is_array() {
        type_desc |= TYPE_ARRAY_BIT;
    }
    if field.field_type.type_size().is_some() {
        type_desc |= TYPE_SIZE_BIT;
    }
    data.push(type_desc);

    // Referenced type name, only for custom types
    if let Some(type_name) = type_name {
        let name_bytes = string_to_bytes(type_name)?;
        if name_bytes.len() > 0xFF {
            return Err(Eip712Error::NameTooLong {
                what: "type name",
                len: name_bytes.len(),
            });
        }
        data.push(name_bytes.len() as u8);
        data.extend_from_slice(&name_bytes);
    }

    if let Some(type_size) = field.field_type.type_size() {
        data.push(type_size);
    }

    if field.is_array() {
        data.push(field.array_levels.len() as u8);
        for level in &field.array_levels {
            data.push(level.type_id());
            if let Some(size) = level.size() {
                data.push(size);
            }
        }
    }

    // Key name, always present
    let key_bytes = string_to_bytes(&field.name)?;
    if key_bytes.len() > 0xFF {
        return Err(Eip712Error::NameTooLong {
            what: "key name",
            len: key_bytes.len(),
        });
    }
    data.push(key_bytes.len() as u8);
    data.extend_from_slice(&key_bytes);

    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ArrayLevel, FieldType};

    type TestError = std::io::Error;

    #[test]
    fn plain_field_leaves_high_bits_clear() {
        let field = FieldDefinition::new(FieldType::String, "name");
        let encoded = encode_field_definition::<TestError>(&field).unwrap();

        assert_eq!(encoded[0] & (TYPE_ARRAY_BIT | TYPE_SIZE_BIT), 0);
        assert_eq!(encoded[0], 5); // string tag
        assert_eq!(encoded[1], 4);
        assert_eq!(&encoded[2..], b"name");
    }

    #[test]
    fn sized_uint_field_layout() {
        let field = FieldDefinition::new(FieldType::Uint(32), "amount");
        let encoded = encode_field_definition::<TestError>(&field).unwrap();

        // uint tag 2 with the size bit set
        assert_eq!(encoded[0], 0x42);
        assert_eq!(encoded[1], 0x20);
        assert_eq!(encoded[2], 0x06);
        assert_eq!(&encoded[3..9], b"amount");
        assert_eq!(encoded.len(), 9);
    }

    #[test]
    fn array_field_sets_array_bit_and_levels() {
        let field = FieldDefinition::new(FieldType::Address, "holders")
            .with_array_level(ArrayLevel::Dynamic)
            .with_array_level(ArrayLevel::Fixed(3));
        let encoded = encode_field_definition::<TestError>(&field).unwrap();

        assert_eq!(encoded[0], TYPE_ARRAY_BIT | 3);
        assert_eq!(encoded[1], 2); // level count
        assert_eq!(encoded[2], 0); // dynamic: no size byte follows
        assert_eq!(encoded[3], 1); // fixed
        assert_eq!(encoded[4], 3); // fixed size
        assert_eq!(encoded[5], 7);
        assert_eq!(&encoded[6..], b"holders");
    }

    #[test]
    fn custom_type_emits_referenced_name() {
        let field = FieldDefinition::new(FieldType::Custom("Person".to_string()), "from");
        let encoded = encode_field_definition::<TestError>(&field).unwrap();

        assert_eq!(encoded[0], 0); // custom tag, no size, no array
        assert_eq!(encoded[1], 6);
        assert_eq!(&encoded[2..8], b"Person");
        assert_eq!(encoded[8], 4);
        assert_eq!(&encoded[9..], b"from");
    }

    #[test]
    fn custom_type_with_empty_name_is_rejected() {
        let field = FieldDefinition::new(FieldType::Custom(String::new()), "from");
        assert!(matches!(
            encode_field_definition::<TestError>(&field),
            Err(Eip712Error::InvalidFieldDefinition(_))
        ));
    }
}
