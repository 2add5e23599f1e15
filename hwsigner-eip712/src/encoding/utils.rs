// SPDX-License-Identifier: Apache-2.0

//! Primitive payload encoders

use crate::errors::{Eip712Error, Eip712Result};
use crate::types::BipPath;

/// Map each character of `s` to its ordinal byte value.
///
/// The protocol assumes 8-bit-clean text; any character whose ordinal does
/// not fit a single byte is rejected rather than transcoded.
pub fn string_to_bytes<E: std::error::Error>(s: &str) -> Eip712Result<Vec<u8>, E> {
    let mut data = Vec::with_capacity(s.len());
    for c in s.chars() {
        let ordinal = u32::from(c);
        if ordinal > 0xFF {
            return Err(Eip712Error::UnencodableText(format!(
                "character {c:?} (U+{ordinal:04X}) does not fit one byte"
            )));
        }
        data.push(ordinal as u8);
    }
    Ok(data)
}

/// Encode a BIP32 path: one length byte, then 4 big-endian bytes per index
pub fn encode_bip32_path(path: &BipPath) -> Vec<u8> {
    let mut encoded = Vec::with_capacity(path.encoded_len());
    encoded.push(path.indices.len() as u8);
    for &index in &path.indices {
        encoded.extend_from_slice(&index.to_be_bytes());
    }
    encoded
}

/// Validate a BIP32 path before building any signing frame
pub fn validate_bip32_path<E: std::error::Error>(path: &BipPath) -> Eip712Result<(), E> {
    if path.indices.is_empty() {
        return Err(Eip712Error::InvalidBip32Path("empty path".to_string()));
    }
    if path.indices.len() > crate::instructions::length::MAX_BIP32_PATH_DEPTH {
        return Err(Eip712Error::InvalidBip32Path(format!(
            "path too deep: {} (max {})",
            path.indices.len(),
            crate::instructions::length::MAX_BIP32_PATH_DEPTH
        )));
    }
    Ok(())
}

/// Encode a filtering entry: `len(name) || name || len(sig) || sig`
///
/// Used identically for contract-name and field-name announcements. Both
/// lengths must fit their single prefix byte.
pub fn encode_name_and_signature<E: std::error::Error>(
    name: &str,
    signature: &[u8],
) -> Eip712Result<Vec<u8>, E> {
    let name_bytes = string_to_bytes(name)?;
    if name_bytes.len() > 0xFF {
        return Err(Eip712Error::NameTooLong {
            what: "filter name",
            len: name_bytes.len(),
        });
    }
    if signature.len() > 0xFF {
        return Err(Eip712Error::NameTooLong {
            what: "filter signature",
            len: signature.len(),
        });
    }

    let mut data = Vec::with_capacity(2 + name_bytes.len() + signature.len());
    data.push(name_bytes.len() as u8);
    data.extend_from_slice(&name_bytes);
    data.push(signature.len() as u8);
    data.extend_from_slice(signature);
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestError = std::io::Error;

    #[test]
    fn encodes_single_element_path() {
        let path = BipPath::new(vec![0x8000002C]).unwrap();
        assert_eq!(encode_bip32_path(&path), vec![0x01, 0x80, 0x00, 0x00, 0x2C]);
    }

    #[test]
    fn encodes_standard_path_in_order() {
        let path = BipPath::ethereum_standard(0, 0);
        let encoded = encode_bip32_path(&path);
        assert_eq!(encoded[0], 5);
        assert_eq!(&encoded[1..5], &0x8000002Cu32.to_be_bytes());
        assert_eq!(&encoded[5..9], &0x8000003Cu32.to_be_bytes());
        assert_eq!(encoded.len(), 21);
    }

    #[test]
    fn rejects_empty_and_deep_paths() {
        let empty = BipPath { indices: vec![] };
        assert!(validate_bip32_path::<TestError>(&empty).is_err());
        let deep = BipPath { indices: vec![0; 11] };
        assert!(validate_bip32_path::<TestError>(&deep).is_err());
    }

    #[test]
    fn string_to_bytes_is_latin1_clean() {
        assert_eq!(string_to_bytes::<TestError>("Permit").unwrap(), b"Permit");
        // U+00E9 fits one byte
        assert_eq!(string_to_bytes::<TestError>("\u{e9}").unwrap(), vec![0xE9]);
        // U+20AC does not
        assert!(matches!(
            string_to_bytes::<TestError>("\u{20ac}"),
            Err(Eip712Error::UnencodableText(_))
        ));
    }

    #[test]
    fn encodes_name_and_signature_with_length_prefixes() {
        let encoded =
            encode_name_and_signature::<TestError>("Spender", &[0x30, 0x44]).unwrap();
        assert_eq!(encoded[0], 7);
        assert_eq!(&encoded[1..8], b"Spender");
        assert_eq!(encoded[8], 2);
        assert_eq!(&encoded[9..], &[0x30, 0x44]);
    }

    #[test]
    fn rejects_oversized_signature() {
        let sig = vec![0u8; 256];
        assert!(matches!(
            encode_name_and_signature::<TestError>("ok", &sig),
            Err(Eip712Error::NameTooLong { .. })
        ));
    }
}
