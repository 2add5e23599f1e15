// SPDX-License-Identifier: Apache-2.0

//! Core data types for the EIP-712 signing protocol

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::instructions::length;

/// BIP32 derivation path identifying the signing key
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BipPath {
    /// Derivation indices (max 10 levels); hardened offsets are already
    /// folded into the index value
    pub indices: Vec<u32>,
}

impl BipPath {
    /// Create a new BIP32 path from derivation indices
    pub fn new(indices: Vec<u32>) -> Result<Self, String> {
        if indices.len() > length::MAX_BIP32_PATH_DEPTH {
            return Err(format!(
                "BIP32 path too deep: {} (max {})",
                indices.len(),
                length::MAX_BIP32_PATH_DEPTH
            ));
        }
        Ok(BipPath { indices })
    }

    /// Standard Ethereum derivation path: m/44'/60'/account'/0/address_index
    pub fn ethereum_standard(account: u32, address_index: u32) -> Self {
        BipPath {
            indices: vec![
                0x8000002C,           // 44' (hardened)
                0x8000003C,           // 60' (hardened) - Ethereum
                0x80000000 | account, // account' (hardened)
                0,                    // 0 (external chain)
                address_index,        // address index
            ],
        }
    }

    /// Length of the path's APDU encoding
    pub fn encoded_len(&self) -> usize {
        1 + self.indices.len() * length::BIP32_INDEX_SIZE
    }
}

impl fmt::Display for BipPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m")?;
        for index in &self.indices {
            if *index >= 0x80000000 {
                write!(f, "/{}'", index - 0x80000000)?;
            } else {
                write!(f, "/{}", index)?;
            }
        }
        Ok(())
    }
}

/// Base type of one declared structure field
///
/// Sized variants carry their element width in bytes (`Uint(32)` is
/// `uint256`). The numeric tag, optional size and optional referenced type
/// name are exposed through accessors so the descriptor-byte layout stays
/// in one place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldType {
    /// Reference to another defined structure, by name
    Custom(String),
    /// Signed integer with width in bytes (1..=32)
    Int(u8),
    /// Unsigned integer with width in bytes (1..=32)
    Uint(u8),
    /// 20-byte Ethereum address
    Address,
    /// Boolean
    Bool,
    /// Dynamic-length string
    String,
    /// Fixed-length byte array with width in bytes (1..=32)
    FixedBytes(u8),
    /// Dynamic-length byte array
    DynamicBytes,
}

impl FieldType {
    /// Numeric type tag carried in the descriptor byte's low bits
    pub fn type_id(&self) -> u8 {
        match self {
            FieldType::Custom(_) => 0,
            FieldType::Int(_) => 1,
            FieldType::Uint(_) => 2,
            FieldType::Address => 3,
            FieldType::Bool => 4,
            FieldType::String => 5,
            FieldType::FixedBytes(_) => 6,
            FieldType::DynamicBytes => 7,
        }
    }

    /// Element width in bytes, for the sized variants
    pub fn type_size(&self) -> Option<u8> {
        match self {
            FieldType::Int(size) | FieldType::Uint(size) | FieldType::FixedBytes(size) => {
                Some(*size)
            }
            _ => None,
        }
    }

    /// Referenced structure name, for [`FieldType::Custom`]
    pub fn type_name(&self) -> Option<&str> {
        match self {
            FieldType::Custom(name) => Some(name),
            _ => None,
        }
    }
}

/// One array dimension of a field declaration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArrayLevel {
    /// Dynamic-length dimension (`[]`)
    Dynamic,
    /// Fixed-length dimension (`[n]`)
    Fixed(u8),
}

impl ArrayLevel {
    /// Presence byte preceding the dimension on the wire
    pub fn type_id(&self) -> u8 {
        match self {
            ArrayLevel::Dynamic => 0,
            ArrayLevel::Fixed(_) => 1,
        }
    }

    /// Fixed dimension size, when there is one
    pub fn size(&self) -> Option<u8> {
        match self {
            ArrayLevel::Dynamic => None,
            ArrayLevel::Fixed(size) => Some(*size),
        }
    }
}

/// One declared field of a structure definition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Base type of the field
    pub field_type: FieldType,
    /// Array dimensions, outermost first; empty for scalar fields
    pub array_levels: Vec<ArrayLevel>,
    /// Declared key name of the field
    pub name: String,
}

impl FieldDefinition {
    /// Create a scalar field declaration
    pub fn new(field_type: FieldType, name: impl Into<String>) -> Self {
        FieldDefinition {
            field_type,
            array_levels: Vec::new(),
            name: name.into(),
        }
    }

    /// Append one array dimension
    pub fn with_array_level(mut self, level: ArrayLevel) -> Self {
        self.array_levels.push(level);
        self
    }

    /// Whether any array dimension is declared
    pub fn is_array(&self) -> bool {
        !self.array_levels.is_empty()
    }
}

/// The declared shape of one typed-data structure
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructDefinition {
    /// Structure type name
    pub name: String,
    /// Field declarations, in declaration order
    pub fields: Vec<FieldDefinition>,
}

impl StructDefinition {
    /// Create an empty structure definition
    pub fn new(name: impl Into<String>) -> Self {
        StructDefinition {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append one field declaration
    pub fn with_field(mut self, field: FieldDefinition) -> Self {
        self.fields.push(field);
        self
    }
}

/// One concrete field value, already application-encoded as raw bytes
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValue {
    /// Raw value bytes; chunked for transport by the protocol layer
    pub value: Vec<u8>,
}

impl FieldValue {
    /// Wrap raw bytes
    pub fn from_bytes(value: Vec<u8>) -> Self {
        FieldValue { value }
    }

    /// Encode a string value
    pub fn from_string(value: &str) -> Self {
        FieldValue {
            value: value.as_bytes().to_vec(),
        }
    }

    /// Encode a boolean value as a single byte
    pub fn from_bool(value: bool) -> Self {
        FieldValue {
            value: vec![u8::from(value)],
        }
    }

    /// Encode an unsigned integer as big-endian bytes
    pub fn from_uint32(value: u32) -> Self {
        FieldValue {
            value: value.to_be_bytes().to_vec(),
        }
    }

    /// Decode a hex address string ("0x"-prefixed or bare) into its 20 bytes
    pub fn from_address_string(address: &str) -> Result<Self, String> {
        let hex_part = address.strip_prefix("0x").unwrap_or(address);
        let bytes =
            hex::decode(hex_part).map_err(|e| format!("invalid address hex: {e}"))?;
        if bytes.len() != 20 {
            return Err(format!(
                "invalid address length: {} bytes (expected 20)",
                bytes.len()
            ));
        }
        Ok(FieldValue { value: bytes })
    }
}

/// A display-filtering entry: a human-readable name plus the signature
/// authenticating it
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEntry {
    /// Display name shown by the device
    pub name: String,
    /// Provider signature over the entry
    pub signature: Vec<u8>,
}

impl FilterEntry {
    /// Create a filtering entry
    pub fn new(name: impl Into<String>, signature: Vec<u8>) -> Self {
        FilterEntry {
            name: name.into(),
            signature,
        }
    }
}

/// Parameters for legacy signing: both hashes are supplied precomputed
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignLegacyParams {
    /// BIP32 derivation path of the signing key
    pub path: BipPath,
    /// EIP-712 domain separator hash
    pub domain_hash: [u8; 32],
    /// EIP-712 message hash
    pub message_hash: [u8; 32],
}

impl SignLegacyParams {
    /// Create legacy signing parameters
    pub fn new(path: BipPath, domain_hash: [u8; 32], message_hash: [u8; 32]) -> Self {
        SignLegacyParams {
            path,
            domain_hash,
            message_hash,
        }
    }
}

/// Signature returned by the device
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Recovery value
    pub v: u8,
    /// Signature component r (32 bytes)
    pub r: Vec<u8>,
    /// Signature component s (32 bytes)
    pub s: Vec<u8>,
}

impl Signature {
    /// Create a signature from components, validating component lengths
    pub fn new(v: u8, r: Vec<u8>, s: Vec<u8>) -> Result<Self, String> {
        if r.len() != length::SIGNATURE_COMPONENT_SIZE {
            return Err(format!("invalid r length: {} (expected 32)", r.len()));
        }
        if s.len() != length::SIGNATURE_COMPONENT_SIZE {
            return Err(format!("invalid s length: {} (expected 32)", s.len()));
        }
        Ok(Signature { v, r, s })
    }

    /// Concatenated `v || r || s` form (65 bytes)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(length::SIGNATURE_SIZE);
        result.push(self.v);
        result.extend_from_slice(&self.r);
        result.extend_from_slice(&self.s);
        result
    }
}
