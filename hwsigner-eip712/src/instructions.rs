// SPDX-License-Identifier: Apache-2.0

//! APDU instruction and parameter codes for the EIP-712 protocol
//!
//! P1/P2 values are modeled as one enum per instruction rather than a flat
//! byte space: several instructions reuse the same numeric values for
//! unrelated meanings, and distinct types keep a struct-definition
//! parameter from ending up on a filtering frame.

/// APDU instruction codes
pub mod ins {
    /// SIGN EIP 712 TYPED DATA
    pub const SIGN_EIP712: u8 = 0x0C;
    /// EIP712 SEND STRUCT DEFINITION
    pub const EIP712_SEND_STRUCT_DEFINITION: u8 = 0x1A;
    /// EIP712 SEND STRUCT IMPLEMENTATION
    pub const EIP712_SEND_STRUCT_IMPLEMENTATION: u8 = 0x1C;
    /// EIP712 FILTERING
    pub const EIP712_FILTERING: u8 = 0x1E;
}

/// P1 for multi-frame instructions: tags the final vs. non-final frame of
/// one logical message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SendMode {
    /// Last (or only) frame of the message
    Complete = 0x00,
    /// More frames of the same message follow
    Partial = 0x01,
}

/// P2 for EIP712 SEND STRUCT DEFINITION
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StructDefTarget {
    /// Payload is a structure name
    StructName = 0x00,
    /// Payload is one encoded field descriptor
    StructField = 0xFF,
}

/// P2 for EIP712 SEND STRUCT IMPLEMENTATION
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum StructImplTarget {
    /// Payload is the root structure's type name
    RootStruct = 0x00,
    /// Payload is a one-byte dynamic array length
    Array = 0x0F,
    /// Payload is (a chunk of) one length-prefixed field value
    StructField = 0xFF,
}

/// P1 for EIP712 FILTERING
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FilteringOp {
    /// Switch filtering on for the session
    Activate = 0x00,
    /// Payload is a contract-name filtering entry
    ContractName = 0x0F,
    /// Payload is a field-name filtering entry
    FieldName = 0xFF,
}

/// P2 for SIGN EIP 712 TYPED DATA
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SignMode {
    /// Caller supplies precomputed domain and message hashes
    Legacy = 0x00,
    /// Device derives both hashes from the streamed implementation
    New = 0x01,
}

/// Data length constants
pub mod length {
    /// Maximum BIP 32 derivation path depth
    pub const MAX_BIP32_PATH_DEPTH: usize = 10;
    /// Size of each BIP 32 derivation index
    pub const BIP32_INDEX_SIZE: usize = 4;
    /// Size of the EIP-712 domain separator hash
    pub const DOMAIN_HASH_SIZE: usize = 32;
    /// Size of the EIP-712 message hash
    pub const MESSAGE_HASH_SIZE: usize = 32;
    /// Size of signature component (r or s)
    pub const SIGNATURE_COMPONENT_SIZE: usize = 32;
    /// Size of the full signature answer (v + r + s)
    pub const SIGNATURE_SIZE: usize = 65;
    /// Maximum payload carried by one command frame
    pub const MAX_FRAME_PAYLOAD: usize = 255;
}
