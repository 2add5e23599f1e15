// SPDX-License-Identifier: Apache-2.0

//! Error types for the EIP-712 signing protocol

use hwsigner_device_base::DeviceAppError;
use thiserror::Error;

/// EIP-712 protocol errors
///
/// Contract violations (`InvalidBip32Path`, `InvalidFieldDefinition`,
/// `UnencodableText`, `NameTooLong`, `ValueTooLarge`) are detected before
/// any frame is built; `Transport` covers both transport failures and
/// device rejections; `InvalidResponseData`/`InvalidSignature` are decode
/// failures on answers whose status word read success.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Eip712Error<E: std::error::Error> {
    /// Error from the underlying transport or a device rejection
    #[error("transport error: {0}")]
    Transport(#[from] DeviceAppError<E>),

    /// Invalid BIP32 derivation path
    #[error("invalid BIP32 path: {0}")]
    InvalidBip32Path(String),

    /// Field declaration that cannot be encoded (e.g. custom type with an
    /// empty name)
    #[error("invalid field definition: {0}")]
    InvalidFieldDefinition(String),

    /// Text containing a character whose ordinal does not fit one byte
    #[error("unencodable text: {0}")]
    UnencodableText(String),

    /// Name or signature longer than its single length byte allows
    #[error("{what} too long: {len} bytes (max 255)")]
    NameTooLong { what: &'static str, len: usize },

    /// Field value longer than the 2-byte length prefix allows
    #[error("field value too large: {size} bytes (max {max})")]
    ValueTooLarge { size: usize, max: usize },

    /// Answer with an unexpected shape despite a success status
    #[error("invalid response data: {0}")]
    InvalidResponseData(String),

    /// Signature components of unexpected size
    #[error("invalid signature: {0}")]
    InvalidSignature(String),
}

impl<E: std::error::Error> Eip712Error<E> {
    /// Whether the device rejected the operation (non-success status word)
    pub fn is_device_rejection(&self) -> bool {
        matches!(
            self,
            Eip712Error::Transport(DeviceAppError::AppSpecific(..))
                | Eip712Error::Transport(DeviceAppError::Unknown(_))
        )
    }

    /// Whether the error was raised before any frame was transmitted
    pub fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Eip712Error::InvalidBip32Path(_)
                | Eip712Error::InvalidFieldDefinition(_)
                | Eip712Error::UnencodableText(_)
                | Eip712Error::NameTooLong { .. }
                | Eip712Error::ValueTooLarge { .. }
        )
    }
}

/// Result alias for EIP-712 protocol operations
pub type Eip712Result<T, E> = Result<T, Eip712Error<E>>;
