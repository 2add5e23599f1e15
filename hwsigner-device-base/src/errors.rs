// SPDX-License-Identifier: Apache-2.0

//! Device-level error taxonomy shared by signer apps

use thiserror::Error;

/// Errors surfaced while talking to a signer app on a device
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DeviceAppError<E: std::error::Error> {
    /// The device answered with a recognized non-success status word
    #[error("device rejected command: {1} (0x{0:04x})")]
    AppSpecific(u16, String),

    /// The device answered with a status word this SDK does not know
    #[error("unknown status word: 0x{0:04x}")]
    Unknown(u16),

    /// The device reported success but returned no signature payload
    #[error("device returned an empty signature")]
    NoSignature,

    /// Error from the underlying transport
    #[error("transport error: {0}")]
    TransportError(#[from] E),
}

impl<E: std::error::Error> DeviceAppError<E> {
    /// Raw status word carried by this error, when there is one
    pub fn status_word(&self) -> Option<u16> {
        match self {
            DeviceAppError::AppSpecific(word, _) | DeviceAppError::Unknown(word) => Some(*word),
            _ => None,
        }
    }
}
