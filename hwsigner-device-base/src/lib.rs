// SPDX-License-Identifier: Apache-2.0

//! Base traits shared by hardware signer applications
//!
//! An "app" is the on-device application a client talks to, identified by
//! its APDU instruction class. [`AppExt`] normalizes status-word handling
//! so command implementations only deal with typed errors.

mod errors;

use async_trait::async_trait;
pub use errors::*;
use hwsigner_transport::{ApduAnswer, Exchange, StatusWord};

/// Defines what we can consider an "App"
pub trait App {
    /// App's APDU CLA
    const CLA: u8;
}

#[async_trait]
pub trait AppExt<E>: App
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    /// Check the answer's status word. Ok on 0x9000, otherwise map to a
    /// typed device error.
    fn handle_response_error(
        response: &ApduAnswer<E::AnswerType>,
    ) -> Result<(), DeviceAppError<E::Error>> {
        match response.error_code() {
            Ok(StatusWord::NoError) => Ok(()),
            Ok(err) => Err(DeviceAppError::AppSpecific(err as u16, err.description())),
            Err(err) => Err(DeviceAppError::Unknown(err)),
        }
    }

    /// Same as [`AppExt::handle_response_error`], but also requires a
    /// non-empty payload (signature).
    fn handle_response_error_signature(
        response: &ApduAnswer<E::AnswerType>,
    ) -> Result<(), DeviceAppError<E::Error>> {
        match response.error_code() {
            Ok(StatusWord::NoError) if response.data().is_empty() => {
                Err(DeviceAppError::NoSignature)
            }
            Ok(StatusWord::NoError) => Ok(()),
            Ok(err) => Err(DeviceAppError::AppSpecific(err as u16, err.description())),
            Err(err) => Err(DeviceAppError::Unknown(err)),
        }
    }
}

impl<T, E> AppExt<E> for T
where
    T: App,
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
}
