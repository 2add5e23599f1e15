// SPDX-License-Identifier: Apache-2.0

//! Per-instruction command implementations
//!
//! Each module defines one async trait implemented on the
//! [`Eip712App`](crate::Eip712App) marker. These are the stateless
//! request/response pairs; call ordering across them is enforced by
//! [`Eip712Session`](crate::session::Eip712Session).

pub mod filtering;
pub mod sign;
pub mod struct_def;
pub mod struct_impl;

pub use filtering::*;
pub use sign::*;
pub use struct_def::*;
pub use struct_impl::*;

use std::ops::Deref;

use hwsigner_transport::{ApduAnswer, ApduCommand, Exchange};
use log::debug;

use crate::errors::{Eip712Error, Eip712Result};

/// Exchange one frame, tracing both directions at debug level
pub(crate) async fn exchange_frame<E, I>(
    transport: &E,
    command: &ApduCommand<I>,
) -> Eip712Result<ApduAnswer<E::AnswerType>, E::Error>
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
    I: Deref<Target = [u8]> + Send + Sync,
{
    let raw = command.serialize();
    debug!("[{:3}] >> {}", raw.len(), hex::encode(&raw));

    let answer = transport
        .exchange(command)
        .await
        .map_err(|e| Eip712Error::Transport(e.into()))?;

    debug!(
        "[{:3}] << {} {:04x}",
        answer.data().len(),
        hex::encode(answer.data()),
        answer.retcode()
    );

    Ok(answer)
}
