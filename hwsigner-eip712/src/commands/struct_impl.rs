// SPDX-License-Identifier: Apache-2.0

//! EIP712 SEND STRUCT IMPLEMENTATION command

use async_trait::async_trait;
use hwsigner_device_base::{App, AppExt};
use hwsigner_transport::{ApduCommand, Exchange};

use crate::commands::exchange_frame;
use crate::encoding::{string_to_bytes, ChunkedValue};
use crate::errors::Eip712Result;
use crate::instructions::{ins, SendMode, StructImplTarget};
use crate::Eip712App;

/// EIP-712 struct implementation operations
#[async_trait]
pub trait Eip712StructImpl<E>
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    /// Announce the root structure's type name before streaming values
    async fn send_struct_impl_root(transport: &E, name: &str) -> Eip712Result<(), E::Error>;

    /// Announce the length of a dynamic array before its elements
    async fn send_struct_impl_array(transport: &E, size: u8) -> Eip712Result<(), E::Error>;

    /// Stream one leaf field value, chunked across as many frames as its
    /// length requires; each frame is acknowledged before the next is sent
    async fn send_struct_impl_field(transport: &E, value: &[u8]) -> Eip712Result<(), E::Error>;
}

#[async_trait]
impl<E> Eip712StructImpl<E> for Eip712App
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    async fn send_struct_impl_root(transport: &E, name: &str) -> Eip712Result<(), E::Error> {
        let command = ApduCommand {
            cla: Self::CLA,
            ins: ins::EIP712_SEND_STRUCT_IMPLEMENTATION,
            p1: SendMode::Complete as u8,
            p2: StructImplTarget::RootStruct as u8,
            data: string_to_bytes(name)?,
        };

        let response = exchange_frame(transport, &command).await?;
        <Eip712App as AppExt<E>>::handle_response_error(&response)?;

        Ok(())
    }

    async fn send_struct_impl_array(transport: &E, size: u8) -> Eip712Result<(), E::Error> {
        let command = ApduCommand {
            cla: Self::CLA,
            ins: ins::EIP712_SEND_STRUCT_IMPLEMENTATION,
            p1: SendMode::Complete as u8,
            p2: StructImplTarget::Array as u8,
            data: vec![size],
        };

        let response = exchange_frame(transport, &command).await?;
        <Eip712App as AppExt<E>>::handle_response_error(&response)?;

        Ok(())
    }

    async fn send_struct_impl_field(transport: &E, value: &[u8]) -> Eip712Result<(), E::Error> {
        let chunks = ChunkedValue::new(value)?;
        for chunk in chunks {
            let command = ApduCommand {
                cla: Self::CLA,
                ins: ins::EIP712_SEND_STRUCT_IMPLEMENTATION,
                p1: chunk.mode as u8,
                p2: StructImplTarget::StructField as u8,
                data: chunk.payload,
            };

            let response = exchange_frame(transport, &command).await?;
            <Eip712App as AppExt<E>>::handle_response_error(&response)?;
        }

        Ok(())
    }
}
