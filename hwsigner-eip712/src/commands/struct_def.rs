// SPDX-License-Identifier: Apache-2.0

//! EIP712 SEND STRUCT DEFINITION command

use async_trait::async_trait;
use hwsigner_device_base::{App, AppExt};
use hwsigner_transport::{ApduCommand, Exchange};

use crate::commands::exchange_frame;
use crate::encoding::{encode_field_definition, string_to_bytes};
use crate::errors::Eip712Result;
use crate::instructions::{ins, SendMode, StructDefTarget};
use crate::types::{FieldDefinition, StructDefinition};
use crate::Eip712App;

/// EIP-712 struct definition operations
#[async_trait]
pub trait Eip712StructDef<E>
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    /// Announce one structure's type name
    async fn send_struct_def_name(transport: &E, name: &str) -> Eip712Result<(), E::Error>;

    /// Send one field declaration.
    ///
    /// Returns the device's raw status word instead of asserting success:
    /// the field-definition answer is the one response the original
    /// protocol hands back to the caller unchecked. Callers must not issue
    /// further requests after observing a non-success word.
    async fn send_struct_def_field(
        transport: &E,
        field: &FieldDefinition,
    ) -> Eip712Result<u16, E::Error>;

    /// Announce a structure's name and stream all its field declarations,
    /// asserting success for each frame
    async fn send_struct_definition(
        transport: &E,
        struct_def: &StructDefinition,
    ) -> Eip712Result<(), E::Error>;
}

#[async_trait]
impl<E> Eip712StructDef<E> for Eip712App
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    async fn send_struct_def_name(transport: &E, name: &str) -> Eip712Result<(), E::Error> {
        let command = ApduCommand {
            cla: Self::CLA,
            ins: ins::EIP712_SEND_STRUCT_DEFINITION,
            p1: SendMode::Complete as u8,
            p2: StructDefTarget::StructName as u8,
            data: string_to_bytes(name)?,
        };

        let response = exchange_frame(transport, &command).await?;
        <Eip712App as AppExt<E>>::handle_response_error(&response)?;

        Ok(())
    }

    async fn send_struct_def_field(
        transport: &E,
        field: &FieldDefinition,
    ) -> Eip712Result<u16, E::Error> {
        let command = ApduCommand {
            cla: Self::CLA,
            ins: ins::EIP712_SEND_STRUCT_DEFINITION,
            p1: SendMode::Complete as u8,
            p2: StructDefTarget::StructField as u8,
            data: encode_field_definition(field)?,
        };

        let response = exchange_frame(transport, &command).await?;

        // Raw status word, caller decides
        Ok(response.retcode())
    }

    async fn send_struct_definition(
        transport: &E,
        struct_def: &StructDefinition,
    ) -> Eip712Result<(), E::Error> {
        Self::send_struct_def_name(transport, &struct_def.name).await?;

        for field in &struct_def.fields {
            let command = ApduCommand {
                cla: Self::CLA,
                ins: ins::EIP712_SEND_STRUCT_DEFINITION,
                p1: SendMode::Complete as u8,
                p2: StructDefTarget::StructField as u8,
                data: encode_field_definition(field)?,
            };

            let response = exchange_frame(transport, &command).await?;
            <Eip712App as AppExt<E>>::handle_response_error(&response)?;
        }

        Ok(())
    }
}
