// SPDX-License-Identifier: Apache-2.0

//! EIP712 FILTERING command

use async_trait::async_trait;
use hwsigner_device_base::{App, AppExt};
use hwsigner_transport::{ApduCommand, Exchange};

use crate::commands::exchange_frame;
use crate::encoding::encode_name_and_signature;
use crate::errors::Eip712Result;
use crate::instructions::{ins, FilteringOp};
use crate::types::FilterEntry;
use crate::Eip712App;

/// EIP-712 display-filtering operations
#[async_trait]
pub trait Eip712Filtering<E>
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    /// Switch filtering on for the rest of the session
    async fn activate_filtering(transport: &E) -> Eip712Result<(), E::Error>;

    /// Announce the contract's display name
    async fn send_contract_name_filter(
        transport: &E,
        entry: &FilterEntry,
    ) -> Eip712Result<(), E::Error>;

    /// Announce one field's display name
    async fn send_field_name_filter(
        transport: &E,
        entry: &FilterEntry,
    ) -> Eip712Result<(), E::Error>;
}

async fn send_filtering_frame<E>(
    transport: &E,
    p1: FilteringOp,
    data: Vec<u8>,
) -> Eip712Result<(), E::Error>
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    let command = ApduCommand {
        cla: Eip712App::CLA,
        ins: ins::EIP712_FILTERING,
        p1: p1 as u8,
        p2: 0x00,
        data,
    };

    let response = exchange_frame(transport, &command).await?;
    <Eip712App as AppExt<E>>::handle_response_error(&response)?;

    Ok(())
}

#[async_trait]
impl<E> Eip712Filtering<E> for Eip712App
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    async fn activate_filtering(transport: &E) -> Eip712Result<(), E::Error> {
        send_filtering_frame(transport, FilteringOp::Activate, Vec::new()).await
    }

    async fn send_contract_name_filter(
        transport: &E,
        entry: &FilterEntry,
    ) -> Eip712Result<(), E::Error> {
        let data = encode_name_and_signature(&entry.name, &entry.signature)?;
        send_filtering_frame(transport, FilteringOp::ContractName, data).await
    }

    async fn send_field_name_filter(
        transport: &E,
        entry: &FilterEntry,
    ) -> Eip712Result<(), E::Error> {
        let data = encode_name_and_signature(&entry.name, &entry.signature)?;
        send_filtering_frame(transport, FilteringOp::FieldName, data).await
    }
}
