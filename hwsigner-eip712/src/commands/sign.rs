// SPDX-License-Identifier: Apache-2.0

//! SIGN EIP 712 TYPED DATA command and its response decoder

use async_trait::async_trait;
use hwsigner_device_base::{App, AppExt};
use hwsigner_transport::{ApduCommand, Exchange};

use crate::commands::exchange_frame;
use crate::encoding::{encode_bip32_path, validate_bip32_path};
use crate::errors::{Eip712Error, Eip712Result};
use crate::instructions::{ins, length, SendMode, SignMode};
use crate::types::{BipPath, SignLegacyParams, Signature};
use crate::Eip712App;

/// EIP-712 signing operations
#[async_trait]
pub trait Eip712Sign<E>
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    /// Sign with hashes derived on-device from the streamed implementation
    async fn sign_new(transport: &E, path: &BipPath) -> Eip712Result<Signature, E::Error>;

    /// Sign with caller-supplied domain and message hashes; requires no
    /// structure streaming at all
    async fn sign_legacy(
        transport: &E,
        params: &SignLegacyParams,
    ) -> Eip712Result<Signature, E::Error>;
}

#[async_trait]
impl<E> Eip712Sign<E> for Eip712App
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    async fn sign_new(transport: &E, path: &BipPath) -> Eip712Result<Signature, E::Error> {
        validate_bip32_path(path)?;

        let command = ApduCommand {
            cla: Self::CLA,
            ins: ins::SIGN_EIP712,
            p1: SendMode::Complete as u8,
            p2: SignMode::New as u8,
            data: encode_bip32_path(path),
        };

        let response = exchange_frame(transport, &command).await?;
        <Eip712App as AppExt<E>>::handle_response_error_signature(&response)?;

        parse_sign_response(response.data())
    }

    async fn sign_legacy(
        transport: &E,
        params: &SignLegacyParams,
    ) -> Eip712Result<Signature, E::Error> {
        validate_bip32_path(&params.path)?;

        let mut data = encode_bip32_path(&params.path);
        data.extend_from_slice(&params.domain_hash);
        data.extend_from_slice(&params.message_hash);

        let command = ApduCommand {
            cla: Self::CLA,
            ins: ins::SIGN_EIP712,
            p1: SendMode::Complete as u8,
            p2: SignMode::Legacy as u8,
            data,
        };

        let response = exchange_frame(transport, &command).await?;
        <Eip712App as AppExt<E>>::handle_response_error_signature(&response)?;

        parse_sign_response(response.data())
    }
}

/// Decode the fixed 65-byte signature answer into `v`, `r`, `s`.
///
/// Any other length is a decode failure, distinct from a status-word
/// rejection: the word may still read success.
pub fn parse_sign_response<E: std::error::Error>(data: &[u8]) -> Eip712Result<Signature, E> {
    if data.len() != length::SIGNATURE_SIZE {
        return Err(Eip712Error::InvalidResponseData(format!(
            "invalid signature response length: {} bytes (expected {})",
            data.len(),
            length::SIGNATURE_SIZE
        )));
    }

    let v = data[0];
    let r = data[1..33].to_vec();
    let s = data[33..65].to_vec();

    Signature::new(v, r, s).map_err(Eip712Error::InvalidSignature)
}

#[cfg(test)]
mod tests {
    use super::*;

    type TestError = std::io::Error;

    #[test]
    fn splits_65_byte_response() {
        let mut data = vec![0x1C];
        data.extend(vec![0xAA; 32]);
        data.extend(vec![0xBB; 32]);

        let signature = parse_sign_response::<TestError>(&data).unwrap();
        assert_eq!(signature.v, 0x1C);
        assert!(signature.r.iter().all(|&b| b == 0xAA));
        assert!(signature.s.iter().all(|&b| b == 0xBB));
        assert_eq!(signature.to_bytes(), data);
    }

    #[test]
    fn rejects_any_other_length() {
        assert!(parse_sign_response::<TestError>(&[]).is_err());
        assert!(parse_sign_response::<TestError>(&vec![0u8; 64]).is_err());
        assert!(parse_sign_response::<TestError>(&vec![0u8; 66]).is_err());
    }
}
