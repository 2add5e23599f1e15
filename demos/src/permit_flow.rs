// SPDX-License-Identifier: Apache-2.0

//! Full new-mode EIP-712 flow for an ERC-2612 permit
//!
//! Streams the structure definitions, the filtering hints, and the
//! implementation of a USDC permit through a session, then requests the
//! signature. Runs against the scripted mock transport so it can be
//! executed without a device; every frame that would reach the wire is
//! printed at the end. Run with `RUST_LOG=debug` to also see the frames
//! as they are exchanged.

use std::error::Error;

use hwsigner_eip712::{
    ArrayLevel, BipPath, Eip712Session, FieldDefinition, FieldType, FieldValue, FilterEntry,
    StructDefinition,
};
use hwsigner_transport::MockExchange;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let transport = MockExchange::new();
    let mut session = Eip712Session::new(&transport);

    println!("📋 Streaming structure definitions...");

    session
        .send_struct_definition(
            &StructDefinition::new("EIP712Domain")
                .with_field(FieldDefinition::new(FieldType::String, "name"))
                .with_field(FieldDefinition::new(FieldType::String, "version"))
                .with_field(FieldDefinition::new(FieldType::Uint(32), "chainId"))
                .with_field(FieldDefinition::new(FieldType::Address, "verifyingContract")),
        )
        .await?;

    session
        .send_struct_definition(
            &StructDefinition::new("Permit")
                .with_field(FieldDefinition::new(FieldType::Address, "owner"))
                .with_field(FieldDefinition::new(FieldType::Address, "spender"))
                .with_field(FieldDefinition::new(FieldType::Uint(32), "value"))
                .with_field(FieldDefinition::new(FieldType::Uint(32), "nonce"))
                .with_field(FieldDefinition::new(FieldType::Uint(32), "deadline")),
        )
        .await?;

    // An unused array-typed structure, to show the descriptor encoding
    session
        .send_struct_definition(
            &StructDefinition::new("Batch").with_field(
                FieldDefinition::new(FieldType::Custom("Permit".into()), "permits")
                    .with_array_level(ArrayLevel::Dynamic),
            ),
        )
        .await?;

    println!("🔍 Activating display filtering...");
    session.activate_filtering().await?;
    session
        .send_contract_name_filter(&FilterEntry::new("USD Coin", vec![0x30, 0x44, 0x02, 0x20]))
        .await?;

    println!("📦 Streaming the domain implementation...");
    session.send_struct_impl_root("EIP712Domain").await?;
    session
        .send_struct_impl_field(&FieldValue::from_string("USD Coin").value)
        .await?;
    session
        .send_struct_impl_field(&FieldValue::from_string("2").value)
        .await?;
    session
        .send_struct_impl_field(&FieldValue::from_uint32(1).value)
        .await?;
    session
        .send_struct_impl_field(
            &FieldValue::from_address_string("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48")?.value,
        )
        .await?;

    println!("📦 Streaming the permit implementation...");
    session.send_struct_impl_root("Permit").await?;
    session
        .send_field_name_filter(&FilterEntry::new("Owner", vec![0x30, 0x44, 0x02, 0x21]))
        .await?;
    session
        .send_struct_impl_field(
            &FieldValue::from_address_string("0x6cbcd73cd8e8a42844662f0a0e76d7f79afd933d")?.value,
        )
        .await?;
    session
        .send_field_name_filter(&FilterEntry::new("Spender", vec![0x30, 0x44, 0x02, 0x22]))
        .await?;
    session
        .send_struct_impl_field(
            &FieldValue::from_address_string("0x111111125421ca6dc452d289314280a0f8842a65")?.value,
        )
        .await?;
    // uint256 max, as 32 big-endian bytes
    session.send_struct_impl_field(&[0xFF; 32]).await?;
    session
        .send_struct_impl_field(&FieldValue::from_uint32(0).value)
        .await?;
    session
        .send_struct_impl_field(&FieldValue::from_uint32(1_718_992_051).value)
        .await?;

    println!("🔐 Requesting the signature...");
    let mut answer = vec![0x1B];
    answer.extend(vec![0xAB; 32]);
    answer.extend(vec![0xCD; 32]);
    answer.extend([0x90, 0x00]);
    transport.push_answer(answer);

    let path = BipPath::ethereum_standard(0, 0);
    let signature = session.sign_new(&path).await?;

    println!("✅ Signature received for {path}:");
    println!("   v: 0x{:02x}", signature.v);
    println!("   r: 0x{}", hex::encode(&signature.r));
    println!("   s: 0x{}", hex::encode(&signature.s));

    println!("\n📨 Frames that reached the wire:");
    for frame in transport.recorded_frames() {
        println!("   {}", hex::encode(frame));
    }

    Ok(())
}
