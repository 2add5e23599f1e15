// SPDX-License-Identifier: Apache-2.0

//! Legacy EIP-712 signing with precomputed hashes
//!
//! The legacy mode skips the streaming phases entirely: the host computes
//! the domain and message hashes itself and the device signs them blind,
//! in a single frame. Runs against the scripted mock transport.

use std::error::Error;

use hwsigner_eip712::{BipPath, Eip712Session, SignLegacyParams};
use hwsigner_transport::MockExchange;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let transport = MockExchange::new();

    let mut answer = vec![0x1C];
    answer.extend(vec![0x12; 32]);
    answer.extend(vec![0x34; 32]);
    answer.extend([0x90, 0x00]);
    transport.push_answer(answer);

    // Hashes as a host-side EIP-712 library would produce them
    let domain_hash = [0xD0; 32];
    let message_hash = [0x4E; 32];

    let path = BipPath::ethereum_standard(0, 0);
    let params = SignLegacyParams::new(path, domain_hash, message_hash);

    println!("🔐 Signing precomputed hashes on {}...", params.path);
    let mut session = Eip712Session::new(&transport);
    let signature = session.sign_legacy(&params).await?;

    println!("✅ Signature received:");
    println!("   v: 0x{:02x}", signature.v);
    println!("   r: 0x{}", hex::encode(&signature.r));
    println!("   s: 0x{}", hex::encode(&signature.s));

    let frames = transport.recorded_frames();
    println!("\n📨 Single frame on the wire ({} bytes):", frames[0].len());
    println!("   {}", hex::encode(&frames[0]));

    Ok(())
}
