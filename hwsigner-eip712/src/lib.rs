// SPDX-License-Identifier: Apache-2.0

//! EIP-712 typed-data signing over a framed device transport
//!
//! A hardware signer cannot take a whole typed-data document in one
//! request, so the document is streamed as a sequence of small command
//! frames: first the structure definitions (type names and field
//! declarations), then the implementation (the root type, array lengths,
//! and leaf values, with long values cut into partial frames), optionally
//! interleaved with display-filtering hints, and finally a single sign
//! request that returns a 65-byte `(v, r, s)` signature.
//!
//! The crate is layered accordingly:
//!
//! - [`types`] — derivation paths, field declarations, values, signatures
//! - [`encoding`] — pure payload builders (descriptor bytes, chunking)
//! - [`commands`] — one async trait per instruction, implemented on the
//!   [`Eip712App`] marker over any [`Exchange`](hwsigner_transport::Exchange)
//! - [`session`] — the per-flow state machine that enforces call ordering
//!
//! Most callers only need [`Eip712Session`]:
//!
//! ```no_run
//! use hwsigner_eip712::{
//!     BipPath, Eip712Session, FieldDefinition, FieldType, FieldValue,
//!     StructDefinition,
//! };
//! use hwsigner_transport::MockExchange;
//!
//! # async fn flow() -> Result<(), Box<dyn std::error::Error>> {
//! let transport = MockExchange::new();
//! let mut session = Eip712Session::new(&transport);
//!
//! session
//!     .send_struct_definition(
//!         &StructDefinition::new("EIP712Domain")
//!             .with_field(FieldDefinition::new(FieldType::String, "name"))
//!             .with_field(FieldDefinition::new(FieldType::Uint(32), "chainId")),
//!     )
//!     .await?;
//!
//! session.send_struct_impl_root("EIP712Domain").await?;
//! session
//!     .send_struct_impl_field(&FieldValue::from_string("USD Coin").value)
//!     .await?;
//!
//! let signature = session.sign_new(&BipPath::ethereum_standard(0, 0)).await?;
//! println!("v={} r={}", signature.v, hex::encode(&signature.r));
//! # Ok(())
//! # }
//! ```

pub mod commands;
pub mod encoding;
pub mod errors;
pub mod instructions;
pub mod session;
pub mod types;

pub use commands::{Eip712Filtering, Eip712Sign, Eip712StructDef, Eip712StructImpl};
pub use errors::{Eip712Error, Eip712Result};
pub use session::{Eip712Session, ProtocolPhase, SessionError, SessionPhase, SessionResult};
pub use types::{
    ArrayLevel, BipPath, FieldDefinition, FieldType, FieldValue, FilterEntry, SignLegacyParams,
    Signature, StructDefinition,
};

use hwsigner_device_base::App;

/// Marker type the per-instruction command traits are implemented on
pub struct Eip712App;

impl App for Eip712App {
    /// Instruction class shared by every frame of the protocol
    const CLA: u8 = 0xE0;
}
