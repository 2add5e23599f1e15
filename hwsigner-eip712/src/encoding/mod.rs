// SPDX-License-Identifier: Apache-2.0

//! Pure payload encoders for the EIP-712 protocol
//!
//! Everything in here is a function over its inputs; no module touches the
//! transport. Contract violations are rejected before any frame exists.

pub mod field_definition;
pub mod utils;
pub mod value_chunks;

pub use field_definition::*;
pub use utils::*;
pub use value_chunks::*;
