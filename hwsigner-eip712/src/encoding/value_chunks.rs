// SPDX-License-Identifier: Apache-2.0

//! Chunking of raw field values into bounded frames
//!
//! A value is framed as a 2-byte big-endian total length followed by the
//! raw bytes, then cut into payloads of at most 255 bytes. Every chunk
//! before the last is tagged [`SendMode::Partial`], the last
//! [`SendMode::Complete`]; the device reassembles them as one logical
//! value, so chunks must be sent and acknowledged in order.

use crate::errors::{Eip712Error, Eip712Result};
use crate::instructions::{length, SendMode};

/// One transport-sized piece of a framed field value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValueChunk {
    /// Whether this is the final chunk of the value
    pub mode: SendMode,
    /// Frame payload (at most 255 bytes)
    pub payload: Vec<u8>,
}

/// Lazy, finite, non-restartable chunk sequence over one framed value
#[derive(Debug)]
pub struct ChunkedValue {
    framed: Vec<u8>,
    offset: usize,
}

impl ChunkedValue {
    /// Frame `value` with its 2-byte length prefix.
    ///
    /// The declared length is exactly `value.len()`; values longer than
    /// the prefix can describe are a caller contract violation.
    pub fn new<E: std::error::Error>(value: &[u8]) -> Eip712Result<Self, E> {
        if value.len() > usize::from(u16::MAX) {
            return Err(Eip712Error::ValueTooLarge {
                size: value.len(),
                max: usize::from(u16::MAX),
            });
        }

        let mut framed = Vec::with_capacity(2 + value.len());
        framed.extend_from_slice(&(value.len() as u16).to_be_bytes());
        framed.extend_from_slice(value);

        Ok(ChunkedValue { framed, offset: 0 })
    }
}

impl Iterator for ChunkedValue {
    type Item = ValueChunk;

    fn next(&mut self) -> Option<ValueChunk> {
        if self.offset >= self.framed.len() {
            return None;
        }

        let end = usize::min(self.offset + length::MAX_FRAME_PAYLOAD, self.framed.len());
        let mode = if end == self.framed.len() {
            SendMode::Complete
        } else {
            SendMode::Partial
        };
        let payload = self.framed[self.offset..end].to_vec();
        self.offset = end;

        Some(ValueChunk { mode, payload })
    }
}
