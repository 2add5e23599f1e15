// SPDX-License-Identifier: Apache-2.0

//! Transport abstraction for hardware signer communication
//!
//! Frames are exchanged strictly one at a time: a transport takes one
//! command, blocks until the device answers, and returns that answer.
//! Ordering between frames is the caller's concern.

use std::collections::VecDeque;
use std::fmt;
use std::ops::Deref;
use std::sync::Mutex;

pub use async_trait::async_trait;
pub use hwsigner_apdu::{ApduAnswer, ApduAnswerError, ApduCommand, StatusWord};

/// One-frame-at-a-time exchange with a signing device
#[async_trait]
pub trait Exchange {
    /// Error defined by the transport implementation
    type Error;

    /// The concrete buffer type backing the answer
    type AnswerType: Deref<Target = [u8]> + Send;

    /// Send one command frame and wait for the device's answer
    async fn exchange<I>(
        &self,
        command: &ApduCommand<I>,
    ) -> Result<ApduAnswer<Self::AnswerType>, Self::Error>
    where
        I: Deref<Target = [u8]> + Send + Sync;
}

/// Error produced by [`MockExchange`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockExchangeError {
    /// The mock was told to fail the next exchange
    Scripted,
}

impl fmt::Display for MockExchangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MockExchangeError::Scripted => write!(f, "scripted transport failure"),
        }
    }
}

impl std::error::Error for MockExchangeError {}

/// Scripted in-memory transport for tests and demos
///
/// Answers are popped from a queue in FIFO order; once the queue is empty
/// every exchange returns a bare success status word. Every serialized
/// command frame is recorded for later inspection.
#[derive(Debug, Default)]
pub struct MockExchange {
    answers: Mutex<VecDeque<Vec<u8>>>,
    recorded: Mutex<Vec<Vec<u8>>>,
    fail_next: Mutex<bool>,
}

impl MockExchange {
    /// Create a mock that answers every frame with status 0x9000
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue one raw answer (data followed by 2-byte status word)
    pub fn push_answer(&self, answer: Vec<u8>) {
        self.answers.lock().expect("mock poisoned").push_back(answer);
    }

    /// Queue an empty answer carrying only the given status word
    pub fn push_status(&self, word: u16) {
        self.push_answer(word.to_be_bytes().to_vec());
    }

    /// Make the next exchange fail at the transport level
    pub fn fail_next_exchange(&self) {
        *self.fail_next.lock().expect("mock poisoned") = true;
    }

    /// Serialized frames seen so far, in exchange order
    pub fn recorded_frames(&self) -> Vec<Vec<u8>> {
        self.recorded.lock().expect("mock poisoned").clone()
    }
}

#[async_trait]
impl Exchange for MockExchange {
    type Error = MockExchangeError;
    type AnswerType = Vec<u8>;

    async fn exchange<I>(
        &self,
        command: &ApduCommand<I>,
    ) -> Result<ApduAnswer<Self::AnswerType>, Self::Error>
    where
        I: Deref<Target = [u8]> + Send + Sync,
    {
        if std::mem::take(&mut *self.fail_next.lock().expect("mock poisoned")) {
            return Err(MockExchangeError::Scripted);
        }

        self.recorded
            .lock()
            .expect("mock poisoned")
            .push(command.serialize());

        let answer = self
            .answers
            .lock()
            .expect("mock poisoned")
            .pop_front()
            .unwrap_or_else(|| vec![0x90, 0x00]);

        ApduAnswer::from_answer(answer).map_err(|_| MockExchangeError::Scripted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_returns_success_by_default() {
        let transport = MockExchange::new();
        let cmd = ApduCommand {
            cla: 0xE0,
            ins: 0x0C,
            p1: 0x00,
            p2: 0x00,
            data: Vec::new(),
        };

        let answer = transport.exchange(&cmd).await.unwrap();
        assert_eq!(answer.retcode(), 0x9000);
        assert!(answer.data().is_empty());
        assert_eq!(
            transport.recorded_frames(),
            vec![vec![0xE0, 0x0C, 0x00, 0x00, 0x00]]
        );
    }

    #[tokio::test]
    async fn mock_pops_scripted_answers_in_order() {
        let transport = MockExchange::new();
        transport.push_status(0x6985);
        transport.push_answer(vec![0x01, 0x90, 0x00]);

        let cmd = ApduCommand {
            cla: 0xE0,
            ins: 0x0C,
            p1: 0x00,
            p2: 0x00,
            data: Vec::new(),
        };

        assert_eq!(transport.exchange(&cmd).await.unwrap().retcode(), 0x6985);
        let second = transport.exchange(&cmd).await.unwrap();
        assert_eq!(second.data(), &[0x01]);
        assert_eq!(second.retcode(), 0x9000);
    }

    #[tokio::test]
    async fn mock_can_fail_at_transport_level() {
        let transport = MockExchange::new();
        transport.fail_next_exchange();

        let cmd = ApduCommand {
            cla: 0xE0,
            ins: 0x0C,
            p1: 0x00,
            p2: 0x00,
            data: Vec::new(),
        };

        assert_eq!(
            transport.exchange(&cmd).await.unwrap_err(),
            MockExchangeError::Scripted
        );
        assert!(transport.recorded_frames().is_empty());
    }
}
