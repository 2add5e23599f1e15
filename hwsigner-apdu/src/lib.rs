// SPDX-License-Identifier: Apache-2.0

//! APDU frame types for hardware signer communication
//!
//! Commands going to the device are a fixed 5-byte header followed by up to
//! 255 payload bytes; answers coming back are an arbitrary data section
//! followed by a 2-byte status word.

use std::ops::Deref;

use arrayref::array_ref;
use snafu::Snafu;

/// Maximum payload carried by one command frame (single length byte)
pub const MAX_FRAME_PAYLOAD: usize = 255;

/// An APDU command frame
///
/// `[cla][ins][p1][p2][len][data...]` with `len == data.len()`.
#[derive(Debug, Clone)]
pub struct ApduCommand<B> {
    /// Instruction class (fixed per application)
    pub cla: u8,
    /// Instruction code
    pub ins: u8,
    /// First instruction parameter
    pub p1: u8,
    /// Second instruction parameter
    pub p2: u8,
    /// Command payload (at most [`MAX_FRAME_PAYLOAD`] bytes)
    pub data: B,
}

impl<B> ApduCommand<B>
where
    B: Deref<Target = [u8]>,
{
    /// Serialize the frame: 5-byte header + payload.
    ///
    /// A payload longer than [`MAX_FRAME_PAYLOAD`] cannot be represented in
    /// the single length byte; callers are responsible for chunking before
    /// building frames, so this is a programming error rather than a
    /// runtime condition.
    pub fn serialize(&self) -> Vec<u8> {
        debug_assert!(self.data.len() <= MAX_FRAME_PAYLOAD);

        let mut bytes = Vec::with_capacity(5 + self.data.len());
        bytes.extend_from_slice(&[self.cla, self.ins, self.p1, self.p2, self.data.len() as u8]);
        bytes.extend_from_slice(&self.data);
        bytes
    }
}

/// Errors splitting a raw answer into data + status word
#[derive(Debug, PartialEq, Eq, Snafu)]
pub enum ApduAnswerError {
    /// Answer was shorter than the 2-byte status word
    #[snafu(display("answer too short to contain a status word"))]
    TooShort,
}

/// An APDU answer: response data followed by a 2-byte status word
#[derive(Debug, Clone)]
pub struct ApduAnswer<B> {
    answer: B,
    retcode: u16,
}

impl<B> ApduAnswer<B>
where
    B: Deref<Target = [u8]>,
{
    /// Split a raw answer buffer into data and trailing status word
    pub fn from_answer(answer: B) -> Result<Self, ApduAnswerError> {
        if answer.len() < 2 {
            return Err(ApduAnswerError::TooShort);
        }
        let retcode = u16::from_be_bytes(*array_ref!(answer, answer.len() - 2, 2));

        Ok(ApduAnswer { answer, retcode })
    }

    /// Response data without the status word
    pub fn data(&self) -> &[u8] {
        &self.answer[..self.answer.len() - 2]
    }

    /// Raw status word
    pub fn retcode(&self) -> u16 {
        self.retcode
    }

    /// Status word as a known code, or the raw value when unrecognized
    pub fn error_code(&self) -> Result<StatusWord, u16> {
        StatusWord::try_from(self.retcode)
    }
}

/// Known APDU status words
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum StatusWord {
    /// Success
    NoError = 0x9000,
    /// General execution error
    ExecutionError = 0x6400,
    /// Wrong length
    WrongLength = 0x6700,
    /// Security status not satisfied (device locked)
    EmptyBuffer = 0x6982,
    /// Output buffer too small
    OutputBufferTooSmall = 0x6983,
    /// Referenced data invalid
    DataInvalid = 0x6984,
    /// Conditions of use not satisfied (user refused)
    ConditionsNotSatisfied = 0x6985,
    /// Command not allowed in the current state
    CommandNotAllowed = 0x6986,
    /// Referenced key handle invalid
    BadKeyHandle = 0x6A80,
    /// Invalid P1 or P2 parameter
    InvalidP1P2 = 0x6B00,
    /// Instruction not supported
    InsNotSupported = 0x6D00,
    /// Instruction class not supported
    ClaNotSupported = 0x6E00,
    /// Technical problem with no diagnosis
    Unknown = 0x6F00,
    /// Signature verification failed on-device
    SignVerifyError = 0x6F01,
}

impl StatusWord {
    /// Human-readable description of the status word
    pub fn description(&self) -> String {
        match self {
            StatusWord::NoError => "[APDU_CODE_NOERROR] Success".to_string(),
            StatusWord::ExecutionError => {
                "[APDU_CODE_EXECUTION_ERROR] No information given (command aborted)".to_string()
            }
            StatusWord::WrongLength => "[APDU_CODE_WRONG_LENGTH] Wrong length".to_string(),
            StatusWord::EmptyBuffer => "[APDU_CODE_EMPTY_BUFFER] Device is locked".to_string(),
            StatusWord::OutputBufferTooSmall => {
                "[APDU_CODE_OUTPUT_BUFFER_TOO_SMALL] Output buffer too small".to_string()
            }
            StatusWord::DataInvalid => {
                "[APDU_CODE_DATA_INVALID] Referenced data reversibly blocked".to_string()
            }
            StatusWord::ConditionsNotSatisfied => {
                "[APDU_CODE_CONDITIONS_NOT_SATISFIED] Conditions of use not satisfied".to_string()
            }
            StatusWord::CommandNotAllowed => {
                "[APDU_CODE_COMMAND_NOT_ALLOWED] Command not allowed".to_string()
            }
            StatusWord::BadKeyHandle => {
                "[APDU_CODE_BAD_KEY_HANDLE] The parameters in the data field are incorrect"
                    .to_string()
            }
            StatusWord::InvalidP1P2 => "[APDU_CODE_INVALID_P1P2] Wrong parameters P1-P2".to_string(),
            StatusWord::InsNotSupported => {
                "[APDU_CODE_INS_NOT_SUPPORTED] Instruction code not supported".to_string()
            }
            StatusWord::ClaNotSupported => {
                "[APDU_CODE_CLA_NOT_SUPPORTED] Class not supported".to_string()
            }
            StatusWord::Unknown => "[APDU_CODE_UNKNOWN] Technical problem".to_string(),
            StatusWord::SignVerifyError => {
                "[APDU_CODE_SIGN_VERIFY_ERROR] Signature verification failed".to_string()
            }
        }
    }
}

impl TryFrom<u16> for StatusWord {
    type Error = u16;

    fn try_from(word: u16) -> Result<Self, u16> {
        match word {
            0x9000 => Ok(StatusWord::NoError),
            0x6400 => Ok(StatusWord::ExecutionError),
            0x6700 => Ok(StatusWord::WrongLength),
            0x6982 => Ok(StatusWord::EmptyBuffer),
            0x6983 => Ok(StatusWord::OutputBufferTooSmall),
            0x6984 => Ok(StatusWord::DataInvalid),
            0x6985 => Ok(StatusWord::ConditionsNotSatisfied),
            0x6986 => Ok(StatusWord::CommandNotAllowed),
            0x6A80 => Ok(StatusWord::BadKeyHandle),
            0x6B00 => Ok(StatusWord::InvalidP1P2),
            0x6D00 => Ok(StatusWord::InsNotSupported),
            0x6E00 => Ok(StatusWord::ClaNotSupported),
            0x6F00 => Ok(StatusWord::Unknown),
            0x6F01 => Ok(StatusWord::SignVerifyError),
            other => Err(other),
        }
    }
}
