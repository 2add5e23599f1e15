// SPDX-License-Identifier: Apache-2.0

//! One signing session as an explicit state machine
//!
//! The device builds its type table and value tree incrementally, so the
//! order of requests matters: definitions, then implementations (with the
//! optional filtering sub-flow), then exactly one sign request. The
//! session makes that ordering explicit — an illegal call order is a
//! [`SessionError::OutOfOrder`] before any frame is built, and a rejected
//! or failed operation moves the session to [`SessionPhase::Failed`],
//! after which every operation is refused. A failed session is not
//! recoverable; start a new one.
//!
//! One session instance per signing flow; the filtering switch is session
//! state and must not be shared across concurrent flows.

use hwsigner_transport::Exchange;
use thiserror::Error;

use crate::commands::{Eip712Filtering, Eip712Sign, Eip712StructDef, Eip712StructImpl};
use crate::errors::Eip712Error;
use crate::types::{
    BipPath, FieldDefinition, FilterEntry, SignLegacyParams, Signature, StructDefinition,
};
use crate::Eip712App;

/// Where a session currently stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing sent yet
    Idle,
    /// Structure definitions are being streamed
    DefiningStructs,
    /// Structure values are being streamed
    ImplementingStructs,
    /// A signature was produced; the session is spent
    Done,
    /// An operation failed; the session is spent
    Failed,
}

/// Which protocol phase an error came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolPhase {
    /// Structure definition streaming
    Definition,
    /// Structure implementation streaming
    Implementation,
    /// Display-filtering sub-flow
    Filtering,
    /// The final sign request
    Signing,
}

/// Errors produced by a session
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError<E: std::error::Error> {
    /// Operation issued in a phase that does not allow it
    #[error("{operation} not allowed in the {phase:?} phase")]
    OutOfOrder {
        /// The refused operation
        operation: &'static str,
        /// The session's phase at the time of the call
        phase: SessionPhase,
    },

    /// Filtering operation issued before filtering was activated
    #[error("{operation} issued before filtering activation")]
    FilteringNotActivated {
        /// The refused operation
        operation: &'static str,
    },

    /// An operation failed; the phase identifies which part of the flow
    #[error("{phase:?} phase failed: {source}")]
    Phase {
        /// The protocol phase the failing operation belongs to
        phase: ProtocolPhase,
        /// The underlying failure
        #[source]
        source: Eip712Error<E>,
    },
}

/// Result alias for session operations
pub type SessionResult<T, E> = Result<T, SessionError<E>>;

/// One EIP-712 signing session over a transport
#[derive(Debug)]
pub struct Eip712Session<'t, E: Exchange> {
    transport: &'t E,
    phase: SessionPhase,
    filtering_active: bool,
}

impl<'t, E> Eip712Session<'t, E>
where
    E: Exchange + Send + Sync,
    E::Error: std::error::Error,
{
    /// Start a fresh session in the Idle phase
    pub fn new(transport: &'t E) -> Self {
        Eip712Session {
            transport,
            phase: SessionPhase::Idle,
            filtering_active: false,
        }
    }

    /// The session's current phase
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Whether filtering has been activated in this session
    pub fn filtering_active(&self) -> bool {
        self.filtering_active
    }

    fn require(
        &self,
        operation: &'static str,
        allowed: &[SessionPhase],
    ) -> SessionResult<(), E::Error> {
        if allowed.contains(&self.phase) {
            Ok(())
        } else {
            Err(SessionError::OutOfOrder {
                operation,
                phase: self.phase,
            })
        }
    }

    fn finish<T>(
        &mut self,
        phase: ProtocolPhase,
        result: Result<T, Eip712Error<E::Error>>,
    ) -> SessionResult<T, E::Error> {
        match result {
            Ok(value) => Ok(value),
            Err(source) => {
                self.phase = SessionPhase::Failed;
                Err(SessionError::Phase { phase, source })
            }
        }
    }

    /// Announce one structure's type name (definition phase)
    pub async fn send_struct_def_name(&mut self, name: &str) -> SessionResult<(), E::Error> {
        self.require(
            "send_struct_def_name",
            &[SessionPhase::Idle, SessionPhase::DefiningStructs],
        )?;

        let result =
            <Eip712App as Eip712StructDef<E>>::send_struct_def_name(self.transport, name).await;
        self.finish(ProtocolPhase::Definition, result)?;
        self.phase = SessionPhase::DefiningStructs;
        Ok(())
    }

    /// Send one field declaration for the structure announced last.
    ///
    /// Returns the device's raw status word rather than asserting success;
    /// on a non-success word the session is marked failed so no further
    /// requests can follow it.
    pub async fn send_struct_def_field(
        &mut self,
        field: &FieldDefinition,
    ) -> SessionResult<u16, E::Error> {
        self.require("send_struct_def_field", &[SessionPhase::DefiningStructs])?;

        let result =
            <Eip712App as Eip712StructDef<E>>::send_struct_def_field(self.transport, field).await;
        let word = self.finish(ProtocolPhase::Definition, result)?;
        if word != 0x9000 {
            self.phase = SessionPhase::Failed;
        }
        Ok(word)
    }

    /// Announce a structure and stream all its field declarations
    pub async fn send_struct_definition(
        &mut self,
        struct_def: &StructDefinition,
    ) -> SessionResult<(), E::Error> {
        self.require(
            "send_struct_definition",
            &[SessionPhase::Idle, SessionPhase::DefiningStructs],
        )?;

        let result =
            <Eip712App as Eip712StructDef<E>>::send_struct_definition(self.transport, struct_def)
                .await;
        self.finish(ProtocolPhase::Definition, result)?;
        self.phase = SessionPhase::DefiningStructs;
        Ok(())
    }

    /// Announce the root structure's type name, entering the
    /// implementation phase
    pub async fn send_struct_impl_root(&mut self, name: &str) -> SessionResult<(), E::Error> {
        self.require(
            "send_struct_impl_root",
            &[
                SessionPhase::DefiningStructs,
                SessionPhase::ImplementingStructs,
            ],
        )?;

        let result =
            <Eip712App as Eip712StructImpl<E>>::send_struct_impl_root(self.transport, name).await;
        self.finish(ProtocolPhase::Implementation, result)?;
        self.phase = SessionPhase::ImplementingStructs;
        Ok(())
    }

    /// Announce a dynamic array's length before streaming its elements
    pub async fn send_struct_impl_array(&mut self, size: u8) -> SessionResult<(), E::Error> {
        self.require(
            "send_struct_impl_array",
            &[SessionPhase::ImplementingStructs],
        )?;

        let result =
            <Eip712App as Eip712StructImpl<E>>::send_struct_impl_array(self.transport, size).await;
        self.finish(ProtocolPhase::Implementation, result)
    }

    /// Stream one leaf field value, chunked as needed
    pub async fn send_struct_impl_field(&mut self, value: &[u8]) -> SessionResult<(), E::Error> {
        self.require(
            "send_struct_impl_field",
            &[SessionPhase::ImplementingStructs],
        )?;

        let result =
            <Eip712App as Eip712StructImpl<E>>::send_struct_impl_field(self.transport, value)
                .await;
        self.finish(ProtocolPhase::Implementation, result)
    }

    /// Switch filtering on. One-shot: a second activation in the same
    /// session is a sequencing violation.
    pub async fn activate_filtering(&mut self) -> SessionResult<(), E::Error> {
        self.require(
            "activate_filtering",
            &[
                SessionPhase::DefiningStructs,
                SessionPhase::ImplementingStructs,
            ],
        )?;
        if self.filtering_active {
            return Err(SessionError::OutOfOrder {
                operation: "activate_filtering",
                phase: self.phase,
            });
        }

        let result = <Eip712App as Eip712Filtering<E>>::activate_filtering(self.transport).await;
        self.finish(ProtocolPhase::Filtering, result)?;
        self.filtering_active = true;
        Ok(())
    }

    /// Announce the contract's display name (filtering must be active)
    pub async fn send_contract_name_filter(
        &mut self,
        entry: &FilterEntry,
    ) -> SessionResult<(), E::Error> {
        self.require(
            "send_contract_name_filter",
            &[
                SessionPhase::DefiningStructs,
                SessionPhase::ImplementingStructs,
            ],
        )?;
        if !self.filtering_active {
            return Err(SessionError::FilteringNotActivated {
                operation: "send_contract_name_filter",
            });
        }

        let result =
            <Eip712App as Eip712Filtering<E>>::send_contract_name_filter(self.transport, entry)
                .await;
        self.finish(ProtocolPhase::Filtering, result)
    }

    /// Announce one field's display name (filtering must be active)
    pub async fn send_field_name_filter(
        &mut self,
        entry: &FilterEntry,
    ) -> SessionResult<(), E::Error> {
        self.require(
            "send_field_name_filter",
            &[
                SessionPhase::DefiningStructs,
                SessionPhase::ImplementingStructs,
            ],
        )?;
        if !self.filtering_active {
            return Err(SessionError::FilteringNotActivated {
                operation: "send_field_name_filter",
            });
        }

        let result =
            <Eip712App as Eip712Filtering<E>>::send_field_name_filter(self.transport, entry).await;
        self.finish(ProtocolPhase::Filtering, result)
    }

    /// Terminate the flow: the device derives both hashes from the
    /// streamed implementation and signs
    pub async fn sign_new(&mut self, path: &BipPath) -> SessionResult<Signature, E::Error> {
        self.require("sign_new", &[SessionPhase::ImplementingStructs])?;

        let result = <Eip712App as Eip712Sign<E>>::sign_new(self.transport, path).await;
        let signature = self.finish(ProtocolPhase::Signing, result)?;
        self.phase = SessionPhase::Done;
        Ok(signature)
    }

    /// Sign with precomputed hashes. Valid only from Idle: a legacy flow
    /// never streams definitions or implementations.
    pub async fn sign_legacy(
        &mut self,
        params: &SignLegacyParams,
    ) -> SessionResult<Signature, E::Error> {
        self.require("sign_legacy", &[SessionPhase::Idle])?;

        let result = <Eip712App as Eip712Sign<E>>::sign_legacy(self.transport, params).await;
        let signature = self.finish(ProtocolPhase::Signing, result)?;
        self.phase = SessionPhase::Done;
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instructions::ins;
    use crate::types::{FieldType, FieldValue};
    use hwsigner_transport::MockExchange;

    fn signature_answer() -> Vec<u8> {
        let mut answer = vec![0x1B];
        answer.extend(vec![0x11; 32]);
        answer.extend(vec![0x22; 32]);
        answer.extend([0x90, 0x00]);
        answer
    }

    fn domain_definition() -> StructDefinition {
        StructDefinition::new("EIP712Domain")
            .with_field(FieldDefinition::new(FieldType::String, "name"))
            .with_field(FieldDefinition::new(FieldType::Uint(32), "chainId"))
    }

    #[tokio::test]
    async fn full_flow_reaches_done_and_orders_frames() {
        let transport = MockExchange::new();
        let mut session = Eip712Session::new(&transport);

        session.send_struct_definition(&domain_definition()).await.unwrap();
        session
            .send_struct_definition(
                &StructDefinition::new("Permit")
                    .with_field(FieldDefinition::new(FieldType::Address, "owner"))
                    .with_field(FieldDefinition::new(FieldType::Uint(32), "value")),
            )
            .await
            .unwrap();

        session.activate_filtering().await.unwrap();

        session.send_struct_impl_root("EIP712Domain").await.unwrap();
        session
            .send_struct_impl_field(&FieldValue::from_string("USD Coin").value)
            .await
            .unwrap();
        session
            .send_contract_name_filter(&FilterEntry::new("USD Coin", vec![0x30, 0x44]))
            .await
            .unwrap();
        session
            .send_field_name_filter(&FilterEntry::new("Spender", vec![0x30, 0x45]))
            .await
            .unwrap();

        transport.push_answer(signature_answer());
        let signature = session
            .sign_new(&BipPath::ethereum_standard(0, 0))
            .await
            .unwrap();

        assert_eq!(signature.v, 0x1B);
        assert_eq!(session.phase(), SessionPhase::Done);

        let frames = transport.recorded_frames();
        assert_eq!(frames.first().unwrap()[1], ins::EIP712_SEND_STRUCT_DEFINITION);
        assert_eq!(frames.last().unwrap()[1], ins::SIGN_EIP712);

        // Every definition frame precedes every implementation frame
        let last_def = frames
            .iter()
            .rposition(|f| f[1] == ins::EIP712_SEND_STRUCT_DEFINITION)
            .unwrap();
        let first_impl = frames
            .iter()
            .position(|f| f[1] == ins::EIP712_SEND_STRUCT_IMPLEMENTATION)
            .unwrap();
        assert!(last_def < first_impl);
    }

    #[tokio::test]
    async fn legacy_flow_emits_a_single_sign_frame() {
        let transport = MockExchange::new();
        transport.push_answer(signature_answer());

        let mut session = Eip712Session::new(&transport);
        let params = SignLegacyParams::new(
            BipPath::ethereum_standard(0, 0),
            [0xAA; 32],
            [0xBB; 32],
        );
        let signature = session.sign_legacy(&params).await.unwrap();
        assert_eq!(signature.r, vec![0x11; 32]);
        assert_eq!(session.phase(), SessionPhase::Done);

        let frames = transport.recorded_frames();
        assert_eq!(frames.len(), 1);
        let frame = &frames[0];
        assert_eq!(frame[1], ins::SIGN_EIP712);
        assert_eq!(frame[3], 0x00); // legacy p2
        // path (21 bytes) + both hashes
        assert_eq!(frame[4] as usize, 21 + 64);
        assert!(frames.iter().all(|f| {
            f[1] != ins::EIP712_SEND_STRUCT_DEFINITION
                && f[1] != ins::EIP712_SEND_STRUCT_IMPLEMENTATION
        }));
    }

    #[tokio::test]
    async fn long_value_is_chunked_with_partial_then_complete() {
        let transport = MockExchange::new();
        let mut session = Eip712Session::new(&transport);

        session.send_struct_definition(&domain_definition()).await.unwrap();
        session.send_struct_impl_root("EIP712Domain").await.unwrap();

        let before = transport.recorded_frames().len();
        session.send_struct_impl_field(&vec![0x5A; 300]).await.unwrap();

        let frames = transport.recorded_frames();
        let value_frames = &frames[before..];
        assert_eq!(value_frames.len(), 2);
        assert_eq!(value_frames[0][2], 0x01); // partial
        assert_eq!(value_frames[0][4], 255);
        assert_eq!(value_frames[1][2], 0x00); // complete
        assert_eq!(value_frames[1][4], (302 - 255) as u8);
    }

    #[tokio::test]
    async fn filtering_before_activation_is_refused() {
        let transport = MockExchange::new();
        let mut session = Eip712Session::new(&transport);

        session.send_struct_definition(&domain_definition()).await.unwrap();
        let frames_before = transport.recorded_frames().len();

        let err = session
            .send_field_name_filter(&FilterEntry::new("Spender", vec![]))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SessionError::FilteringNotActivated {
                operation: "send_field_name_filter"
            }
        );
        // Nothing was transmitted
        assert_eq!(transport.recorded_frames().len(), frames_before);
    }

    #[tokio::test]
    async fn activation_is_one_shot() {
        let transport = MockExchange::new();
        let mut session = Eip712Session::new(&transport);

        session.send_struct_definition(&domain_definition()).await.unwrap();
        session.activate_filtering().await.unwrap();
        assert!(session.filtering_active());
        assert!(matches!(
            session.activate_filtering().await.unwrap_err(),
            SessionError::OutOfOrder { .. }
        ));
    }

    #[tokio::test]
    async fn out_of_order_operations_are_refused() {
        let transport = MockExchange::new();
        let mut session = Eip712Session::new(&transport);

        // Values before any definition
        assert!(matches!(
            session.send_struct_impl_field(&[0x01]).await.unwrap_err(),
            SessionError::OutOfOrder { .. }
        ));

        // Signing (new mode) before the implementation phase
        assert!(matches!(
            session
                .sign_new(&BipPath::ethereum_standard(0, 0))
                .await
                .unwrap_err(),
            SessionError::OutOfOrder { .. }
        ));

        // Legacy signing once definitions have started
        session.send_struct_definition(&domain_definition()).await.unwrap();
        let params = SignLegacyParams::new(
            BipPath::ethereum_standard(0, 0),
            [0u8; 32],
            [0u8; 32],
        );
        assert!(matches!(
            session.sign_legacy(&params).await.unwrap_err(),
            SessionError::OutOfOrder {
                operation: "sign_legacy",
                phase: SessionPhase::DefiningStructs,
            }
        ));
    }

    #[tokio::test]
    async fn rejection_fails_the_session() {
        let transport = MockExchange::new();
        transport.push_status(0x6985);

        let mut session = Eip712Session::new(&transport);
        let err = session.send_struct_def_name("EIP712Domain").await.unwrap_err();
        match err {
            SessionError::Phase { phase, source } => {
                assert_eq!(phase, ProtocolPhase::Definition);
                assert!(source.is_device_rejection());
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(session.phase(), SessionPhase::Failed);

        // The session is spent
        assert!(matches!(
            session.send_struct_def_name("Permit").await.unwrap_err(),
            SessionError::OutOfOrder {
                phase: SessionPhase::Failed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn struct_field_status_is_returned_raw() {
        let transport = MockExchange::new();
        let mut session = Eip712Session::new(&transport);
        session.send_struct_def_name("EIP712Domain").await.unwrap();

        let word = session
            .send_struct_def_field(&FieldDefinition::new(FieldType::String, "name"))
            .await
            .unwrap();
        assert_eq!(word, 0x9000);

        // A non-success word is handed back, not mapped to an error, but
        // the session still refuses to continue afterwards.
        transport.push_status(0x6A80);
        let word = session
            .send_struct_def_field(&FieldDefinition::new(FieldType::Bool, "flag"))
            .await
            .unwrap();
        assert_eq!(word, 0x6A80);
        assert_eq!(session.phase(), SessionPhase::Failed);
    }

    #[tokio::test]
    async fn transport_failure_fails_the_session() {
        let transport = MockExchange::new();
        let mut session = Eip712Session::new(&transport);
        session.send_struct_definition(&domain_definition()).await.unwrap();

        transport.fail_next_exchange();
        let err = session.send_struct_impl_root("EIP712Domain").await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Phase {
                phase: ProtocolPhase::Implementation,
                ..
            }
        ));
        assert_eq!(session.phase(), SessionPhase::Failed);
    }

    #[tokio::test]
    async fn contract_violations_leave_the_wire_untouched() {
        let transport = MockExchange::new();
        let mut session = Eip712Session::new(&transport);

        session.send_struct_def_name("Mail").await.unwrap();
        let frames_before = transport.recorded_frames().len();

        let err = session
            .send_struct_def_field(&FieldDefinition::new(
                FieldType::Custom(String::new()),
                "from",
            ))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Phase {
                phase: ProtocolPhase::Definition,
                source: Eip712Error::InvalidFieldDefinition(_),
            }
        ));
        assert_eq!(transport.recorded_frames().len(), frames_before);
    }
}
