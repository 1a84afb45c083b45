//! Request phase of a conversation.
//!
//! At most one agent request is in flight. The phase makes that explicit:
//! `submit` moves `Idle -> Pending` and `settle` moves `Pending -> Idle`; any
//! other pairing is rejected, which is how overlapping submissions get ignored.

use thiserror::Error;

use crate::state::MessageId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// Waiting on the reply to the given user message.
    Pending { request: MessageId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PhaseError {
    #[error("request for message {0} is still in flight")]
    Busy(MessageId),
    #[error("no request is in flight")]
    NotPending,
}

impl Phase {
    pub fn is_pending(&self) -> bool {
        matches!(self, Phase::Pending { .. })
    }

    pub fn submit(&self, request: MessageId) -> Result<Phase, PhaseError> {
        match self {
            Phase::Idle => Ok(Phase::Pending { request }),
            Phase::Pending { request: busy } => Err(PhaseError::Busy(*busy)),
        }
    }

    pub fn settle(&self) -> Result<Phase, PhaseError> {
        match self {
            Phase::Pending { .. } => Ok(Phase::Idle),
            Phase::Idle => Err(PhaseError::NotPending),
        }
    }
}
