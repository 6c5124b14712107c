use crate::delegation_state::DelegationState;

/// Core protocol errors.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("invalid state transition from {from} on {event}")]
    InvalidStateTransition {
        from: DelegationState,
        event: &'static str,
    },

    #[error("invalid DID format: {0}")]
    InvalidDid(String),

    #[error("unknown role: {0}")]
    UnknownRole(String),

    #[error("unknown credential slot: {0}")]
    UnknownSlot(String),
}
