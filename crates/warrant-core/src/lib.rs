//! Warrant Core: fundamental types, errors, and the per-request state
//! machine shared by every Warrant crate.

pub mod delegation_state;
pub mod error;
pub mod types;

pub use delegation_state::{DelegationEvent, DelegationState, DelegationStateMachine};
pub use error::CoreError;
pub use types::{CredentialSlot, CredentialType, Did, Role};
