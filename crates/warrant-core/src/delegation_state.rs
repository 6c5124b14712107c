use std::fmt;

use crate::error::CoreError;

/// The states a delegation request passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum DelegationState {
    /// Request accepted by the transport, nothing inspected yet.
    Received,
    /// Presentation or envelope is being verified.
    Verifying,
    /// Waiting on the policy engine's decision.
    PolicyCheck,
    /// Resolving the delegated resource.
    ResourceLookup,
    /// Verification or a collaborator failed. Final state.
    Rejected,
    /// Policy engine denied access. Final state.
    Denied,
    /// The resource does not exist. Final state.
    NotFound,
    /// The response was produced in full. Final state.
    Delivered,
}

impl DelegationState {
    /// Whether this is a final (terminal) state.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::Denied | Self::NotFound | Self::Delivered
        )
    }
}

impl fmt::Display for DelegationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "Received",
            Self::Verifying => "Verifying",
            Self::PolicyCheck => "PolicyCheck",
            Self::ResourceLookup => "ResourceLookup",
            Self::Rejected => "Rejected",
            Self::Denied => "Denied",
            Self::NotFound => "NotFound",
            Self::Delivered => "Delivered",
        };
        f.write_str(name)
    }
}

/// Events that advance a delegation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelegationEvent {
    /// Start verifying an inbound presentation or envelope.
    Verify,
    /// Submit the delegation credential to the policy engine.
    CheckPolicy,
    /// Policy allowed (or no policy gate applies); resolve the resource.
    Lookup,
    /// The response is complete.
    Deliver,
    /// Verification failed or a collaborator could not be reached.
    Reject,
    /// The policy engine returned deny.
    Deny,
    /// The resource is absent.
    Miss,
}

impl DelegationEvent {
    fn name(&self) -> &'static str {
        match self {
            Self::Verify => "Verify",
            Self::CheckPolicy => "CheckPolicy",
            Self::Lookup => "Lookup",
            Self::Deliver => "Deliver",
            Self::Reject => "Reject",
            Self::Deny => "Deny",
            Self::Miss => "Miss",
        }
    }
}

/// Single forward pass through the delegation pipeline.
///
/// Valid transitions:
/// - Received → Verifying (Verify)
/// - Received → PolicyCheck (CheckPolicy)
/// - Verifying → PolicyCheck (CheckPolicy)
/// - Verifying → ResourceLookup (Lookup)
/// - PolicyCheck → ResourceLookup (Lookup)
/// - PolicyCheck → Denied (Deny)
/// - ResourceLookup → Delivered (Deliver)
/// - ResourceLookup → NotFound (Miss)
/// - any non-final state → Rejected (Reject)
///
/// There is no edge back to an earlier state; a failed request is never retried.
pub struct DelegationStateMachine;

impl DelegationStateMachine {
    /// Attempt a state transition based on an event.
    pub fn transition(
        current: DelegationState,
        event: DelegationEvent,
    ) -> Result<DelegationState, CoreError> {
        use DelegationEvent as E;
        use DelegationState as S;

        let new_state = match (current, event) {
            (S::Received, E::Verify) => S::Verifying,
            (S::Received, E::CheckPolicy) => S::PolicyCheck,

            (S::Verifying, E::CheckPolicy) => S::PolicyCheck,
            (S::Verifying, E::Lookup) => S::ResourceLookup,

            (S::PolicyCheck, E::Lookup) => S::ResourceLookup,
            (S::PolicyCheck, E::Deny) => S::Denied,

            (S::ResourceLookup, E::Deliver) => S::Delivered,
            (S::ResourceLookup, E::Miss) => S::NotFound,

            (s, E::Reject) if !s.is_final() => S::Rejected,

            _ => {
                return Err(CoreError::InvalidStateTransition {
                    from: current,
                    event: event.name(),
                })
            }
        };

        tracing::debug!(
            from = %current,
            to = %new_state,
            event = ?event,
            "delegation state transition"
        );

        Ok(new_state)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: DelegationState, event: DelegationEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
