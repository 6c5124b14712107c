use dashmap::DashMap;

use warrant_core::CredentialSlot;
use warrant_identity::VerifiableCredential;

/// Ephemeral credential store: one credential per slot, last write wins.
///
/// Each slot is replaced as a whole, so a concurrent reader sees either the
/// previous credential or the new one. Nothing outlives the process.
#[derive(Default)]
pub struct CredentialStore {
    slots: DashMap<CredentialSlot, VerifiableCredential>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The credential currently in `slot`, if any.
    pub fn get(&self, slot: CredentialSlot) -> Option<VerifiableCredential> {
        self.slots.get(&slot).map(|entry| entry.value().clone())
    }

    /// Replace whatever is in `slot`.
    pub fn set(&self, slot: CredentialSlot, credential: VerifiableCredential) {
        tracing::debug!(
            slot = %slot,
            credential_id = credential.id.as_deref().unwrap_or_default(),
            "credential stored"
        );
        self.slots.insert(slot, credential);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
