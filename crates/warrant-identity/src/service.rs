use async_trait::async_trait;

use crate::credentials::{
    ProofFormat, VerifiableCredential, VerifiablePresentation, VerificationResult,
};
use crate::did::{Identifier, KeyType};
use crate::error::IdentityError;
use crate::message::{Message, PackedMessage, PackingMode, UnpackedMessage};

/// Identity and proof operations the delegation engine depends on.
///
/// Failures of the service itself are errors; a presentation that simply
/// does not verify is an `Ok` result with `verified == false`.
#[async_trait]
pub trait IdentityService: Send + Sync {
    /// Return the identifier for `alias`, creating it on first use.
    async fn resolve_identifier(
        &self,
        alias: &str,
        key_type: KeyType,
    ) -> Result<Identifier, IdentityError>;

    /// Check the presentation's proof and every embedded credential's proof.
    async fn verify_presentation(
        &self,
        presentation: &VerifiablePresentation,
    ) -> Result<VerificationResult, IdentityError>;

    /// Sign an unsigned credential as its issuer.
    async fn create_verifiable_credential(
        &self,
        credential: VerifiableCredential,
        proof_format: ProofFormat,
    ) -> Result<VerifiableCredential, IdentityError>;

    /// Sign an unsigned presentation as its holder.
    async fn create_verifiable_presentation(
        &self,
        presentation: VerifiablePresentation,
        proof_format: ProofFormat,
    ) -> Result<VerifiablePresentation, IdentityError>;

    async fn pack_message(
        &self,
        message: &Message,
        packing: PackingMode,
    ) -> Result<PackedMessage, IdentityError>;

    async fn unpack_message(&self, packed: &PackedMessage)
        -> Result<UnpackedMessage, IdentityError>;
}
