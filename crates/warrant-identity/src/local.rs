use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::credentials::{
    Proof, ProofFormat, VerifiableCredential, VerifiablePresentation, VerificationResult,
    JWT_PROOF_TYPE,
};
use crate::did::{DidManager, Identifier, KeyType};
use crate::error::IdentityError;
use crate::jws::{decode_compact, sign_compact};
use crate::message::{Message, PackedMessage, PackingMode, UnpackMetadata, UnpackedMessage};
use crate::service::IdentityService;

const JWT_TYP: &str = "JWT";
const SIGNED_MESSAGE_TYP: &str = "application/didcomm-signed+json";

/// In-process identity service: `did:key` identifiers, `JwtProof2020`
/// proofs and JWS envelopes, all Ed25519.
///
/// Any `did:key` can be verified. Signing is limited to identifiers this
/// service created.
pub struct LocalIdentityService {
    dids: DidManager,
}

impl LocalIdentityService {
    /// Service whose keys are derived from `master_seed`.
    pub fn new(master_seed: [u8; 32]) -> Self {
        Self {
            dids: DidManager::new(master_seed),
        }
    }

    /// Service with a random seed. Identifiers change on every start.
    pub fn ephemeral() -> Self {
        Self::new(rand::random::<[u8; 32]>())
    }

    fn sign_json<T: serde::Serialize>(
        &self,
        payload: &T,
        signer: &str,
        typ: &str,
    ) -> Result<String, IdentityError> {
        let keypair = self.dids.keypair(signer)?;
        let bytes = serde_json::to_vec(payload)?;
        sign_compact(&bytes, signer, &keypair, Some(typ))
    }
}

/// Verify a JWT proof over `unsigned`, produced by `expected_signer`.
fn verify_jwt_proof<T: serde::Serialize>(
    proof: Option<&Proof>,
    unsigned: &T,
    expected_signer: &str,
) -> Result<(), IdentityError> {
    let proof = proof.ok_or_else(|| IdentityError::UnsupportedProof("no proof".into()))?;
    if proof.proof_type != JWT_PROOF_TYPE {
        return Err(IdentityError::UnsupportedProof(proof.proof_type.clone()));
    }
    let token = proof
        .jwt
        .as_deref()
        .ok_or_else(|| IdentityError::UnsupportedProof("proof has no jwt".into()))?;

    let decoded = decode_compact(token)?;
    if decoded.header.signer_did() != expected_signer {
        return Err(IdentityError::BadSignature(expected_signer.to_string()));
    }
    decoded.verify()?;

    if decoded.payload_json()? != serde_json::to_value(unsigned)? {
        return Err(IdentityError::PayloadMismatch);
    }
    Ok(())
}

fn verify_credential(credential: &VerifiableCredential) -> Result<(), IdentityError> {
    verify_jwt_proof(
        credential.proof.as_ref(),
        &credential.without_proof(),
        credential.issuer.id(),
    )
}

fn check_presentation(presentation: &VerifiablePresentation) -> Result<(), IdentityError> {
    if presentation.holder.is_empty() {
        return Err(IdentityError::InvalidDid("presentation has no holder".into()));
    }
    verify_jwt_proof(
        presentation.proof.as_ref(),
        &presentation.without_proof(),
        &presentation.holder,
    )?;
    for credential in presentation.credentials() {
        verify_credential(credential)?;
    }
    Ok(())
}

#[async_trait]
impl IdentityService for LocalIdentityService {
    async fn resolve_identifier(
        &self,
        alias: &str,
        key_type: KeyType,
    ) -> Result<Identifier, IdentityError> {
        Ok(self.dids.get_or_create(alias, key_type))
    }

    async fn verify_presentation(
        &self,
        presentation: &VerifiablePresentation,
    ) -> Result<VerificationResult, IdentityError> {
        Ok(match check_presentation(presentation) {
            Ok(()) => VerificationResult::ok(),
            Err(e) => {
                tracing::debug!(holder = %presentation.holder, error = %e, "presentation rejected");
                VerificationResult::failed(e.to_string())
            }
        })
    }

    async fn create_verifiable_credential(
        &self,
        mut credential: VerifiableCredential,
        proof_format: ProofFormat,
    ) -> Result<VerifiableCredential, IdentityError> {
        match proof_format {
            ProofFormat::Jwt => {}
        }
        if credential.id.is_none() {
            credential.id = Some(format!("urn:uuid:{}", Uuid::now_v7()));
        }
        if credential.issuance_date.is_none() {
            credential.issuance_date = Some(Utc::now());
        }
        credential.proof = None;

        let issuer = credential.issuer.id().to_string();
        let token = self.sign_json(&credential, &issuer, JWT_TYP)?;
        credential.proof = Some(Proof::jwt(token));

        tracing::info!(
            issuer = %issuer,
            credential_id = credential.id.as_deref().unwrap_or_default(),
            "credential issued"
        );
        Ok(credential)
    }

    async fn create_verifiable_presentation(
        &self,
        mut presentation: VerifiablePresentation,
        proof_format: ProofFormat,
    ) -> Result<VerifiablePresentation, IdentityError> {
        match proof_format {
            ProofFormat::Jwt => {}
        }
        if presentation.id.is_none() {
            presentation.id = Some(format!("urn:uuid:{}", Uuid::now_v7()));
        }
        presentation.proof = None;

        let holder = presentation.holder.clone();
        let token = self.sign_json(&presentation, &holder, JWT_TYP)?;
        presentation.proof = Some(Proof::jwt(token));
        Ok(presentation)
    }

    async fn pack_message(
        &self,
        message: &Message,
        packing: PackingMode,
    ) -> Result<PackedMessage, IdentityError> {
        let packed = match packing {
            PackingMode::None => serde_json::to_string(message)?,
            PackingMode::Jws => self.sign_json(message, &message.from, SIGNED_MESSAGE_TYP)?,
        };
        Ok(PackedMessage { message: packed })
    }

    async fn unpack_message(
        &self,
        packed: &PackedMessage,
    ) -> Result<UnpackedMessage, IdentityError> {
        let raw = packed.message.trim();

        if raw.starts_with('{') {
            let message: Message = serde_json::from_str(raw)
                .map_err(|e| IdentityError::MalformedEnvelope(e.to_string()))?;
            return Ok(UnpackedMessage {
                message,
                metadata: UnpackMetadata {
                    packing: PackingMode::None,
                },
            });
        }

        let decoded = decode_compact(raw)?;
        decoded.verify()?;
        let message: Message = serde_json::from_slice(&decoded.payload)
            .map_err(|e| IdentityError::MalformedEnvelope(e.to_string()))?;
        if message.from != decoded.header.signer_did() {
            return Err(IdentityError::BadSignature(message.from));
        }

        Ok(UnpackedMessage {
            message,
            metadata: UnpackMetadata {
                packing: PackingMode::Jws,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map, Value};
    use warrant_core::CredentialType;

    async fn issued(
        svc: &LocalIdentityService,
        issuer: &Identifier,
        subject: Value,
    ) -> VerifiableCredential {
        let Value::Object(subject) = subject else {
            panic!("subject must be an object");
        };
        let vc = VerifiableCredential::new(issuer.did.uri(), &[CredentialType::Employee], subject);
        svc.create_verifiable_credential(vc, ProofFormat::Jwt)
            .await
            .unwrap()
    }

    async fn presented(
        svc: &LocalIdentityService,
        holder: &Identifier,
        credentials: Vec<VerifiableCredential>,
    ) -> VerifiablePresentation {
        let vp = VerifiablePresentation::new(holder.did.uri(), credentials);
        svc.create_verifiable_presentation(vp, ProofFormat::Jwt)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_issue_fills_id_and_date() {
        let svc = LocalIdentityService::new([1u8; 32]);
        let company = svc.resolve_identifier("company", KeyType::Ed25519).await.unwrap();
        let vc = issued(&svc, &company, json!({"id": "did:key:zHolder"})).await;
        assert!(vc.id.as_deref().unwrap().starts_with("urn:uuid:"));
        assert!(vc.issuance_date.is_some());
        assert_eq!(vc.proof.as_ref().unwrap().proof_type, JWT_PROOF_TYPE);
    }

    #[tokio::test]
    async fn test_identical_subjects_get_distinct_ids() {
        let svc = LocalIdentityService::new([1u8; 32]);
        let company = svc.resolve_identifier("company", KeyType::Ed25519).await.unwrap();
        let a = issued(&svc, &company, json!({"x": 1})).await;
        let b = issued(&svc, &company, json!({"x": 1})).await;
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_presentation_verifies_across_services() {
        let issuer_svc = LocalIdentityService::new([1u8; 32]);
        let holder_svc = LocalIdentityService::new([2u8; 32]);
        let verifier = LocalIdentityService::ephemeral();

        let company = issuer_svc
            .resolve_identifier("company", KeyType::Ed25519)
            .await
            .unwrap();
        let holder = holder_svc
            .resolve_identifier("employee", KeyType::Ed25519)
            .await
            .unwrap();
        let vc = issued(&issuer_svc, &company, json!({"id": holder.did.uri()})).await;
        let vp = presented(&holder_svc, &holder, vec![vc]).await;

        let result = verifier.verify_presentation(&vp).await.unwrap();
        assert!(result.verified, "{:?}", result.error);
    }

    #[tokio::test]
    async fn test_tampered_credential_fails_verification() {
        let svc = LocalIdentityService::new([1u8; 32]);
        let company = svc.resolve_identifier("company", KeyType::Ed25519).await.unwrap();
        let holder = svc.resolve_identifier("employee", KeyType::Ed25519).await.unwrap();
        let mut vc = issued(&svc, &company, json!({"position": "Clerk"})).await;
        vc.credential_subject
            .insert("position".into(), json!("Manager"));
        let vp = presented(&svc, &holder, vec![vc]).await;

        let result = svc.verify_presentation(&vp).await.unwrap();
        assert!(!result.verified);
    }

    #[tokio::test]
    async fn test_tampered_presentation_fails_verification() {
        let svc = LocalIdentityService::new([1u8; 32]);
        let holder = svc.resolve_identifier("employee", KeyType::Ed25519).await.unwrap();
        let mut vp = presented(&svc, &holder, vec![]).await;
        vp.holder = svc
            .resolve_identifier("mallory", KeyType::Ed25519)
            .await
            .unwrap()
            .did
            .to_string();
        assert!(!svc.verify_presentation(&vp).await.unwrap().verified);
    }

    #[tokio::test]
    async fn test_unsigned_or_holderless_presentation_fails() {
        let svc = LocalIdentityService::new([1u8; 32]);
        let unsigned = VerifiablePresentation::new("did:key:z6MkSomeone", vec![]);
        assert!(!svc.verify_presentation(&unsigned).await.unwrap().verified);

        let holderless: VerifiablePresentation =
            serde_json::from_value(json!({"verifiableCredential": []})).unwrap();
        let result = svc.verify_presentation(&holderless).await.unwrap();
        assert!(!result.verified);
        assert!(result.error.is_some());
    }

    #[tokio::test]
    async fn test_cannot_sign_for_foreign_issuer() {
        let svc = LocalIdentityService::new([1u8; 32]);
        let vc = VerifiableCredential::new("did:key:z6MkForeign", &[], Map::new());
        assert!(matches!(
            svc.create_verifiable_credential(vc, ProofFormat::Jwt).await,
            Err(IdentityError::UnknownSigner(_))
        ));
    }

    fn message(from: &Identifier) -> Message {
        Message {
            id: Uuid::now_v7().to_string(),
            message_type: "Company Credential Request".into(),
            from: from.did.to_string(),
            to: vec!["did:key:z6MkCompany".into()],
            body: json!({"hello": "world"}),
            created_time: None,
        }
    }

    #[tokio::test]
    async fn test_pack_unpack_jws() {
        let svc = LocalIdentityService::new([1u8; 32]);
        let sender = svc.resolve_identifier("employee", KeyType::Ed25519).await.unwrap();
        let msg = message(&sender);

        let packed = svc.pack_message(&msg, PackingMode::Jws).await.unwrap();
        assert!(!packed.message.starts_with('{'));

        let other = LocalIdentityService::ephemeral();
        let unpacked = other.unpack_message(&packed).await.unwrap();
        assert_eq!(unpacked.message, msg);
        assert_eq!(unpacked.metadata.packing, PackingMode::Jws);
    }

    #[tokio::test]
    async fn test_pack_unpack_plain() {
        let svc = LocalIdentityService::new([1u8; 32]);
        let sender = svc.resolve_identifier("employee", KeyType::Ed25519).await.unwrap();
        let msg = message(&sender);
        let packed = svc.pack_message(&msg, PackingMode::None).await.unwrap();
        let unpacked = svc.unpack_message(&packed).await.unwrap();
        assert_eq!(unpacked.message, msg);
        assert_eq!(unpacked.metadata.packing, PackingMode::None);
    }

    #[tokio::test]
    async fn test_unpack_garbage_fails() {
        let svc = LocalIdentityService::ephemeral();
        for raw in ["not a message", "{\"id\":", "a.b.c"] {
            let packed = PackedMessage {
                message: raw.to_string(),
            };
            assert!(svc.unpack_message(&packed).await.is_err(), "{}", raw);
        }
    }
}
