//! W3C Verifiable Credential and Presentation data model.
//!
//! Fields the model does not name are kept in `extra` so a credential
//! survives a deserialize/serialize round trip unchanged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use warrant_core::CredentialType;

/// Default JSON-LD context for credentials and presentations.
pub const CREDENTIALS_V1_CONTEXT: &str = "https://www.w3.org/2018/credentials/v1";

/// Proof type attached by the `jwt` proof format.
pub const JWT_PROOF_TYPE: &str = "JwtProof2020";

/// Type tag on every presentation.
pub const PRESENTATION_TYPE: &str = "VerifiablePresentation";

fn default_context() -> Vec<Value> {
    vec![Value::String(CREDENTIALS_V1_CONTEXT.to_string())]
}

fn default_presentation_types() -> Vec<String> {
    vec![PRESENTATION_TYPE.to_string()]
}

/// Accept either a single string or an array of strings.
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => vec![s],
        OneOrMany::Many(v) => v,
    })
}

/// Credential issuer, either a bare DID or an object with an `id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Issuer {
    Did(String),
    Object {
        id: String,
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl Issuer {
    /// The issuer's DID.
    pub fn id(&self) -> &str {
        match self {
            Self::Did(id) => id,
            Self::Object { id, .. } => id,
        }
    }
}

impl From<&str> for Issuer {
    fn from(did: &str) -> Self {
        Self::Object {
            id: did.to_string(),
            extra: Map::new(),
        }
    }
}

/// Proof attached to a credential or presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proof {
    /// Proof type, e.g. `JwtProof2020`.
    #[serde(rename = "type")]
    pub proof_type: String,
    /// Compact JWS for JWT proofs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Proof {
    pub fn jwt(token: String) -> Self {
        Self {
            proof_type: JWT_PROOF_TYPE.to_string(),
            jwt: Some(token),
            extra: Map::new(),
        }
    }
}

/// A W3C Verifiable Credential. Immutable once a proof is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiableCredential {
    #[serde(rename = "@context", default = "default_context")]
    pub context: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", deserialize_with = "one_or_many")]
    pub types: Vec<String>,
    pub issuer: Issuer,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub credential_subject: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VerifiableCredential {
    /// Create an unsigned credential. The base `VerifiableCredential` tag is
    /// always first; `id` and `issuanceDate` are filled in at issuance.
    pub fn new(
        issuer: &str,
        credential_types: &[CredentialType],
        credential_subject: Map<String, Value>,
    ) -> Self {
        let mut types = vec![CredentialType::VerifiableCredential.as_str().to_string()];
        for t in credential_types {
            if *t != CredentialType::VerifiableCredential {
                types.push(t.as_str().to_string());
            }
        }

        Self {
            context: default_context(),
            id: None,
            types,
            issuer: Issuer::from(issuer),
            issuance_date: None,
            credential_subject,
            proof: None,
            extra: Map::new(),
        }
    }

    /// Whether the type set contains `tag`.
    pub fn has_type(&self, tag: &str) -> bool {
        self.types.iter().any(|t| t == tag)
    }

    /// Whether a proof is attached.
    pub fn is_signed(&self) -> bool {
        self.proof.is_some()
    }

    /// The subject's `id`, if any.
    pub fn subject_id(&self) -> Option<&str> {
        self.credential_subject.get("id").and_then(Value::as_str)
    }

    /// A copy of this credential without its proof: the signed payload.
    pub fn without_proof(&self) -> Self {
        Self {
            proof: None,
            ..self.clone()
        }
    }
}

/// A W3C Verifiable Presentation. Verified, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifiablePresentation {
    #[serde(rename = "@context", default = "default_context")]
    pub context: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(
        rename = "type",
        default = "default_presentation_types",
        deserialize_with = "one_or_many"
    )]
    pub types: Vec<String>,
    /// DID of the holder. Empty when the sender omitted it, which fails verification.
    #[serde(default)]
    pub holder: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifiable_credential: Option<Vec<VerifiableCredential>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VerifiablePresentation {
    /// Create an unsigned presentation of `credentials` held by `holder`.
    pub fn new(holder: &str, credentials: Vec<VerifiableCredential>) -> Self {
        Self {
            context: default_context(),
            id: None,
            types: default_presentation_types(),
            holder: holder.to_string(),
            verifiable_credential: Some(credentials),
            proof: None,
            extra: Map::new(),
        }
    }

    /// Embedded credentials, empty when none were supplied.
    pub fn credentials(&self) -> &[VerifiableCredential] {
        self.verifiable_credential.as_deref().unwrap_or_default()
    }

    /// The first embedded credential carrying `tag`.
    pub fn find_credential(&self, tag: &str) -> Option<&VerifiableCredential> {
        self.credentials().iter().find(|c| c.has_type(tag))
    }

    /// A copy of this presentation without its proof: the signed payload.
    pub fn without_proof(&self) -> Self {
        Self {
            proof: None,
            ..self.clone()
        }
    }
}

/// Outcome of verifying a presentation or credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl VerificationResult {
    pub fn ok() -> Self {
        Self {
            verified: true,
            error: None,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            verified: false,
            error: Some(reason.into()),
        }
    }
}

/// Proof formats the identity service can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProofFormat {
    Jwt,
}
