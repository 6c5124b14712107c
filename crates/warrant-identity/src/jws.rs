//! Compact EdDSA JWS: `b64url(header).b64url(payload).b64url(signature)`.

use serde::{Deserialize, Serialize};

use warrant_crypto::{b64url_decode, b64url_encode, sign, verify, KeyPair, Signature};

use crate::did::public_key_from_did;
use crate::error::IdentityError;

pub const ALG_EDDSA: &str = "EdDSA";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwsHeader {
    pub alg: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
    /// Verification method, `did#fragment`.
    pub kid: String,
}

impl JwsHeader {
    /// The signer's DID, without the fragment.
    pub fn signer_did(&self) -> &str {
        self.kid.split('#').next().unwrap_or_default()
    }
}

/// A decoded but not yet verified JWS.
#[derive(Debug, Clone)]
pub struct DecodedJws {
    pub header: JwsHeader,
    pub payload: Vec<u8>,
    signing_input: String,
    signature: Signature,
}

impl DecodedJws {
    /// Check the signature against the key encoded in the header's DID.
    pub fn verify(&self) -> Result<(), IdentityError> {
        if self.header.alg != ALG_EDDSA {
            return Err(IdentityError::MalformedJws(format!(
                "unsupported alg {}",
                self.header.alg
            )));
        }
        let public_key = public_key_from_did(self.header.signer_did())?;
        verify(self.signing_input.as_bytes(), &self.signature, &public_key)
            .map_err(|_| IdentityError::BadSignature(self.header.kid.clone()))
    }

    /// Payload parsed as JSON.
    pub fn payload_json(&self) -> Result<serde_json::Value, IdentityError> {
        Ok(serde_json::from_slice(&self.payload)?)
    }
}

/// Sign `payload` as `did`, returning the compact serialization.
pub fn sign_compact(
    payload: &[u8],
    did: &str,
    keypair: &KeyPair,
    typ: Option<&str>,
) -> Result<String, IdentityError> {
    let fragment = did.strip_prefix("did:key:").unwrap_or(did);
    let header = JwsHeader {
        alg: ALG_EDDSA.to_string(),
        typ: typ.map(str::to_string),
        kid: format!("{}#{}", did, fragment),
    };
    let signing_input = format!(
        "{}.{}",
        b64url_encode(serde_json::to_vec(&header)?),
        b64url_encode(payload)
    );
    let signature = sign(signing_input.as_bytes(), keypair);
    Ok(format!("{}.{}", signing_input, signature.to_b64url()))
}

/// Split and decode a compact JWS without verifying it.
pub fn decode_compact(token: &str) -> Result<DecodedJws, IdentityError> {
    let mut parts = token.split('.');
    let (Some(header), Some(payload), Some(signature), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(IdentityError::MalformedJws(
            "expected three dot-separated segments".into(),
        ));
    };

    let header_bytes =
        b64url_decode(header).map_err(|e| IdentityError::MalformedJws(e.to_string()))?;
    let header: JwsHeader = serde_json::from_slice(&header_bytes)
        .map_err(|e| IdentityError::MalformedJws(format!("header: {}", e)))?;
    let payload_bytes =
        b64url_decode(payload).map_err(|e| IdentityError::MalformedJws(e.to_string()))?;
    let signature = Signature::from_b64url(signature)
        .map_err(|e| IdentityError::MalformedJws(e.to_string()))?;

    let signing_input = token
        .rsplit_once('.')
        .map(|(input, _)| input.to_string())
        .unwrap_or_default();

    Ok(DecodedJws {
        header,
        payload: payload_bytes,
        signing_input,
        signature,
    })
}
