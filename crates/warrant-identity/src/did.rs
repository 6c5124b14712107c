use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use warrant_core::Did;
use warrant_crypto::{CryptoError, KeyPair, PublicKey};

use crate::error::IdentityError;

pub const DID_KEY_PROVIDER: &str = "did:key";

/// Key types an identifier can be created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    Ed25519,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ed25519 => "Ed25519",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for KeyType {
    type Err = IdentityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("ed25519") {
            Ok(Self::Ed25519)
        } else {
            Err(IdentityError::UnsupportedKeyType(s.to_string()))
        }
    }
}

/// A managed DID together with the alias it was created under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    pub did: Did,
    pub alias: String,
    pub provider: String,
    pub key_type: KeyType,
}

/// Encode an Ed25519 public key as `did:key:z<base58btc(multicodec || key)>`.
pub fn did_key_from_public_key(public_key: &PublicKey) -> String {
    format!("did:key:{}", public_key.to_multibase())
}

/// Recover the Ed25519 public key from a `did:key` DID. A `#fragment` is ignored.
pub fn public_key_from_did(did: &str) -> Result<PublicKey, IdentityError> {
    let did = did.split('#').next().unwrap_or_default();
    let parsed = Did::new(did)?;
    if parsed.method() != "key" {
        return Err(IdentityError::UnsupportedDidMethod(parsed.method().to_string()));
    }

    PublicKey::from_multibase(parsed.identifier()).map_err(|e| match e {
        CryptoError::UnsupportedCodec => {
            IdentityError::UnsupportedKeyType(format!("{} does not encode an Ed25519 key", did))
        }
        other => IdentityError::InvalidDid(format!("{}: {}", did, other)),
    })
}

/// Creates and remembers `did:key` identifiers.
///
/// Keys are derived from a master seed and the alias, so the same alias maps
/// to the same DID for the lifetime of the seed.
pub struct DidManager {
    master_seed: Zeroizing<[u8; 32]>,
    /// alias -> identifier
    by_alias: DashMap<String, Identifier>,
    /// DID URI -> signing key
    keys: DashMap<String, Arc<KeyPair>>,
}

impl DidManager {
    pub fn new(master_seed: [u8; 32]) -> Self {
        Self {
            master_seed: Zeroizing::new(master_seed),
            by_alias: DashMap::new(),
            keys: DashMap::new(),
        }
    }

    /// Return the identifier for `alias`, creating it on first use.
    pub fn get_or_create(&self, alias: &str, key_type: KeyType) -> Identifier {
        if let Some(existing) = self.by_alias.get(alias) {
            return existing.clone();
        }

        let keypair = KeyPair::derive(&self.master_seed, alias);
        let uri = did_key_from_public_key(&keypair.public_key());
        let did = Did::from_parts("key", uri.trim_start_matches("did:key:"));
        let identifier = Identifier {
            did,
            alias: alias.to_string(),
            provider: DID_KEY_PROVIDER.to_string(),
            key_type,
        };

        let entry = self
            .by_alias
            .entry(alias.to_string())
            .or_insert_with(|| identifier.clone());
        self.keys
            .entry(entry.did.uri().to_string())
            .or_insert_with(|| Arc::new(keypair));

        tracing::info!(alias = %alias, did = %entry.did, "identifier created");
        entry.clone()
    }

    /// Signing key for a managed DID.
    pub fn keypair(&self, did: &str) -> Result<Arc<KeyPair>, IdentityError> {
        self.keys
            .get(did)
            .map(|k| Arc::clone(&k))
            .ok_or_else(|| IdentityError::UnknownSigner(did.to_string()))
    }

    pub fn count(&self) -> usize {
        self.by_alias.len()
    }
}
