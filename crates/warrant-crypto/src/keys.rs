use ed25519_dalek::{SigningKey, VerifyingKey};
use zeroize::Zeroize;

use crate::error::CryptoError;
use crate::hashing::derive_key;

const KEY_DERIVATION_CONTEXT: &str = "warrant 2024 identity key derivation v1";

/// Multicodec prefix of an Ed25519 public key.
pub const ED25519_MULTICODEC: [u8; 2] = [0xed, 0x01];

/// Ed25519 key pair for signing operations.
/// The underlying signing key is zeroized on drop by ed25519-dalek.
pub struct KeyPair {
    signing_key: SigningKey,
}

impl KeyPair {
    /// Create a key pair from a 32-byte seed.
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        let signing_key = SigningKey::from_bytes(seed);
        Self { signing_key }
    }

    /// Deterministically derive a key pair from a master seed and a label.
    ///
    /// Same master seed and label always yield the same key pair.
    pub fn derive(master_seed: &[u8; 32], label: &str) -> Self {
        let mut material = Vec::with_capacity(32 + label.len());
        material.extend_from_slice(master_seed);
        material.extend_from_slice(label.as_bytes());
        let mut seed = derive_key(KEY_DERIVATION_CONTEXT, &material);
        material.zeroize();
        let kp = Self::from_seed(&seed);
        seed.zeroize();
        kp
    }

    /// Create a key pair from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        if bytes.len() != 32 {
            return Err(CryptoError::InvalidKeyLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut seed = [0u8; 32];
        seed.copy_from_slice(bytes);
        let kp = Self::from_seed(&seed);
        seed.zeroize();
        Ok(kp)
    }

    /// Get the public key.
    pub fn public_key(&self) -> PublicKey {
        PublicKey {
            verifying_key: self.signing_key.verifying_key(),
        }
    }

    pub(crate) fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key().to_hex())
            .finish_non_exhaustive()
    }
}

/// Ed25519 public key for verification operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey {
    verifying_key: VerifyingKey,
}

impl PublicKey {
    /// Create from raw bytes (32 bytes).
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        let bytes_arr: [u8; 32] = bytes.try_into().map_err(|_| CryptoError::InvalidKeyLength {
            expected: 32,
            actual: bytes.len(),
        })?;
        let verifying_key = VerifyingKey::from_bytes(&bytes_arr)
            .map_err(|e| CryptoError::InvalidInput(format!("invalid public key: {}", e)))?;
        Ok(Self { verifying_key })
    }

    /// Get the raw bytes (32 bytes).
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.verifying_key.as_bytes()
    }

    /// Encode as hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.as_bytes())
    }

    /// Multibase form of the multicodec-tagged key: `z<base58btc(0xed 0x01 || key)>`.
    pub fn to_multibase(&self) -> String {
        let mut bytes = Vec::with_capacity(ED25519_MULTICODEC.len() + 32);
        bytes.extend_from_slice(&ED25519_MULTICODEC);
        bytes.extend_from_slice(self.as_bytes());
        format!("z{}", bs58::encode(bytes).into_string())
    }

    /// Inverse of [`to_multibase`](Self::to_multibase).
    pub fn from_multibase(encoded: &str) -> Result<Self, CryptoError> {
        let body = encoded
            .strip_prefix('z')
            .ok_or_else(|| CryptoError::InvalidInput(format!("{} is not base58btc", encoded)))?;
        let bytes = bs58::decode(body)
            .into_vec()
            .map_err(|e| CryptoError::InvalidInput(format!("invalid base58: {}", e)))?;
        match bytes.strip_prefix(&ED25519_MULTICODEC[..]) {
            Some(key) => Self::from_bytes(key),
            None => Err(CryptoError::UnsupportedCodec),
        }
    }

    pub(crate) fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}
