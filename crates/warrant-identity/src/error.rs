/// Identity & proof service errors.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("unsupported key type: {0}")]
    UnsupportedKeyType(String),

    #[error("unsupported DID method: {0}")]
    UnsupportedDidMethod(String),

    #[error("invalid DID: {0}")]
    InvalidDid(String),

    #[error("no signing key managed for {0}")]
    UnknownSigner(String),

    #[error("malformed JWS: {0}")]
    MalformedJws(String),

    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    #[error("signature does not match {0}")]
    BadSignature(String),

    #[error("proof missing or unsupported: {0}")]
    UnsupportedProof(String),

    #[error("credential payload does not match its proof")]
    PayloadMismatch,

    #[error("crypto error: {0}")]
    Crypto(#[from] warrant_crypto::CryptoError),

    #[error("core error: {0}")]
    Core(#[from] warrant_core::CoreError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
