/// Cryptographic operation errors.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    #[error("invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("signature verification failed")]
    SignatureVerificationFailed,

    #[error("multicodec prefix is not Ed25519")]
    UnsupportedCodec,

    #[error("invalid input: {0}")]
    InvalidInput(String),
}
