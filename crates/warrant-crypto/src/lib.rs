pub mod encoding;
pub mod error;
pub mod hashing;
pub mod keys;
pub mod signing;

pub use encoding::{b64url_decode, b64url_encode};
pub use error::CryptoError;
pub use hashing::{derive_key, Hash};
pub use keys::{KeyPair, PublicKey, ED25519_MULTICODEC};
pub use signing::{sign, verify, Signature};
