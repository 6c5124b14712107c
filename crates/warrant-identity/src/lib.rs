//! Warrant Identity Layer
//!
//! Identity and proof primitives used by the delegation engine:
//! - `did:key` identifiers derived from a master seed
//! - W3C Verifiable Credentials and Presentations with `JwtProof2020` proofs
//! - Compact EdDSA JWS
//! - Message envelopes packed as plain JSON or JWS

pub mod credentials;
pub mod did;
pub mod error;
pub mod jws;
pub mod local;
pub mod message;
pub mod service;

pub use credentials::{
    Issuer, Proof, ProofFormat, VerifiableCredential, VerifiablePresentation, VerificationResult,
};
pub use did::{DidManager, Identifier, KeyType};
pub use error::IdentityError;
pub use local::LocalIdentityService;
pub use message::{Message, PackedMessage, PackingMode, UnpackMetadata, UnpackedMessage};
pub use service::IdentityService;
