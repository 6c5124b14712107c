//! Warrant Delegation Engine
//!
//! Policy-gated exchange of access delegation credentials:
//! - Ephemeral single-slot credential store
//! - Policy engine and credential registry seams with HTTP clients
//! - Declarative per-role pipeline parameters
//! - The delegation engine itself and sample credential issuance

pub mod attributes;
pub mod context;
pub mod engine;
pub mod error;
pub mod issuer;
pub mod policy;
pub mod registry;
pub mod roles;
pub mod store;

pub use context::IdentityContext;
pub use engine::{DelegationEngine, COMPANY_RESPONSE_TYPE, SERVICE_CHANNEL_TYPE};
pub use error::DelegationError;
pub use issuer::CredentialIssuer;
pub use policy::{OpaPolicyClient, PolicyEngine};
pub use registry::{CredentialRegistry, HttpCredentialRegistry};
pub use roles::{profile, RoleProfile};
pub use store::CredentialStore;
