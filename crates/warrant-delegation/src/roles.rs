//! Per-role parameters of the delegation pipeline.

use warrant_core::{CredentialSlot, CredentialType, Role};

use crate::attributes::{employee_projection, performance_projection, Projection};

/// Where an authorized retrieval finds its resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchStrategy {
    /// A fixed credential store slot.
    Slot(CredentialSlot),
    /// The external registry, keyed by `credentialSubject.credentialId` of the ADC.
    Registry,
}

/// Which identifier signs an issued ADC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssuerChoice {
    Company,
    /// The active delegator, falling back to the company.
    Delegator,
}

/// What the ADC's `credentialId` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceRef {
    /// The credential currently held in a store slot.
    SlotCredential(CredentialSlot),
    /// The source credential itself.
    SourceCredential,
}

/// How a role mints access delegation credentials.
#[derive(Clone, Copy)]
pub struct IssuanceProfile {
    /// Type tag the source credential must carry.
    pub source_type: CredentialType,
    pub projection: Projection,
    pub issuer: IssuerChoice,
    /// Path appended to the service base URL in the ADC's service descriptor.
    pub endpoint_path: &'static str,
    pub resource_ref: ResourceRef,
}

#[derive(Clone, Copy)]
pub struct RoleProfile {
    pub role: Role,
    pub policy_path: &'static str,
    pub fetch: FetchStrategy,
    pub issuance: Option<IssuanceProfile>,
}

static SUPERVISOR: RoleProfile = RoleProfile {
    role: Role::Supervisor,
    policy_path: "supervisor",
    fetch: FetchStrategy::Slot(CredentialSlot::SupervisorLibrary),
    issuance: None,
};

static DOCTOR: RoleProfile = RoleProfile {
    role: Role::Doctor,
    policy_path: "doctor",
    fetch: FetchStrategy::Registry,
    issuance: None,
};

static COMPANY: RoleProfile = RoleProfile {
    role: Role::Company,
    policy_path: "company",
    fetch: FetchStrategy::Slot(CredentialSlot::Company),
    issuance: Some(IssuanceProfile {
        source_type: CredentialType::Employee,
        projection: employee_projection,
        issuer: IssuerChoice::Company,
        endpoint_path: "/company/company-credential/get",
        resource_ref: ResourceRef::SlotCredential(CredentialSlot::Company),
    }),
};

static PERFORMANCE: RoleProfile = RoleProfile {
    role: Role::Performance,
    policy_path: "performance",
    fetch: FetchStrategy::Slot(CredentialSlot::PerformanceTest),
    issuance: Some(IssuanceProfile {
        source_type: CredentialType::Performance,
        projection: performance_projection,
        issuer: IssuerChoice::Delegator,
        endpoint_path: "/performance-credential/get",
        resource_ref: ResourceRef::SourceCredential,
    }),
};

/// The profile for `role`.
pub fn profile(role: Role) -> &'static RoleProfile {
    match role {
        Role::Supervisor => &SUPERVISOR,
        Role::Doctor => &DOCTOR,
        Role::Company => &COMPANY,
        Role::Performance => &PERFORMANCE,
    }
}
