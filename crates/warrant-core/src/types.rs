use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Decentralized Identifier.
/// Format: `did:<method>:<method-specific-id>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Did(String);

impl Did {
    /// Create a new DID from a full URI string.
    pub fn new(uri: impl Into<String>) -> Result<Self, CoreError> {
        let uri = uri.into();
        let parts: Vec<&str> = uri.splitn(3, ':').collect();
        if parts.len() < 3 || parts[0] != "did" || parts[1].is_empty() || parts[2].is_empty() {
            return Err(CoreError::InvalidDid(format!(
                "DID must have format 'did:<method>:<identifier>', got: {}",
                uri
            )));
        }
        Ok(Self(uri))
    }

    /// Create a DID from method and identifier components.
    pub fn from_parts(method: &str, identifier: &str) -> Self {
        Self(format!("did:{}:{}", method, identifier))
    }

    /// Get the full DID URI.
    pub fn uri(&self) -> &str {
        &self.0
    }

    /// Extract the method (key, web, ethr, ...).
    pub fn method(&self) -> &str {
        self.0.split(':').nth(1).unwrap_or_default()
    }

    /// Extract the method-specific identifier.
    pub fn identifier(&self) -> &str {
        self.0.splitn(3, ':').nth(2).unwrap_or_default()
    }
}

impl fmt::Display for Did {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for Did {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Did> for String {
    fn from(did: Did) -> Self {
        did.0
    }
}

/// Type tags carried in a credential's `type` set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialType {
    /// Base tag present on every credential.
    VerifiableCredential,
    /// Credential authorising a third party to retrieve a delegated resource.
    AccessDelegation,
    /// Employment record issued by a company to an employee.
    Employee,
    /// Company registration issued by a government authority.
    Company,
    /// Credential used to exercise the delegation pipeline under load.
    Performance,
}

impl CredentialType {
    /// The wire tag for this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VerifiableCredential => "VerifiableCredential",
            Self::AccessDelegation => "AccessDelegationCredential",
            Self::Employee => "EmployeeCredential",
            Self::Company => "CompanyCredential",
            Self::Performance => "PerformanceCredential",
        }
    }
}

impl fmt::Display for CredentialType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A party on whose behalf a delegated resource is retrieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Supervisor,
    Doctor,
    Company,
    Performance,
}

impl Role {
    /// All roles, in table order.
    pub const ALL: [Role; 4] = [
        Role::Supervisor,
        Role::Doctor,
        Role::Company,
        Role::Performance,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supervisor => "supervisor",
            Self::Doctor => "doctor",
            Self::Company => "company",
            Self::Performance => "performance",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| CoreError::UnknownRole(s.to_string()))
    }
}

/// Named slots in the ephemeral credential store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialSlot {
    SupervisorLibrary,
    Company,
    PerformanceTest,
}

impl CredentialSlot {
    /// The store key for this slot.
    pub fn key(&self) -> &'static str {
        match self {
            Self::SupervisorLibrary => "supervisorLibraryCredentialKey",
            Self::Company => "companyCredentialKey",
            Self::PerformanceTest => "performanceCredentialKey",
        }
    }
}

impl fmt::Display for CredentialSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CredentialSlot {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "supervisor" | "supervisorlibrarycredentialkey" => Ok(Self::SupervisorLibrary),
            "company" | "companycredentialkey" => Ok(Self::Company),
            "performance" | "performancecredentialkey" => Ok(Self::PerformanceTest),
            _ => Err(CoreError::UnknownSlot(s.to_string())),
        }
    }
}
