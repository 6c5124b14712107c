use std::sync::Arc;

use serde_json::{json, Map, Value};

use warrant_core::{CredentialSlot, CredentialType, Did};
use warrant_identity::{IdentityService, ProofFormat, VerifiableCredential};

use crate::context::IdentityContext;
use crate::error::DelegationError;
use crate::store::CredentialStore;

/// Issues the sample employee credential and the company registration
/// credential it depends on.
pub struct CredentialIssuer {
    identity: Arc<dyn IdentityService>,
    store: Arc<CredentialStore>,
    context: Arc<IdentityContext>,
}

fn subject(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

impl CredentialIssuer {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        store: Arc<CredentialStore>,
        context: Arc<IdentityContext>,
    ) -> Self {
        Self {
            identity,
            store,
            context,
        }
    }

    /// Mint a fresh company credential into the company slot, then an
    /// employee credential for `holder`.
    pub async fn issue_employee_credential(
        &self,
        holder: &Did,
    ) -> Result<VerifiableCredential, DelegationError> {
        self.issue_inner(holder)
            .await
            .map_err(|e| e.log_upstream("issue_employee_credential"))
    }

    async fn issue_inner(&self, holder: &Did) -> Result<VerifiableCredential, DelegationError> {
        let company = &self.context.company;
        let government = &self.context.government;

        let company_credential = VerifiableCredential::new(
            government.did.uri(),
            &[CredentialType::Company],
            subject(json!({
                "id": company.did.uri(),
                "name": "ABC Company",
                "address": "124/1, Kirillawala, Mahara",
            })),
        );
        let company_credential = self
            .identity
            .create_verifiable_credential(company_credential, ProofFormat::Jwt)
            .await?;
        self.store.set(CredentialSlot::Company, company_credential);

        let employee_credential = VerifiableCredential::new(
            company.did.uri(),
            &[CredentialType::Employee],
            subject(json!({
                "id": holder.uri(),
                "name": "Saman Kumara",
                "employeeId": "E20041674",
                "position": "Manager",
                "department": "Sales",
                "joinedDate": "2019-01-01T00:00:00.000Z",
            })),
        );
        let employee_credential = self
            .identity
            .create_verifiable_credential(employee_credential, ProofFormat::Jwt)
            .await?;

        tracing::info!(
            holder = %holder,
            credential_id = employee_credential.id.as_deref().unwrap_or_default(),
            "employee credential issued"
        );
        Ok(employee_credential)
    }
}
