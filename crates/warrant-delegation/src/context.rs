use warrant_identity::{Identifier, IdentityError, IdentityService, KeyType};

/// Identifiers this service acts as, resolved once at startup.
#[derive(Debug, Clone)]
pub struct IdentityContext {
    /// Issues employee credentials and company-role ADCs, signs secure replies.
    pub company: Identifier,
    /// Issues the company's own registration credential.
    pub government: Identifier,
}

impl IdentityContext {
    pub async fn initialize(
        identity: &dyn IdentityService,
        company_alias: &str,
        government_alias: &str,
    ) -> Result<Self, IdentityError> {
        let company = identity
            .resolve_identifier(company_alias, KeyType::Ed25519)
            .await?;
        let government = identity
            .resolve_identifier(government_alias, KeyType::Ed25519)
            .await?;

        tracing::info!(
            company = %company.did,
            government = %government.did,
            "identity context initialized"
        );
        Ok(Self {
            company,
            government,
        })
    }
}
