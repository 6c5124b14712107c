//! Shared service state, built once at startup.

use std::sync::Arc;
use std::time::{Duration, Instant};

use warrant_delegation::{
    CredentialIssuer, CredentialRegistry, CredentialStore, DelegationEngine, HttpCredentialRegistry,
    IdentityContext, OpaPolicyClient, PolicyEngine,
};
use warrant_identity::{IdentityService, LocalIdentityService};

use crate::config::WarrantConfig;

/// State shared by all HTTP handlers.
pub struct AppState {
    pub engine: DelegationEngine,
    pub issuer: CredentialIssuer,
    /// When the node started.
    pub start_time: Instant,
}

impl AppState {
    /// Wire the identity service, collaborators and engine from `config`.
    ///
    /// Fails if a required URL is missing or the identity seed is malformed.
    pub async fn from_config(config: &WarrantConfig) -> anyhow::Result<Self> {
        let endpoints = config.endpoints()?;

        let identity: Arc<dyn IdentityService> = match config.identity_seed()? {
            Some(seed) => Arc::new(LocalIdentityService::new(seed)),
            None => {
                tracing::warn!("no identity seed configured; identifiers will not survive a restart");
                Arc::new(LocalIdentityService::ephemeral())
            }
        };

        let policy: Arc<dyn PolicyEngine> = Arc::new(OpaPolicyClient::new(
            endpoints.policy,
            Duration::from_secs(config.policy.timeout_secs),
        )?);
        let registry: Arc<dyn CredentialRegistry> = Arc::new(HttpCredentialRegistry::new(
            endpoints.registry,
            Duration::from_secs(config.registry.timeout_secs),
        )?);

        Self::assemble(
            identity,
            policy,
            registry,
            &config.identity.company_alias,
            &config.identity.government_alias,
            endpoints.service.as_str(),
        )
        .await
    }

    /// Build state from already-constructed collaborators.
    pub async fn assemble(
        identity: Arc<dyn IdentityService>,
        policy: Arc<dyn PolicyEngine>,
        registry: Arc<dyn CredentialRegistry>,
        company_alias: &str,
        government_alias: &str,
        service_base_url: &str,
    ) -> anyhow::Result<Self> {
        let context = Arc::new(
            IdentityContext::initialize(identity.as_ref(), company_alias, government_alias).await?,
        );
        let store = Arc::new(CredentialStore::new());

        let issuer = CredentialIssuer::new(identity.clone(), store.clone(), context.clone());
        let engine = DelegationEngine::new(
            identity,
            policy,
            registry,
            store,
            context,
            service_base_url,
        );

        Ok(Self {
            engine,
            issuer,
            start_time: Instant::now(),
        })
    }
}
