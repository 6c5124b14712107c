//! The delegation credential exchange pipeline.
//!
//! Every operation is one forward pass through [`DelegationState`]: verify the
//! inbound presentation, ask the policy engine, look up or mint the resource,
//! deliver. A failure at any stage ends the request in a terminal state and
//! nothing downstream of it runs.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use warrant_core::{
    CredentialSlot, CredentialType, DelegationEvent, DelegationState, DelegationStateMachine, Role,
};
use warrant_identity::{
    Identifier, IdentityService, KeyType, Message, PackedMessage, PackingMode, ProofFormat,
    VerifiableCredential, VerifiablePresentation,
};

use crate::context::IdentityContext;
use crate::error::DelegationError;
use crate::policy::PolicyEngine;
use crate::registry::CredentialRegistry;
use crate::roles::{self, FetchStrategy, IssuanceProfile, IssuerChoice, ResourceRef};
use crate::store::CredentialStore;

/// Channel type advertised in an ADC's service descriptor.
pub const SERVICE_CHANNEL_TYPE: &str = "DIDComm";

/// Message type of a secure-delivery reply.
pub const COMPANY_RESPONSE_TYPE: &str = "Company Credential Response";

/// Tracks one request through the state machine and logs how it ended.
struct RequestTrace {
    operation: &'static str,
    role: Role,
    state: DelegationState,
}

impl RequestTrace {
    fn new(operation: &'static str, role: Role) -> Self {
        Self {
            operation,
            role,
            state: DelegationState::Received,
        }
    }

    fn advance(&mut self, event: DelegationEvent) {
        match DelegationStateMachine::transition(self.state, event) {
            Ok(next) => self.state = next,
            Err(e) => tracing::warn!(
                operation = self.operation,
                role = %self.role,
                error = %e,
                "unexpected delegation transition"
            ),
        }
    }

    fn fail(&mut self, err: DelegationError) -> DelegationError {
        let event = match &err {
            DelegationError::AuthorizationDenied => DelegationEvent::Deny,
            DelegationError::NotFound(_) if self.state == DelegationState::ResourceLookup => {
                DelegationEvent::Miss
            }
            _ => DelegationEvent::Reject,
        };
        let stage = self.state;
        self.advance(event);

        match &err {
            DelegationError::UpstreamUnavailable(cause) => tracing::error!(
                operation = self.operation,
                role = %self.role,
                stage = %stage,
                cause = %cause,
                "collaborator unavailable"
            ),
            DelegationError::AuthorizationDenied => tracing::info!(
                operation = self.operation,
                role = %self.role,
                "access denied by policy"
            ),
            other => tracing::info!(
                operation = self.operation,
                role = %self.role,
                state = %self.state,
                error = %other,
                "delegation request failed"
            ),
        }
        err
    }

    fn finish<T>(mut self, result: Result<T, DelegationError>) -> Result<T, DelegationError> {
        match result {
            Ok(value) => {
                self.advance(DelegationEvent::Deliver);
                tracing::debug!(
                    operation = self.operation,
                    role = %self.role,
                    state = %self.state,
                    "delegation request complete"
                );
                Ok(value)
            }
            Err(e) => Err(self.fail(e)),
        }
    }
}

/// Orchestrates verification, policy, lookup and issuance for every role.
pub struct DelegationEngine {
    identity: Arc<dyn IdentityService>,
    policy: Arc<dyn PolicyEngine>,
    registry: Arc<dyn CredentialRegistry>,
    store: Arc<CredentialStore>,
    context: Arc<IdentityContext>,
    service_base_url: String,
    delegator: RwLock<Option<Identifier>>,
}

impl DelegationEngine {
    pub fn new(
        identity: Arc<dyn IdentityService>,
        policy: Arc<dyn PolicyEngine>,
        registry: Arc<dyn CredentialRegistry>,
        store: Arc<CredentialStore>,
        context: Arc<IdentityContext>,
        service_base_url: &str,
    ) -> Self {
        Self {
            identity,
            policy,
            registry,
            store,
            context,
            service_base_url: service_base_url.trim_end_matches('/').to_string(),
            delegator: RwLock::new(None),
        }
    }

    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    pub fn context(&self) -> &IdentityContext {
        &self.context
    }

    /// Retrieve the resource an ADC delegates, if the policy engine allows it now.
    ///
    /// The whole ADC is the policy input. The decision is never cached.
    pub async fn retrieve(
        &self,
        role: Role,
        adc: &Value,
    ) -> Result<VerifiableCredential, DelegationError> {
        let mut trace = RequestTrace::new("retrieve", role);
        let result = self.retrieve_inner(&mut trace, role, adc).await;
        trace.finish(result)
    }

    async fn retrieve_inner(
        &self,
        trace: &mut RequestTrace,
        role: Role,
        adc: &Value,
    ) -> Result<VerifiableCredential, DelegationError> {
        let profile = roles::profile(role);

        trace.advance(DelegationEvent::CheckPolicy);
        self.authorize(profile.policy_path, adc).await?;

        trace.advance(DelegationEvent::Lookup);
        match profile.fetch {
            FetchStrategy::Slot(slot) => self.read_slot(slot),
            FetchStrategy::Registry => self.fetch_from_registry(adc).await,
        }
    }

    /// Verify a presentation and mint an ADC from its role-specific source credential.
    ///
    /// The result is not stored anywhere.
    pub async fn issue_access_delegation_credential(
        &self,
        role: Role,
        presentation: &VerifiablePresentation,
    ) -> Result<VerifiableCredential, DelegationError> {
        self.issue_at(role, presentation, Utc::now()).await
    }

    /// As [`issue_access_delegation_credential`](Self::issue_access_delegation_credential)
    /// with a fixed `now` for derived attributes.
    pub async fn issue_at(
        &self,
        role: Role,
        presentation: &VerifiablePresentation,
        now: DateTime<Utc>,
    ) -> Result<VerifiableCredential, DelegationError> {
        let issuance = roles::profile(role).issuance.ok_or_else(|| {
            DelegationError::NotFound(format!(
                "role {} does not issue access delegation credentials",
                role
            ))
        })?;

        let mut trace = RequestTrace::new("issue", role);
        let result = self
            .issue_inner(&mut trace, role, &issuance, presentation, now)
            .await;
        trace.finish(result)
    }

    async fn issue_inner(
        &self,
        trace: &mut RequestTrace,
        role: Role,
        issuance: &IssuanceProfile,
        presentation: &VerifiablePresentation,
        now: DateTime<Utc>,
    ) -> Result<VerifiableCredential, DelegationError> {
        trace.advance(DelegationEvent::Verify);
        let source = self
            .verified_credential(presentation, issuance.source_type, role)
            .await?;

        trace.advance(DelegationEvent::Lookup);
        let attributes = (issuance.projection)(source, now);
        let credential_id = match issuance.resource_ref {
            ResourceRef::SlotCredential(slot) => self.read_slot(slot)?.id.ok_or_else(|| {
                DelegationError::NotFound(format!("credential under {} has no id", slot))
            })?,
            ResourceRef::SourceCredential => source.id.clone().ok_or_else(|| {
                DelegationError::MissingCredential(format!("{} has no id", issuance.source_type))
            })?,
        };
        let issuer = match issuance.issuer {
            IssuerChoice::Company => self.context.company.clone(),
            IssuerChoice::Delegator => self.active_delegator().await,
        };

        let mut subject = Map::new();
        subject.insert("id".into(), Value::String(presentation.holder.clone()));
        subject.insert("credentialId".into(), Value::String(credential_id));
        subject.insert("sourceCredentialId".into(), json!(source.id));
        subject.insert("attributes".into(), Value::Object(attributes));
        subject.insert(
            "service".into(),
            json!({
                "type": SERVICE_CHANNEL_TYPE,
                "serviceEndpoint": format!("{}{}", self.service_base_url, issuance.endpoint_path),
            }),
        );

        let unsigned = VerifiableCredential::new(
            issuer.did.uri(),
            &[CredentialType::AccessDelegation],
            subject,
        );
        let adc = self
            .identity
            .create_verifiable_credential(unsigned, ProofFormat::Jwt)
            .await?;

        tracing::info!(
            role = %role,
            issuer = %issuer.did,
            holder = %presentation.holder,
            credential_id = adc.id.as_deref().unwrap_or_default(),
            "access delegation credential issued"
        );
        Ok(adc)
    }

    /// Answer a packed company-credential request with a signed reply.
    ///
    /// Either the whole reply is packed and returned or nothing is.
    pub async fn deliver_via_secure_channel(
        &self,
        packed: &PackedMessage,
    ) -> Result<PackedMessage, DelegationError> {
        let mut trace = RequestTrace::new("deliver", Role::Company);
        let result = self.deliver_inner(&mut trace, packed).await;
        trace.finish(result)
    }

    async fn deliver_inner(
        &self,
        trace: &mut RequestTrace,
        packed: &PackedMessage,
    ) -> Result<PackedMessage, DelegationError> {
        trace.advance(DelegationEvent::Verify);
        let unpacked = self
            .identity
            .unpack_message(packed)
            .await
            .map_err(|e| DelegationError::MalformedMessage(e.to_string()))?;

        let presentation: VerifiablePresentation =
            serde_json::from_value(unpacked.message.body).map_err(|e| {
                DelegationError::InvalidPresentation(format!(
                    "message body is not a verifiable presentation: {}",
                    e
                ))
            })?;
        let adc = self
            .verified_credential(&presentation, CredentialType::AccessDelegation, Role::Company)
            .await?;

        trace.advance(DelegationEvent::CheckPolicy);
        let input = policy_input(adc)?;
        self.authorize(roles::profile(Role::Company).policy_path, &input)
            .await?;

        trace.advance(DelegationEvent::Lookup);
        let resource = self.read_slot(CredentialSlot::Company)?;
        let body = serde_json::to_value(resource)
            .map_err(|e| DelegationError::NotFound(format!("company credential: {}", e)))?;

        let reply = Message {
            id: Uuid::now_v7().to_string(),
            message_type: COMPANY_RESPONSE_TYPE.to_string(),
            from: self.context.company.did.to_string(),
            to: vec![presentation.holder.clone()],
            body,
            created_time: Some(Utc::now()),
        };
        Ok(self.identity.pack_message(&reply, PackingMode::Jws).await?)
    }

    /// Verify a presentation and return its embedded ADC without consulting policy.
    pub async fn verify_presentation_for_adc(
        &self,
        role: Role,
        presentation: &VerifiablePresentation,
    ) -> Result<VerifiableCredential, DelegationError> {
        let mut trace = RequestTrace::new("verify", role);
        trace.advance(DelegationEvent::Verify);
        match self
            .verified_credential(presentation, CredentialType::AccessDelegation, role)
            .await
        {
            Ok(adc) => Ok(adc.clone()),
            Err(e) => Err(trace.fail(e)),
        }
    }

    /// Make `delegator_<keyType>` the identifier that signs delegator-issued ADCs.
    ///
    /// One delegator is active at a time; the latest call wins.
    pub async fn initialize_delegator(
        &self,
        key_type: KeyType,
    ) -> Result<Identifier, DelegationError> {
        let alias = format!("delegator_{}", key_type);
        let identifier = self
            .identity
            .resolve_identifier(&alias, key_type)
            .await
            .map_err(|e| DelegationError::from(e).log_upstream("initialize_delegator"))?;
        *self.delegator.write().await = Some(identifier.clone());

        tracing::info!(did = %identifier.did, key_type = %key_type, "delegator initialized");
        Ok(identifier)
    }

    /// The initialized delegator, if any.
    pub async fn delegator(&self) -> Option<Identifier> {
        self.delegator.read().await.clone()
    }

    async fn active_delegator(&self) -> Identifier {
        match self.delegator().await {
            Some(delegator) => delegator,
            None => self.context.company.clone(),
        }
    }

    async fn verified_credential<'a>(
        &self,
        presentation: &'a VerifiablePresentation,
        source_type: CredentialType,
        role: Role,
    ) -> Result<&'a VerifiableCredential, DelegationError> {
        let result = self.identity.verify_presentation(presentation).await?;
        if !result.verified {
            return Err(DelegationError::InvalidPresentation(
                result
                    .error
                    .unwrap_or_else(|| "presentation did not verify".to_string()),
            ));
        }

        if presentation.credentials().is_empty() {
            return Err(DelegationError::MissingCredential(
                "presentation embeds no verifiable credentials".to_string(),
            ));
        }

        presentation
            .find_credential(source_type.as_str())
            .ok_or_else(|| {
                DelegationError::MissingCredential(format!(
                    "{} role requires a {} in the presentation",
                    role, source_type
                ))
            })
    }

    async fn authorize(&self, rule_path: &str, input: &Value) -> Result<(), DelegationError> {
        if self.policy.check_policy(rule_path, input).await? {
            Ok(())
        } else {
            Err(DelegationError::AuthorizationDenied)
        }
    }

    fn read_slot(&self, slot: CredentialSlot) -> Result<VerifiableCredential, DelegationError> {
        self.store
            .get(slot)
            .ok_or_else(|| DelegationError::NotFound(format!("no credential stored under {}", slot)))
    }

    async fn fetch_from_registry(&self, adc: &Value) -> Result<VerifiableCredential, DelegationError> {
        let credential_id = adc
            .pointer("/credentialSubject/credentialId")
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DelegationError::NotFound(
                    "access delegation credential names no credentialId".to_string(),
                )
            })?;

        self.registry.fetch(credential_id).await?.ok_or_else(|| {
            DelegationError::NotFound(format!(
                "credential {} is not in the registry",
                credential_id
            ))
        })
    }
}

fn policy_input(adc: &VerifiableCredential) -> Result<Value, DelegationError> {
    serde_json::to_value(adc).map_err(|e| DelegationError::InvalidPresentation(e.to_string()))
}
