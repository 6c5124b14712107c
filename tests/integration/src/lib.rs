//! Test harness: a Warrant node wired to mock policy and registry servers,
//! driven in-process through its router, plus a holder-side wallet.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Map, Value};
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use warrant_core::CredentialType;
use warrant_delegation::{
    CredentialRegistry, HttpCredentialRegistry, OpaPolicyClient, PolicyEngine,
};
use warrant_identity::{
    Identifier, IdentityService, KeyType, LocalIdentityService, ProofFormat, VerifiableCredential,
    VerifiablePresentation,
};
use warrant_node::{build_router, AppState};

pub const SERVICE_BASE_URL: &str = "https://warrant.test";

/// Upstream timeout used by the harness clients.
pub const UPSTREAM_TIMEOUT: Duration = Duration::from_millis(500);

pub struct TestNode {
    pub opa: MockServer,
    pub registry: MockServer,
    pub state: Arc<AppState>,
}

impl TestNode {
    pub async fn start() -> Self {
        let opa = MockServer::start().await;
        let registry = MockServer::start().await;

        let policy: Arc<dyn PolicyEngine> = Arc::new(
            OpaPolicyClient::new(opa.uri().parse().unwrap(), UPSTREAM_TIMEOUT).unwrap(),
        );
        let reg: Arc<dyn CredentialRegistry> = Arc::new(
            HttpCredentialRegistry::new(registry.uri().parse().unwrap(), UPSTREAM_TIMEOUT).unwrap(),
        );
        let identity: Arc<dyn IdentityService> = Arc::new(LocalIdentityService::new([7u8; 32]));

        let state = AppState::assemble(
            identity,
            policy,
            reg,
            "company",
            "government",
            SERVICE_BASE_URL,
        )
        .await
        .unwrap();

        Self {
            opa,
            registry,
            state: Arc::new(state),
        }
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, uri: &str, body: &Value) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(body).unwrap()))
                .unwrap(),
        )
        .await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(self.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    /// Answer every policy query for `rule` with `allow`.
    pub async fn policy_decides(&self, rule: &str, allow: bool) {
        Mock::given(method("POST"))
            .and(path(format!("/data/{}", rule)))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"result": {"allow": allow}})),
            )
            .mount(&self.opa)
            .await;
    }

    pub fn company_did(&self) -> String {
        self.state.engine.context().company.did.to_string()
    }
}

/// Holder-side identity, independent of the node's keys.
pub struct Wallet {
    pub identity: LocalIdentityService,
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}

impl Wallet {
    pub fn new() -> Self {
        Self {
            identity: LocalIdentityService::new([99u8; 32]),
        }
    }

    pub async fn identifier(&self, alias: &str) -> Identifier {
        self.identity
            .resolve_identifier(alias, KeyType::Ed25519)
            .await
            .unwrap()
    }

    pub async fn present(
        &self,
        holder: &Identifier,
        credentials: Vec<VerifiableCredential>,
    ) -> VerifiablePresentation {
        let vp = VerifiablePresentation::new(holder.did.uri(), credentials);
        self.identity
            .create_verifiable_presentation(vp, ProofFormat::Jwt)
            .await
            .unwrap()
    }

    /// Self-issue a credential of `kind` about `holder`.
    pub async fn self_issue(
        &self,
        holder: &Identifier,
        kind: CredentialType,
        subject: Value,
    ) -> VerifiableCredential {
        let subject = match subject {
            Value::Object(m) => m,
            _ => Map::new(),
        };
        let vc = VerifiableCredential::new(holder.did.uri(), &[kind], subject);
        self.identity
            .create_verifiable_credential(vc, ProofFormat::Jwt)
            .await
            .unwrap()
    }
}

pub fn to_json<T: serde::Serialize>(value: &T) -> Value {
    serde_json::to_value(value).unwrap()
}

pub fn from_json<T: serde::de::DeserializeOwned>(value: Value) -> T {
    serde_json::from_value(value).unwrap()
}
