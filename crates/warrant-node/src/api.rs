//! HTTP surface of the Warrant node.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::trace::TraceLayer;

use warrant_core::{CredentialSlot, Did, Role};
use warrant_delegation::DelegationError;
use warrant_identity::{
    IdentityError, KeyType, PackedMessage, VerifiableCredential, VerifiablePresentation,
};

use crate::error::ApiError;
use crate::extractors::{extract_json, extract_packed_message, extract_presentation};
use crate::state::AppState;

const STORED_MESSAGE: &str = "Credential stored successfully";

// --- Request / response types ---

#[derive(Serialize)]
pub struct HealthResponse {
    pub alive: bool,
}

#[derive(Serialize, Deserialize)]
pub struct AckResponse {
    pub message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyDidResponse {
    #[serde(rename = "companyDID")]
    pub company_did: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeDelegatorRequest {
    pub key_type: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelegatorResponse {
    pub delegator_identifier: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedAdcResponse {
    pub access_delegation_credential: VerifiableCredential,
    /// Milliseconds.
    pub time_taken: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Timing {
    pub time_taken: f64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimedRetrievalResponse {
    pub delegated_credential: VerifiableCredential,
    pub verification: Timing,
    pub retrieval: Timing,
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

// --- Handlers ---

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse { alive: true })
}

async fn handle_supervisor_get(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VerifiableCredential>, ApiError> {
    let adc = extract_json(body)?;
    Ok(Json(state.engine.retrieve(Role::Supervisor, &adc).await?))
}

async fn handle_supervisor_set(
    State(state): State<Arc<AppState>>,
    body: Result<Json<VerifiableCredential>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    Ok(store_credential(
        &state,
        CredentialSlot::SupervisorLibrary,
        extract_json(body)?,
    ))
}

async fn handle_doctor_get(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<VerifiableCredential>, ApiError> {
    let adc = extract_json(body)?;
    Ok(Json(state.engine.retrieve(Role::Doctor, &adc).await?))
}

async fn handle_employee_credential(
    State(state): State<Arc<AppState>>,
    Path(did): Path<String>,
) -> Result<Json<VerifiableCredential>, ApiError> {
    let holder = Did::new(did).map_err(|e| ApiError::BadRequest(e.to_string()))?;
    Ok(Json(state.issuer.issue_employee_credential(&holder).await?))
}

async fn handle_adc(
    State(state): State<Arc<AppState>>,
    body: Result<Json<VerifiablePresentation>, JsonRejection>,
) -> Result<Json<VerifiableCredential>, ApiError> {
    let presentation = extract_presentation(body)?;
    Ok(Json(
        state
            .engine
            .issue_access_delegation_credential(Role::Company, &presentation)
            .await?,
    ))
}

async fn handle_company_did(State(state): State<Arc<AppState>>) -> Json<CompanyDidResponse> {
    Json(CompanyDidResponse {
        company_did: state.engine.context().company.did.to_string(),
    })
}

async fn handle_company_credential(
    State(state): State<Arc<AppState>>,
    body: Result<Json<PackedMessage>, JsonRejection>,
) -> Result<Json<PackedMessage>, ApiError> {
    let packed = extract_packed_message(body)?;
    Ok(Json(state.engine.deliver_via_secure_channel(&packed).await?))
}

async fn handle_initialize_delegator(
    State(state): State<Arc<AppState>>,
    body: Result<Json<InitializeDelegatorRequest>, JsonRejection>,
) -> Result<Json<DelegatorResponse>, ApiError> {
    let req = extract_json(body)?;
    let key_type: KeyType = req
        .key_type
        .parse()
        .map_err(|e: IdentityError| ApiError::BadRequest(e.to_string()))?;
    let delegator = state.engine.initialize_delegator(key_type).await?;
    Ok(Json(DelegatorResponse {
        delegator_identifier: delegator.did.to_string(),
    }))
}

async fn handle_performance_set(
    State(state): State<Arc<AppState>>,
    body: Result<Json<VerifiableCredential>, JsonRejection>,
) -> Result<Json<AckResponse>, ApiError> {
    Ok(store_credential(
        &state,
        CredentialSlot::PerformanceTest,
        extract_json(body)?,
    ))
}

async fn handle_performance_get_adc(
    State(state): State<Arc<AppState>>,
    body: Result<Json<VerifiablePresentation>, JsonRejection>,
) -> Result<Json<TimedAdcResponse>, ApiError> {
    let presentation = extract_presentation(body)?;
    let start = Instant::now();
    let adc = state
        .engine
        .issue_access_delegation_credential(Role::Performance, &presentation)
        .await?;
    Ok(Json(TimedAdcResponse {
        access_delegation_credential: adc,
        time_taken: elapsed_ms(start),
    }))
}

async fn handle_performance_get(
    State(state): State<Arc<AppState>>,
    body: Result<Json<VerifiablePresentation>, JsonRejection>,
) -> Result<Json<TimedRetrievalResponse>, ApiError> {
    let presentation = extract_presentation(body)?;

    let verification_start = Instant::now();
    let adc = state
        .engine
        .verify_presentation_for_adc(Role::Performance, &presentation)
        .await?;
    let verification = Timing {
        time_taken: elapsed_ms(verification_start),
    };

    let retrieval_start = Instant::now();
    let input = serde_json::to_value(&adc)
        .map_err(|e| DelegationError::InvalidPresentation(e.to_string()))?;
    let credential = state.engine.retrieve(Role::Performance, &input).await?;
    let retrieval = Timing {
        time_taken: elapsed_ms(retrieval_start),
    };

    Ok(Json(TimedRetrievalResponse {
        delegated_credential: credential,
        verification,
        retrieval,
    }))
}

fn store_credential(
    state: &AppState,
    slot: CredentialSlot,
    credential: VerifiableCredential,
) -> Json<AckResponse> {
    state.engine.store().set(slot, credential);
    Json(AckResponse {
        message: STORED_MESSAGE.to_string(),
    })
}

// --- Router ---

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/supervisor/library-credential/get", post(handle_supervisor_get))
        .route("/supervisor/library-credential/set", post(handle_supervisor_set))
        .route("/doctor/hospital-credential/get", post(handle_doctor_get))
        .route("/credentials/{did}", get(handle_employee_credential))
        .route("/adc", post(handle_adc))
        .route("/company/did", get(handle_company_did))
        .route("/company/company-credential/get", post(handle_company_credential))
        .route("/initialize-delegator", post(handle_initialize_delegator))
        .route("/performance-credential/set", post(handle_performance_set))
        .route("/performance-credential/get-adc", post(handle_performance_get_adc))
        .route("/performance-credential/get", post(handle_performance_get))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API until `shutdown` resolves.
pub async fn start_api_server<F>(
    state: Arc<AppState>,
    listen_addr: SocketAddr,
    shutdown: F,
) -> anyhow::Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(listen_addr).await?;
    tracing::info!(%listen_addr, "HTTP API server started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
