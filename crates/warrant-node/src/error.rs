//! HTTP mapping of delegation failures.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use warrant_delegation::DelegationError;

/// Fixed client message for a policy deny.
pub const DENIED_MESSAGE: &str =
    "Access Delegation Credential is not valid or owner has revoked access";

/// Fixed client message when a collaborator failed.
pub const UPSTREAM_MESSAGE: &str = "API request failed";

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Delegation(#[from] DelegationError),

    /// The request could not be interpreted.
    #[error("bad request: {0}")]
    BadRequest(String),
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Self::Delegation(e) => {
                let status = match e {
                    DelegationError::InvalidPresentation(_)
                    | DelegationError::MissingCredential(_)
                    | DelegationError::MalformedMessage(_)
                    | DelegationError::AuthorizationDenied => StatusCode::BAD_REQUEST,
                    DelegationError::NotFound(_) => StatusCode::NOT_FOUND,
                    DelegationError::UpstreamUnavailable(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.code())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        let message = match &self {
            Self::Delegation(DelegationError::AuthorizationDenied) => DENIED_MESSAGE.to_string(),
            // The cause was logged where the failure happened.
            Self::Delegation(DelegationError::UpstreamUnavailable(_)) => UPSTREAM_MESSAGE.to_string(),
            other => other.to_string(),
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };
        (status, Json(body)).into_response()
    }
}
