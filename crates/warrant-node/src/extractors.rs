//! Body extraction that reports rejections in the structured error shape.
//!
//! Handlers take `Result<Json<T>, JsonRejection>` and pass it through one of
//! these helpers instead of letting axum answer with plain text.

use axum::extract::rejection::JsonRejection;
use axum::Json;

use warrant_delegation::DelegationError;
use warrant_identity::{PackedMessage, VerifiablePresentation};

use crate::error::ApiError;

/// Extract a JSON body, mapping rejections to [`ApiError::BadRequest`].
pub fn extract_json<T>(result: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    result
        .map(|Json(v)| v)
        .map_err(|err| ApiError::BadRequest(err.body_text()))
}

/// A body that is not a presentation is an invalid presentation.
pub fn extract_presentation(
    result: Result<Json<VerifiablePresentation>, JsonRejection>,
) -> Result<VerifiablePresentation, ApiError> {
    result.map(|Json(v)| v).map_err(|err| {
        DelegationError::InvalidPresentation(format!(
            "not a verifiable presentation: {}",
            err.body_text()
        ))
        .into()
    })
}

/// A body that is not a packed envelope is a malformed message.
pub fn extract_packed_message(
    result: Result<Json<PackedMessage>, JsonRejection>,
) -> Result<PackedMessage, ApiError> {
    result.map(|Json(v)| v).map_err(|err| {
        DelegationError::MalformedMessage(format!("not a packed message: {}", err.body_text()))
            .into()
    })
}
