//! Domain error taxonomy, mapped onto HTTP statuses at the edge.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// Malformed or out-of-bounds request payload.
    #[error("{0}")]
    Validation(String),

    /// Unknown resource, or one owned by a different user. The two cases are
    /// deliberately indistinguishable to the caller.
    #[error("not found")]
    NotFound,

    /// Track id in the request body disagrees with the path.
    #[error("track id in body does not match the requested track")]
    IdentifierMismatch,

    /// The operation is not defined for the resource's current state.
    #[error("{0}")]
    InvalidState(String),

    /// Transformation output requested before the job completed.
    #[error("transformation is not completed yet")]
    NotReady,

    #[error(transparent)]
    Storage(#[from] anyhow::Error),
}

impl TransformError {
    fn status_code(&self) -> StatusCode {
        match self {
            TransformError::Validation(_) => StatusCode::BAD_REQUEST,
            TransformError::NotFound => StatusCode::NOT_FOUND,
            TransformError::IdentifierMismatch => StatusCode::BAD_REQUEST,
            TransformError::InvalidState(_) => StatusCode::CONFLICT,
            TransformError::NotReady => StatusCode::BAD_REQUEST,
            TransformError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for TransformError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Storage error: {:#}", self);
            // Internals stay out of the response body
            return (status, Json(json!({"error": "internal error"}))).into_response();
        }
        (status, Json(json!({"error": self.to_string()}))).into_response()
    }
}
