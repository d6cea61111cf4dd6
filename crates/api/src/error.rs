//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::DomainError;
use workflow::WorkflowError;

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// Bad request from the client (malformed IDs, unparsable fields).
    BadRequest(String),
    /// A workflow operation failed.
    Workflow(WorkflowError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Workflow(err) => workflow_error_to_response(err),
        };

        let body = serde_json::json!({
            "success": false,
            "data": serde_json::Value::Null,
            "message": message,
        });
        (status, axum::Json(body)).into_response()
    }
}

fn workflow_error_to_response(err: WorkflowError) -> (StatusCode, String) {
    let status = match &err {
        WorkflowError::Domain(domain_err) => match domain_err {
            DomainError::Validation { .. } => StatusCode::BAD_REQUEST,
            DomainError::NotFound { .. } => StatusCode::NOT_FOUND,
            DomainError::StateConflict { .. }
            | DomainError::Duplicate { .. }
            | DomainError::PaymentAlreadyConfirmed
            | DomainError::PaymentAlreadyCancelled => StatusCode::CONFLICT,
            DomainError::NumberExhausted { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        },
        WorkflowError::Store(store_err) => {
            tracing::error!(error = %store_err, "store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, err.to_string())
}

impl From<WorkflowError> for ApiError {
    fn from(err: WorkflowError) -> Self {
        ApiError::Workflow(err)
    }
}
