//! Route handlers grouped by resource.

pub mod customers;
pub mod health;
pub mod metrics;
pub mod orders;
pub mod payments;

use serde::Serialize;

use crate::error::ApiError;

/// The `{success, data, message}` envelope every business response uses.
#[derive(Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub message: String,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wraps a workflow outcome into the success envelope.
    pub fn from_outcome(outcome: workflow::Outcome<T>) -> axum::Json<Self> {
        axum::Json(Self {
            success: true,
            data: outcome.data,
            message: outcome.message,
        })
    }
}

/// Parses a path segment into a UUID, mapping failures to 400.
pub(crate) fn parse_uuid(id: &str) -> Result<uuid::Uuid, ApiError> {
    uuid::Uuid::parse_str(id).map_err(|e| ApiError::BadRequest(format!("invalid id format: {e}")))
}
