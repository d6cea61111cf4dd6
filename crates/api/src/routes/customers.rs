//! Customer intake endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use common::UserId;
use serde::Deserialize;
use store::Store;
use workflow::{CreateCustomer, CustomerCreated};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::{ApiResponse, parse_uuid};

#[derive(Deserialize)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: String,
    pub contact: Option<String>,
    pub source: Option<String>,
    pub address: Option<String>,
    /// The operator creating the record.
    pub user_id: String,
}

/// POST /customers — create a customer with its initial follow record.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateCustomerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<CustomerCreated>>), ApiError> {
    let user = UserId::from_uuid(parse_uuid(&req.user_id)?);

    let outcome = state
        .workflows
        .create_customer(CreateCustomer {
            name: req.name,
            phone: req.phone,
            contact: req.contact,
            source: req.source,
            address: req.address,
            user,
        })
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::from_outcome(outcome)))
}
