//! Payment confirmation endpoint.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use common::PaymentId;
use serde::Deserialize;
use store::Store;
use workflow::{ConfirmPayment, PaymentConfirmed};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::{ApiResponse, parse_uuid};

#[derive(Deserialize, Default)]
pub struct ConfirmPaymentRequest {
    /// When the money was received; defaults to the server clock.
    pub paid_at: Option<DateTime<Utc>>,
}

/// POST /payments/:id/confirm — confirm a pending payment and apply it to
/// the owning order.
#[tracing::instrument(skip(state, req))]
pub async fn confirm<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<ConfirmPaymentRequest>,
) -> Result<Json<ApiResponse<PaymentConfirmed>>, ApiError> {
    let outcome = state
        .workflows
        .confirm_payment(ConfirmPayment {
            payment_id: PaymentId::from_uuid(parse_uuid(&id)?),
            paid_at: req.paid_at,
        })
        .await?;

    Ok(ApiResponse::from_outcome(outcome))
}
