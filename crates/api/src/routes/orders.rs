//! Order lifecycle endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use common::{CustomerId, Money, OrderId, OrderMaterialId, ProductId, UserId};
use domain::PaymentMethod;
use serde::Deserialize;
use store::Store;
use workflow::{
    CompleteOrder, CreateOrderFromProduct, MaterialUpdated, OrderCreated, OrderSigned, SignOrder,
    StartOrder, UpdateOrderMaterial,
};

use crate::AppState;
use crate::error::ApiError;
use crate::routes::{ApiResponse, parse_uuid};

#[derive(Deserialize)]
pub struct CreateOrderRequest {
    pub customer_id: String,
    pub product_id: String,
    pub remark: Option<String>,
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct UpdateMaterialRequest {
    pub quantity: u32,
    pub price_cents: i64,
}

#[derive(Deserialize)]
pub struct SignOrderRequest {
    pub deposit_cents: Option<i64>,
    pub method: Option<PaymentMethod>,
    pub user_id: String,
}

#[derive(Deserialize)]
pub struct StartOrderRequest {
    pub foreman_id: Option<String>,
}

/// POST /orders — create a draft order from a product template.
#[tracing::instrument(skip(state, req))]
pub async fn create<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Json(req): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<OrderCreated>>), ApiError> {
    let outcome = state
        .workflows
        .create_order_from_product(CreateOrderFromProduct {
            customer_id: CustomerId::from_uuid(parse_uuid(&req.customer_id)?),
            product_id: ProductId::from_uuid(parse_uuid(&req.product_id)?),
            remark: req.remark,
            user: UserId::from_uuid(parse_uuid(&req.user_id)?),
        })
        .await?;

    Ok((StatusCode::CREATED, ApiResponse::from_outcome(outcome)))
}

/// PATCH /order-materials/:id — reprice a line item and recompute the
/// order total.
#[tracing::instrument(skip(state, req))]
pub async fn update_material<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateMaterialRequest>,
) -> Result<Json<ApiResponse<MaterialUpdated>>, ApiError> {
    let outcome = state
        .workflows
        .update_order_material(UpdateOrderMaterial {
            material_id: OrderMaterialId::from_uuid(parse_uuid(&id)?),
            quantity: req.quantity,
            price: Money::from_cents(req.price_cents),
        })
        .await?;

    Ok(ApiResponse::from_outcome(outcome))
}

/// POST /orders/:id/sign — sign a pending order, optionally recording a
/// deposit.
#[tracing::instrument(skip(state, req))]
pub async fn sign<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<SignOrderRequest>,
) -> Result<Json<ApiResponse<OrderSigned>>, ApiError> {
    let outcome = state
        .workflows
        .sign_order(SignOrder {
            order_id: OrderId::from_uuid(parse_uuid(&id)?),
            deposit_amount: req.deposit_cents.map(Money::from_cents),
            method: req.method,
            user: UserId::from_uuid(parse_uuid(&req.user_id)?),
        })
        .await?;

    Ok(ApiResponse::from_outcome(outcome))
}

/// POST /orders/:id/start — start work, optionally assigning a foreman.
#[tracing::instrument(skip(state, req))]
pub async fn start<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
    Json(req): Json<StartOrderRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let foreman_id = match req.foreman_id {
        Some(ref raw) => Some(UserId::from_uuid(parse_uuid(raw)?)),
        None => None,
    };

    let outcome = state
        .workflows
        .start_order(StartOrder {
            order_id: OrderId::from_uuid(parse_uuid(&id)?),
            foreman_id,
        })
        .await?;

    Ok(ApiResponse::from_outcome(outcome))
}

/// POST /orders/:id/complete — complete an in-progress order.
#[tracing::instrument(skip(state))]
pub async fn complete<S: Store + 'static>(
    State(state): State<Arc<AppState<S>>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    let outcome = state
        .workflows
        .complete_order(CompleteOrder {
            order_id: OrderId::from_uuid(parse_uuid(&id)?),
        })
        .await?;

    Ok(ApiResponse::from_outcome(outcome))
}
