//! Payment handlers

use axum::{Json, extract::State};

use shared::models::{
    CreateOrderRequest, CreateOrderResponse, Payment, VerifyPaymentRequest, VerifyPaymentResponse,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::payment;
use crate::payments::{issuer, verifier};
use crate::utils::AppResult;

/// POST /api/payments/create-order - open a gateway order for a
/// completed request
pub async fn create_order(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<CreateOrderRequest>,
) -> AppResult<Json<CreateOrderResponse>> {
    let response = issuer::create_order(
        &state.pool,
        state.gateway.as_ref(),
        &state.config.gateway.currency,
        &user,
        payload,
    )
    .await?;
    Ok(Json(response))
}

/// POST /api/payments/verify - verify a gateway callback and settle
pub async fn verify(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<VerifyPaymentRequest>,
) -> AppResult<Json<VerifyPaymentResponse>> {
    let response = verifier::verify(
        &state.pool,
        &state.notifier,
        &state.config.gateway.key_secret,
        &user,
        payload,
    )
    .await?;
    Ok(Json(response))
}

/// GET /api/payments/history - caller's payments, newest first
pub async fn history(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Payment>>> {
    let payments = payment::find_by_owner(&state.pool, user.id).await?;
    Ok(Json(payments))
}
