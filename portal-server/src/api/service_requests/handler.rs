//! Service request handlers
//!
//! Thin HTTP shims over `crate::requests`; all lifecycle rules live there.

use axum::{
    Json,
    extract::{Path, State},
};

use shared::models::{PayableQuote, ServiceRequest, ServiceRequestCreate, ServiceRequestPatch};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::payments::{issuer, pricing};
use crate::requests;
use crate::utils::AppResult;

/// POST /api/service-requests - submit a new request
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ServiceRequestCreate>,
) -> AppResult<Json<ServiceRequest>> {
    let request =
        requests::create_request(&state.pool, &state.notifier, &user, payload).await?;
    Ok(Json(request))
}

/// GET /api/service-requests/user - caller's own requests
pub async fn list_own(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<ServiceRequest>>> {
    let found = requests::list_own(&state.pool, &user).await?;
    Ok(Json(found))
}

/// GET /api/service-requests - all requests (staff)
pub async fn list_all(
    State(state): State<ServerState>,
) -> AppResult<Json<Vec<ServiceRequest>>> {
    let found = requests::list_all(&state.pool).await?;
    Ok(Json(found))
}

/// GET /api/service-requests/:id - one request (owner or staff)
pub async fn get_by_id(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ServiceRequest>> {
    let request = requests::get_request(&state.pool, &user, id).await?;
    Ok(Json(request))
}

/// PUT /api/service-requests/:id - apply a staff patch
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
    Json(payload): Json<ServiceRequestPatch>,
) -> AppResult<Json<ServiceRequest>> {
    let request =
        requests::transition(&state.pool, &state.notifier, id, &user, payload).await?;
    Ok(Json(request))
}

/// POST /api/service-requests/:id/claim - take ownership of fulfilment
pub async fn claim(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<ServiceRequest>> {
    let request = requests::claim(&state.pool, id, &user).await?;
    Ok(Json(request))
}

/// GET /api/service-requests/:id/quote - preview the payable total
///
/// Same gate as order creation, so a client sees the exact error they
/// would hit at checkout.
pub async fn quote(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<PayableQuote>> {
    let (_, amount) = issuer::payable_request(&state.pool, &user, id).await?;
    Ok(Json(pricing::quote(amount)))
}
