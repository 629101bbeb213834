//! Service catalog handlers
//!
//! Read-only and public; the catalog is managed out of band.

use axum::{
    Json,
    extract::{Path, State},
};

use shared::models::Service;

use crate::core::ServerState;
use crate::db::repository::service;
use crate::utils::{AppError, AppResult};

/// GET /api/services - active catalog entries
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Service>>> {
    let services = service::find_all(&state.pool).await?;
    Ok(Json(services))
}

/// GET /api/services/:id - one catalog entry
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Service>> {
    let found = service::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Service {id} not found")))?;
    Ok(Json(found))
}
