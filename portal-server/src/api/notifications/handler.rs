//! Notification handlers

use axum::{
    Json,
    extract::{Path, State},
};

use shared::models::Notification;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::notification;
use crate::utils::{AppError, AppResult, AppResponse, ok};

/// GET /api/notifications - caller's notifications, newest first
pub async fn list(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Notification>>> {
    let found = notification::find_by_user(&state.pool, user.id).await?;
    Ok(Json(found))
}

/// PUT /api/notifications/:id/read - mark one as read
pub async fn mark_read(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<Json<AppResponse<()>>> {
    if !notification::mark_read(&state.pool, id, user.id).await? {
        return Err(AppError::not_found(format!("Notification {id} not found")));
    }
    Ok(ok(()))
}
