//! Auth middleware
//!
//! `require_auth` validates the bearer token and injects [`CurrentUser`]
//! into request extensions. `require_staff` layers on top of it for
//! staff-only route groups.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::utils::AppError;

/// Public routes never see a token: health checks and catalog reads.
fn is_public(path: &str) -> bool {
    path == "/api/health" || path == "/api/services" || path.starts_with("/api/services/")
}

/// Validate the bearer token and inject the current user.
///
/// Applied at the router level; OPTIONS preflights, non-API paths and
/// the public routes pass through untouched.
pub async fn require_auth(
    State(state): State<ServerState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = request.uri().path();
    if request.method() == http::Method::OPTIONS
        || !path.starts_with("/api/")
        || is_public(path)
    {
        return Ok(next.run(request).await);
    }

    let header = request
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = JwtService::extract_from_header(header)
        .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?;

    let claims = state.jwt_service.validate_token(token).map_err(|e| match e {
        crate::auth::JwtError::ExpiredToken => AppError::TokenExpired,
        _ => AppError::invalid_token("Invalid token"),
    })?;

    let user = CurrentUser::try_from(claims)?;
    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

/// Reject non-staff callers. Must run after [`require_auth`].
pub async fn require_staff(request: Request, next: Next) -> Result<Response, AppError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or(AppError::Unauthorized)?;

    if !user.is_staff() {
        tracing::warn!(
            target: "security",
            user_id = user.id,
            uri = %request.uri(),
            "Client attempted staff-only operation"
        );
        return Err(AppError::forbidden("Staff role required"));
    }

    Ok(next.run(request).await)
}
