//! API route modules
//!
//! - [`health`] - liveness probe
//! - [`services`] - public service catalog
//! - [`service_requests`] - request lifecycle (client + staff)
//! - [`payments`] - order issuance and verification
//! - [`notifications`] - persisted status-change notifications

pub mod health;
pub mod notifications;
pub mod payments;
pub mod service_requests;
pub mod services;

use axum::{Router, middleware};

use crate::auth::require_auth;
use crate::core::ServerState;

/// Assemble the full application router.
///
/// `require_auth` is applied once at this level; it skips the public
/// routes itself.
pub fn build_router(state: ServerState) -> Router {
    Router::new()
        .merge(health::router())
        .merge(services::router())
        .merge(service_requests::router())
        .merge(payments::router())
        .merge(notifications::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}
