//! Service request API module

mod handler;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::auth::require_staff;
use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/service-requests", routes())
}

fn routes() -> Router<ServerState> {
    let client_routes = Router::new()
        .route("/", post(handler::create))
        .route("/user", get(handler::list_own))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/quote", get(handler::quote));

    let staff_routes = Router::new()
        .route("/", get(handler::list_all))
        .route("/{id}", put(handler::update))
        .route("/{id}/claim", post(handler::claim))
        .layer(middleware::from_fn(require_staff));

    client_routes.merge(staff_routes)
}
