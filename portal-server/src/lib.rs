//! Portal Server - client services portal backend
//!
//! Customers request professional services, staff fulfil them, and
//! customers pay once the work is complete. The interesting parts are the
//! request lifecycle state machine and the two-phase payment settlement.
//!
//! # Module structure
//!
//! ```text
//! portal-server/src/
//! ├── core/       # config, shared state, server bootstrap
//! ├── auth/       # JWT validation, roles, middleware
//! ├── api/        # HTTP routes and handlers
//! ├── requests/   # request state machine and guard
//! ├── payments/   # pricing, gateway, order issuer, verifier
//! ├── notify/     # change broadcast + persisted notifications
//! ├── db/         # pool, migrations, repositories
//! └── utils/      # errors, validation, logging
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod notify;
pub mod payments;
pub mod requests;
pub mod utils;

pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use notify::ChangeNotifier;
pub use utils::{AppError, AppResult};

pub use utils::logger::{init_logger, init_logger_with_file};

/// Load `.env` and initialize logging. Call once, first thing in `main`.
pub fn setup_environment() {
    // A missing .env file is fine; real deployments use the environment
    let _ = dotenv::dotenv();
    let log_level = std::env::var("LOG_LEVEL").ok();
    let log_dir = std::env::var("LOG_DIR").ok();
    init_logger_with_file(log_level.as_deref(), log_dir.as_deref());
}
