//! Server configuration
//!
//! Everything comes from the environment (a `.env` file is loaded in
//! `main` before this runs). Defaults target local development; the
//! gateway key pair and JWT secret must be set for production.

use std::env;

use crate::auth::JwtConfig;
use crate::payments::gateway::GatewayConfig;

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub database_path: String,
    pub jwt: JwtConfig,
    pub gateway: GatewayConfig,
    /// Seconds between reconciliation passes; 0 disables the loop.
    pub reconcile_interval_secs: u64,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            http_port: env_parse("HTTP_PORT", 8080),
            database_path: env_or("DATABASE_PATH", "portal.db"),
            jwt: JwtConfig::from_env(),
            gateway: GatewayConfig {
                key_id: env_or("GATEWAY_KEY_ID", "rzp_test_key"),
                key_secret: env_or("GATEWAY_KEY_SECRET", "rzp_test_secret"),
                base_url: env_or("GATEWAY_BASE_URL", "https://api.razorpay.com"),
                currency: env_or("GATEWAY_CURRENCY", "INR"),
                timeout_secs: env_parse("GATEWAY_TIMEOUT_SECS", 10),
            },
            reconcile_interval_secs: env_parse("RECONCILE_INTERVAL_SECS", 300),
        }
    }
}
