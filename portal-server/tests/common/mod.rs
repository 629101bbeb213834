//! Shared test harness: in-memory database, canned gateway, callers.

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use portal_server::auth::{CurrentUser, Role};
use portal_server::db::MIGRATOR;
use portal_server::payments::{GatewayOrder, PaymentGateway};
use portal_server::utils::AppResult;

pub const TEST_GATEWAY_SECRET: &str = "test-gateway-secret";

/// Fresh in-memory database with migrations applied.
///
/// One connection only: each in-memory SQLite connection is its own
/// database, so the pool must never open a second one.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("Failed to parse sqlite options")
        .pragma("foreign_keys", "ON");
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");
    MIGRATOR.run(&pool).await.expect("Failed to run migrations");
    pool
}

pub fn client(id: i64) -> CurrentUser {
    CurrentUser {
        id,
        display_name: format!("client-{id}"),
        role: Role::Client,
    }
}

pub fn staff(id: i64) -> CurrentUser {
    CurrentUser {
        id,
        display_name: format!("staff-{id}"),
        role: Role::Staff,
    }
}

/// Gateway stand-in: hands out sequential order ids, never fails.
pub struct MockGateway {
    counter: AtomicU64,
    pub last_amount: AtomicU64,
}

impl MockGateway {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
            last_amount: AtomicU64::new(0),
        }
    }

    pub fn orders_created(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentGateway for MockGateway {
    async fn create_order(
        &self,
        amount_minor_units: i64,
        _currency: &str,
        _receipt: &str,
        _notes: Option<&str>,
    ) -> AppResult<GatewayOrder> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        self.last_amount
            .store(amount_minor_units as u64, Ordering::SeqCst);
        Ok(GatewayOrder {
            order_id: format!("order_test_{n}"),
        })
    }

    fn key_id(&self) -> &str {
        "rzp_test_key"
    }
}
