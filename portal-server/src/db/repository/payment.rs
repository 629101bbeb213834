//! Payment Repository
//!
//! Status moves pending → {completed | failed} exactly once; both outcome
//! writes are conditional on the row still being pending.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use shared::models::Payment;

const SELECT_COLUMNS: &str = "SELECT id, owner_id, service_request_id, amount, currency, gateway_order_id, gateway_payment_id, gateway_signature, status, description, created_at FROM payment";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Payment>> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
    let row = sqlx::query_as::<_, Payment>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_owner(pool: &SqlitePool, owner_id: i64) -> RepoResult<Vec<Payment>> {
    let sql = format!("{SELECT_COLUMNS} WHERE owner_id = ? ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, Payment>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Existing pending payment for a request, newest first.
///
/// Used by the order issuer to reuse an inert pending row instead of
/// issuing a fresh gateway order.
pub async fn find_pending_for_request(
    pool: &SqlitePool,
    service_request_id: i64,
) -> RepoResult<Option<Payment>> {
    let sql = format!(
        "{SELECT_COLUMNS} WHERE service_request_id = ? AND status = 'pending' ORDER BY created_at DESC LIMIT 1"
    );
    let row = sqlx::query_as::<_, Payment>(&sql)
        .bind(service_request_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

#[allow(clippy::too_many_arguments)]
pub async fn create(
    pool: &SqlitePool,
    owner_id: i64,
    service_request_id: i64,
    amount: Decimal,
    currency: &str,
    gateway_order_id: &str,
    description: Option<&str>,
) -> RepoResult<Payment> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO payment (id, owner_id, service_request_id, amount, currency, gateway_order_id, status, description, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, 'pending', ?7, ?8)",
    )
    .bind(id)
    .bind(owner_id)
    .bind(service_request_id)
    .bind(amount.to_string())
    .bind(currency)
    .bind(gateway_order_id)
    .bind(description)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create payment".into()))
}

/// Move a pending payment to completed, recording the gateway identifiers.
///
/// Conditional on `status = 'pending'` so concurrent verifications
/// serialize: the loser sees zero rows affected, re-reads and takes the
/// idempotent path. Returns whether this caller performed the write.
pub async fn complete_if_pending(
    pool: &SqlitePool,
    id: i64,
    gateway_payment_id: &str,
    gateway_signature: &str,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE payment SET status = 'completed', gateway_payment_id = ?1, gateway_signature = ?2 WHERE id = ?3 AND status = 'pending'",
    )
    .bind(gateway_payment_id)
    .bind(gateway_signature)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Move a pending payment to failed, keeping the supplied gateway
/// identifiers for audit.
pub async fn fail_if_pending(
    pool: &SqlitePool,
    id: i64,
    gateway_payment_id: &str,
    gateway_signature: &str,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "UPDATE payment SET status = 'failed', gateway_payment_id = ?1, gateway_signature = ?2 WHERE id = ?3 AND status = 'pending'",
    )
    .bind(gateway_payment_id)
    .bind(gateway_signature)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Completed payments whose request is still sitting at `completed`, the
/// recoverable half-applied settlement state. A request in any other
/// status (cancelled in particular) is not the reconciler's to touch.
pub async fn find_unsettled(pool: &SqlitePool) -> RepoResult<Vec<Payment>> {
    let sql = format!(
        "{SELECT_COLUMNS} WHERE status = 'completed' AND service_request_id IN (SELECT id FROM service_request WHERE status = 'completed')"
    );
    let rows = sqlx::query_as::<_, Payment>(&sql).fetch_all(pool).await?;
    Ok(rows)
}
