//! Service Request Repository
//!
//! All request mutations funnel through the state machine in
//! `crate::requests`; this layer only talks SQL.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use super::{RepoError, RepoResult};
use shared::models::{RequestStatus, ServiceRequest};

const SELECT_COLUMNS: &str = "SELECT id, owner_id, service_id, status, progress, amount, assigned_staff_id, notes, document_ref, created_at, updated_at FROM service_request";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<ServiceRequest>> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
    let row = sqlx::query_as::<_, ServiceRequest>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn find_by_owner(pool: &SqlitePool, owner_id: i64) -> RepoResult<Vec<ServiceRequest>> {
    let sql = format!("{SELECT_COLUMNS} WHERE owner_id = ? ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, ServiceRequest>(&sql)
        .bind(owner_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<ServiceRequest>> {
    let sql = format!("{SELECT_COLUMNS} ORDER BY created_at DESC");
    let rows = sqlx::query_as::<_, ServiceRequest>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create(
    pool: &SqlitePool,
    owner_id: i64,
    service_id: i64,
) -> RepoResult<ServiceRequest> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO service_request (id, owner_id, service_id, status, progress, created_at, updated_at) VALUES (?1, ?2, ?3, 'pending', 0, ?4, ?4)",
    )
    .bind(id)
    .bind(owner_id)
    .bind(service_id)
    .bind(now)
    .execute(pool)
    .await?;
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create service request".into()))
}

/// Resolved values to persist for a guarded transition.
///
/// The state machine has already validated the patch; every field here is
/// the final value, not a delta.
#[derive(Debug, Clone)]
pub struct TransitionWrite {
    pub status: RequestStatus,
    pub progress: i64,
    pub amount: Option<Decimal>,
    pub notes: Option<String>,
    pub document_ref: Option<String>,
}

pub async fn apply_transition(
    pool: &SqlitePool,
    id: i64,
    write: TransitionWrite,
) -> RepoResult<ServiceRequest> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE service_request SET status = ?1, progress = ?2, amount = ?3, notes = ?4, document_ref = ?5, updated_at = ?6 WHERE id = ?7",
    )
    .bind(write.status)
    .bind(write.progress)
    .bind(write.amount.map(|a| a.to_string()))
    .bind(&write.notes)
    .bind(&write.document_ref)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Service request {id} not found")));
    }
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Service request {id} not found")))
}

/// Claim a request for a staff member.
///
/// Conditional write: succeeds only while `assigned_staff_id` is still
/// NULL, so concurrent claims resolve to a single winner. Returns whether
/// this caller won.
pub async fn claim(pool: &SqlitePool, id: i64, staff_id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE service_request SET assigned_staff_id = ?1, updated_at = ?2 WHERE id = ?3 AND assigned_staff_id IS NULL",
    )
    .bind(staff_id)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Settlement write: move the request to paid with progress forced to 100.
///
/// Only the payment verifier calls this; staff transitions cannot reach
/// `paid` through the state machine. Conditional on `completed` so a
/// request that left that status some other way (cancelled, or already
/// settled) is never overwritten. Returns whether the write landed.
pub async fn mark_paid(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE service_request SET status = 'paid', progress = 100, updated_at = ?1 WHERE id = ?2 AND status = 'completed'",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}
