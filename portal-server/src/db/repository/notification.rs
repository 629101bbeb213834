//! Notification Repository

use super::{RepoError, RepoResult};
use shared::models::Notification;
use sqlx::SqlitePool;

const SELECT_COLUMNS: &str =
    "SELECT id, user_id, title, body, is_read, created_at FROM notification";

pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Notification>> {
    let sql = format!("{SELECT_COLUMNS} WHERE user_id = ? ORDER BY created_at DESC LIMIT 100");
    let rows = sqlx::query_as::<_, Notification>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn create(
    pool: &SqlitePool,
    user_id: i64,
    title: &str,
    body: &str,
) -> RepoResult<Notification> {
    let now = shared::util::now_millis();
    let id = shared::util::snowflake_id();
    sqlx::query(
        "INSERT INTO notification (id, user_id, title, body, is_read, created_at) VALUES (?1, ?2, ?3, ?4, 0, ?5)",
    )
    .bind(id)
    .bind(user_id)
    .bind(title)
    .bind(body)
    .bind(now)
    .execute(pool)
    .await?;
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
    sqlx::query_as::<_, Notification>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create notification".into()))
}

/// Mark one of the user's notifications as read. Scoped by user so a
/// caller cannot touch someone else's rows.
pub async fn mark_read(pool: &SqlitePool, id: i64, user_id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("UPDATE notification SET is_read = 1 WHERE id = ? AND user_id = ?")
        .bind(id)
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
