//! Service Catalog Repository

use super::RepoResult;
use shared::models::Service;
use sqlx::SqlitePool;

const SELECT_COLUMNS: &str =
    "SELECT id, name, description, base_price, is_active, created_at, updated_at FROM service";

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Service>> {
    let sql = format!("{SELECT_COLUMNS} WHERE is_active = 1 ORDER BY name");
    let rows = sqlx::query_as::<_, Service>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Service>> {
    let sql = format!("{SELECT_COLUMNS} WHERE id = ?");
    let row = sqlx::query_as::<_, Service>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}
