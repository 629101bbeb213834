//! Data models
//!
//! Shared between portal-server and frontend (via API).
//! DB row types derive or implement `sqlx::FromRow` behind the `db`
//! feature. All IDs are `i64` (SQLite INTEGER PRIMARY KEY).
//!
//! Money is `rust_decimal::Decimal` everywhere in code, serialized as a
//! plain JSON number (`serde-with-float`) and stored as TEXT in SQLite,
//! which has no exact decimal type. The `money_column` helpers decode
//! that TEXT representation for the hand-written `FromRow` impls.

pub mod notification;
pub mod payment;
pub mod service;
pub mod service_request;

// Re-exports
pub use notification::*;
pub use payment::*;
pub use service::*;
pub use service_request::*;

#[cfg(feature = "db")]
fn parse_money(column: &str, raw: &str) -> Result<rust_decimal::Decimal, sqlx::Error> {
    raw.parse()
        .map_err(|e: rust_decimal::Error| sqlx::Error::ColumnDecode {
            index: column.to_string(),
            source: Box::new(e),
        })
}

#[cfg(feature = "db")]
pub(crate) fn money_column(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<rust_decimal::Decimal, sqlx::Error> {
    let raw: String = sqlx::Row::try_get(row, column)?;
    parse_money(column, &raw)
}

#[cfg(feature = "db")]
pub(crate) fn money_column_opt(
    row: &sqlx::sqlite::SqliteRow,
    column: &str,
) -> Result<Option<rust_decimal::Decimal>, sqlx::Error> {
    let raw: Option<String> = sqlx::Row::try_get(row, column)?;
    raw.as_deref().map(|s| parse_money(column, s)).transpose()
}
