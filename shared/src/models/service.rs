//! Service Catalog Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Catalog entry a client can request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub name: String,
    pub description: String,
    /// Indicative price shown in the catalog; the chargeable amount is
    /// always the staff-set figure on the request itself.
    pub base_price: Option<Decimal>,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

// Hand-written: `base_price` is Decimal stored as TEXT, which the FromRow
// derive cannot map.
#[cfg(feature = "db")]
impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for Service {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            description: row.try_get("description")?,
            base_price: super::money_column_opt(row, "base_price")?,
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
