//! Payment Model
//!
//! One row per gateway order issuance. At most one payment per service
//! request ever reaches `completed`; stale pending rows are inert.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Payment settlement status. Moves pending → {completed | failed} exactly
/// once; both outcomes are final.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl Default for PaymentStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payment entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,

    /// Equals the owning service request's owner
    pub owner_id: i64,

    pub service_request_id: i64,

    /// Total payable (base + tax) in major currency units, immutable
    pub amount: Decimal,

    pub currency: String,

    /// Order identifier returned by the gateway at issuance, immutable
    pub gateway_order_id: String,

    /// Set at verification time (kept on failure for audit)
    pub gateway_payment_id: Option<String>,
    pub gateway_signature: Option<String>,

    pub status: PaymentStatus,

    pub description: Option<String>,
    pub created_at: i64,
}

// Hand-written: `amount` is Decimal stored as TEXT, which the FromRow
// derive cannot map.
#[cfg(feature = "db")]
impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for Payment {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            service_request_id: row.try_get("service_request_id")?,
            amount: super::money_column(row, "amount")?,
            currency: row.try_get("currency")?,
            gateway_order_id: row.try_get("gateway_order_id")?,
            gateway_payment_id: row.try_get("gateway_payment_id")?,
            gateway_signature: row.try_get("gateway_signature")?,
            status: row.try_get("status")?,
            description: row.try_get("description")?,
            created_at: row.try_get("created_at")?,
        })
    }
}

/// Order issuance request (client-facing)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderRequest {
    pub service_request_id: i64,
    pub description: Option<String>,
}

/// Order issuance response — everything the client needs to drive the
/// gateway checkout UI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub gateway_order_id: String,
    pub amount_minor_units: i64,
    pub currency: String,
    pub payment_id: i64,
    pub gateway_key_id: String,
}

/// Verification request — the signed result the gateway handed the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub payment_id: i64,
    pub gateway_order_id: String,
    pub gateway_payment_id: String,
    pub gateway_signature: String,
}

/// Verification response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
    pub message: String,
    pub payment: Payment,
}
