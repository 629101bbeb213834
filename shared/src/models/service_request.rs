//! Service Request Model
//!
//! A service request is the unit of work a client buys: created by the
//! client, fulfilled by staff, settled by the payment verifier.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Service request lifecycle status.
///
/// Statuses only move forward along pending → in_progress → completed →
/// paid. `cancelled` is reachable from any non-terminal state. `paid` and
/// `cancelled` are terminal.
///
/// Stored as snake_case TEXT. The historic "in-progress" alias is remapped
/// at startup (see the server's status migration), so the enum itself is
/// strict.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "snake_case"))]
pub enum RequestStatus {
    Pending,
    InProgress,
    Completed,
    Paid,
    Cancelled,
}

impl Default for RequestStatus {
    fn default() -> Self {
        Self::Pending
    }
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Paid => "paid",
            Self::Cancelled => "cancelled",
        }
    }

    /// Terminal statuses accept no further writes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Paid | Self::Cancelled)
    }

    /// Position along the forward path (terminal `cancelled` sits outside it).
    fn rank(&self) -> Option<u8> {
        match self {
            Self::Pending => Some(0),
            Self::InProgress => Some(1),
            Self::Completed => Some(2),
            Self::Paid => Some(3),
            Self::Cancelled => None,
        }
    }

    /// Whether `target` is a legal next status from `self`.
    ///
    /// Forward-only along the path; `cancelled` is reachable from any
    /// non-terminal state; terminal statuses accept nothing, not even a
    /// re-statement of themselves. Re-stating a non-terminal status is a
    /// no-op refresh of the other fields.
    pub fn can_transition_to(&self, target: RequestStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        if *self == target {
            return true;
        }
        match target {
            RequestStatus::Cancelled => true,
            _ => match (self.rank(), target.rank()) {
                (Some(from), Some(to)) => to == from + 1,
                _ => false,
            },
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Service request entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: i64,

    /// Requesting client (immutable after creation)
    pub owner_id: i64,

    /// Catalog entry this request is for (immutable)
    pub service_id: i64,

    pub status: RequestStatus,

    /// Completion percentage, 0-100. Forced to 100 on completed/paid.
    pub progress: i64,

    /// Staff-set base amount in major currency units, pre-tax
    pub amount: Option<Decimal>,

    /// Staff member who claimed the request (claim-once)
    pub assigned_staff_id: Option<i64>,

    /// Staff notes, visible to the owner
    pub notes: Option<String>,

    /// Reference to an externally stored deliverable
    pub document_ref: Option<String>,

    pub created_at: i64,
    pub updated_at: i64,
}

// Hand-written: `amount` is Decimal stored as TEXT, which the FromRow
// derive cannot map.
#[cfg(feature = "db")]
impl sqlx::FromRow<'_, sqlx::sqlite::SqliteRow> for ServiceRequest {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            service_id: row.try_get("service_id")?,
            status: row.try_get("status")?,
            progress: row.try_get("progress")?,
            amount: super::money_column_opt(row, "amount")?,
            assigned_staff_id: row.try_get("assigned_staff_id")?,
            notes: row.try_get("notes")?,
            document_ref: row.try_get("document_ref")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Create payload (client-facing request submission)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceRequestCreate {
    pub service_id: i64,
}

/// Staff-facing transition payload
///
/// Any subset of fields may be supplied; all of them are staff-only.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceRequestPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RequestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_ref: Option<String>,
}

impl ServiceRequestPatch {
    /// True when the patch touches no field at all.
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.progress.is_none()
            && self.amount.is_none()
            && self.notes.is_none()
            && self.document_ref.is_none()
    }
}

/// Payable preview for a completed request (base + tax breakdown)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PayableQuote {
    pub base_amount: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_transitions_allowed() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::InProgress));
        assert!(RequestStatus::InProgress.can_transition_to(RequestStatus::Completed));
        assert!(RequestStatus::Completed.can_transition_to(RequestStatus::Paid));
    }

    #[test]
    fn backward_and_skipping_transitions_rejected() {
        assert!(!RequestStatus::InProgress.can_transition_to(RequestStatus::Pending));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Completed));
        assert!(!RequestStatus::Pending.can_transition_to(RequestStatus::Paid));
        assert!(!RequestStatus::Completed.can_transition_to(RequestStatus::InProgress));
    }

    #[test]
    fn cancel_reachable_from_non_terminal_only() {
        assert!(RequestStatus::Pending.can_transition_to(RequestStatus::Cancelled));
        assert!(RequestStatus::InProgress.can_transition_to(RequestStatus::Cancelled));
        assert!(RequestStatus::Completed.can_transition_to(RequestStatus::Cancelled));
        assert!(!RequestStatus::Paid.can_transition_to(RequestStatus::Cancelled));
        assert!(!RequestStatus::Cancelled.can_transition_to(RequestStatus::Pending));
    }

    #[test]
    fn terminal_states_are_frozen() {
        for target in [
            RequestStatus::Pending,
            RequestStatus::InProgress,
            RequestStatus::Completed,
            RequestStatus::Cancelled,
        ] {
            assert!(!RequestStatus::Paid.can_transition_to(target));
        }
        assert!(!RequestStatus::Cancelled.can_transition_to(RequestStatus::Paid));
    }

    #[test]
    fn same_status_is_a_noop_refresh_unless_terminal() {
        assert!(RequestStatus::InProgress.can_transition_to(RequestStatus::InProgress));
        assert!(!RequestStatus::Paid.can_transition_to(RequestStatus::Paid));
        assert!(!RequestStatus::Cancelled.can_transition_to(RequestStatus::Cancelled));
    }
}
