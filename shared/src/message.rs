//! Change-notification payloads
//!
//! The server publishes these on its broadcast bus whenever a resource
//! mutates; the realtime transport collaborator delivers them to clients.

use serde::{Deserialize, Serialize};

use crate::models::RequestStatus;

/// Generic sync signal (server → all subscribed clients)
///
/// Broadcast whenever a resource changes so interested clients can refresh.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncPayload {
    /// Resource type (e.g. "service_request", "payment")
    pub resource: String,
    /// Per-resource monotonically increasing version
    pub version: u64,
    /// Change type (e.g. "created", "status_changed", "settled")
    pub action: String,
    /// Resource ID
    pub id: String,
    /// Resource data (optional)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Status-change diff for a service request (owner-facing)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestChange {
    pub request_id: i64,
    pub owner_id: i64,
    pub status: RequestStatus,
    pub progress: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
