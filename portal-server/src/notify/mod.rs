//! Change Notifier
//!
//! Observes request mutations and pushes status-changed events to the
//! owning client. Two sinks:
//!
//! - an in-process broadcast bus the realtime transport collaborator
//!   subscribes to (any pub/sub transport satisfies the contract), and
//! - a persisted `notification` row so the owner sees the change on next
//!   load even without a live subscription.

use dashmap::DashMap;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::broadcast;

use shared::message::{RequestChange, SyncPayload};
use shared::models::{RequestStatus, ServiceRequest};

use crate::db::repository::notification;

/// Per-resource version counters.
///
/// Lock-free via DashMap; each resource type gets an independently
/// incrementing version so clients can order events and detect gaps.
#[derive(Debug)]
pub struct ResourceVersions {
    versions: DashMap<String, u64>,
}

impl ResourceVersions {
    pub fn new() -> Self {
        Self {
            versions: DashMap::new(),
        }
    }

    /// Increment the version for a resource and return the new value.
    pub fn increment(&self, resource: &str) -> u64 {
        let mut entry = self.versions.entry(resource.to_string()).or_insert(0);
        *entry += 1;
        *entry
    }

    pub fn get(&self, resource: &str) -> u64 {
        self.versions.get(resource).map(|v| *v).unwrap_or(0)
    }
}

impl Default for ResourceVersions {
    fn default() -> Self {
        Self::new()
    }
}

const BUS_CAPACITY: usize = 256;

/// Broadcast bus plus notification persistence.
#[derive(Clone, Debug)]
pub struct ChangeNotifier {
    tx: broadcast::Sender<SyncPayload>,
    versions: Arc<ResourceVersions>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            tx,
            versions: Arc::new(ResourceVersions::new()),
        }
    }

    /// Subscribe to change events (for the realtime transport collaborator).
    pub fn subscribe(&self) -> broadcast::Receiver<SyncPayload> {
        self.tx.subscribe()
    }

    /// Publish a raw sync event. Send errors only mean no subscriber is
    /// listening, which is fine.
    pub fn publish(&self, resource: &str, action: &str, id: &str, data: Option<serde_json::Value>) {
        let version = self.versions.increment(resource);
        let payload = SyncPayload {
            resource: resource.to_string(),
            version,
            action: action.to_string(),
            id: id.to_string(),
            data,
        };
        let _ = self.tx.send(payload);
    }

    /// Publish a request change and persist a notification for the owner.
    ///
    /// Called on every successful transition and settlement. Notification
    /// persistence failures are logged, never propagated: the mutation
    /// itself already succeeded.
    pub async fn request_changed(&self, pool: &SqlitePool, request: &ServiceRequest, action: &str) {
        let change = RequestChange {
            request_id: request.id,
            owner_id: request.owner_id,
            status: request.status,
            progress: request.progress,
            notes: request.notes.clone(),
        };
        self.publish(
            "service_request",
            action,
            &request.id.to_string(),
            serde_json::to_value(&change).ok(),
        );

        let (title, body) = notification_text(request.status, request.progress);
        if let Err(e) = notification::create(pool, request.owner_id, title, &body).await {
            tracing::error!(
                request_id = request.id,
                error = %e,
                "Failed to persist status notification"
            );
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

fn notification_text(status: RequestStatus, progress: i64) -> (&'static str, String) {
    match status {
        RequestStatus::Pending => (
            "Request received",
            "Your service request has been received and is awaiting review.".to_string(),
        ),
        RequestStatus::InProgress => (
            "Work started",
            format!("Your service request is in progress ({progress}%)."),
        ),
        RequestStatus::Completed => (
            "Service completed",
            "Your service is complete. You can now proceed to payment.".to_string(),
        ),
        RequestStatus::Paid => (
            "Payment received",
            "Your payment was verified. Thank you!".to_string(),
        ),
        RequestStatus::Cancelled => (
            "Request cancelled",
            "Your service request has been cancelled.".to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_increment_per_resource() {
        let versions = ResourceVersions::new();
        assert_eq!(versions.increment("service_request"), 1);
        assert_eq!(versions.increment("service_request"), 2);
        assert_eq!(versions.increment("payment"), 1);
        assert_eq!(versions.get("service_request"), 2);
        assert_eq!(versions.get("unknown"), 0);
    }

    #[tokio::test]
    async fn publish_reaches_subscribers_in_order() {
        let notifier = ChangeNotifier::new();
        let mut rx = notifier.subscribe();

        notifier.publish("service_request", "created", "1", None);
        notifier.publish("service_request", "status_changed", "1", None);

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.action, "created");
        assert_eq!(first.version, 1);
        assert_eq!(second.action, "status_changed");
        assert_eq!(second.version, 2);
    }

    #[test]
    fn publish_without_subscribers_does_not_panic() {
        let notifier = ChangeNotifier::new();
        notifier.publish("payment", "settled", "9", None);
    }
}
