//! Shared types for the client-services portal
//!
//! Common types used by the server and any future client tooling:
//! domain models, sync/notification payloads and ID/time utilities.

pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use message::{RequestChange, SyncPayload};
