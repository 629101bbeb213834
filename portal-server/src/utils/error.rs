//! Unified Error Handling
//!
//! Application-wide error type and response envelope.
//!
//! Error codes are stable strings the frontend can branch on:
//!
//! | Prefix | Category |
//! |--------|----------|
//! | E0xxx  | Generic request errors |
//! | E1xxx  | Lifecycle / payment protocol errors |
//! | E2xxx  | Authorization errors |
//! | E3xxx  | Authentication errors |
//! | E5xxx  | Upstream (gateway) errors — retry-safe |
//! | E9xxx  | Server-side errors |

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use shared::models::RequestStatus;
use tracing::error;

/// Unified API response structure
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// Application-level error type
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== Authentication Errors ==========
    #[error("Authentication required")]
    Unauthorized,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token: {0}")]
    InvalidToken(String),

    #[error("Permission denied: {0}")]
    Forbidden(String),

    // ========== Generic Request Errors ==========
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Resource conflict: {0}")]
    Conflict(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    // ========== Request Lifecycle Errors ==========
    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: RequestStatus,
        to: RequestStatus,
    },

    #[error("Amount must be set before the request can be completed")]
    MissingAmount,

    // ========== Payment Protocol Errors ==========
    /// The request is not in the one status payment is allowed from.
    /// Carries the current status so the caller can render accurate
    /// guidance, not just log text.
    #[error("Service request is not ready for payment (status: {0})")]
    NotReady(RequestStatus),

    #[error("Final amount has not been set yet")]
    AmountNotSet,

    #[error("Payment gateway unavailable: {0}")]
    GatewayUnavailable(String),

    #[error("Payment order mismatch")]
    OrderMismatch,

    #[error("Payment signature verification failed")]
    SignatureInvalid,

    /// Settlement left half-applied: the payment is completed but the
    /// request write did not land. Never shown to clients; logged and
    /// repaired by the reconciliation pass.
    #[error("Settlement incomplete for payment {payment_id} (request {request_id})")]
    ReconciliationRequired { payment_id: i64, request_id: i64 },

    // ========== System Errors ==========
    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Status-specific guidance for a request that is not payable yet.
/// These strings are part of the API contract, not log text.
pub fn not_ready_message(status: RequestStatus) -> &'static str {
    match status {
        RequestStatus::Pending => {
            "Service is still pending. Payment will be enabled after completion."
        }
        RequestStatus::InProgress => {
            "Service is still in progress. Payment will be enabled after completion."
        }
        RequestStatus::Paid => "This service has already been paid for.",
        RequestStatus::Cancelled => "This service request has been cancelled.",
        RequestStatus::Completed => "Service is ready for payment.",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Authentication errors (401)
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, "E3001", "Please login first".to_string())
            }
            AppError::TokenExpired => {
                (StatusCode::UNAUTHORIZED, "E3003", "Token expired".to_string())
            }
            AppError::InvalidToken(_) => {
                (StatusCode::UNAUTHORIZED, "E3002", "Invalid token".to_string())
            }

            // Authorization errors (403)
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "E2001", msg.clone()),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "E0003", msg.clone()),

            // Conflict (409)
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "E0004", msg.clone()),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "E0002", msg.clone()),

            // Lifecycle errors (422)
            AppError::InvalidTransition { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "E1001", self.to_string())
            }
            AppError::MissingAmount => {
                (StatusCode::UNPROCESSABLE_ENTITY, "E1002", self.to_string())
            }

            // Payment protocol errors
            AppError::NotReady(status) => (
                StatusCode::CONFLICT,
                "E1003",
                not_ready_message(*status).to_string(),
            ),
            AppError::AmountNotSet => {
                (StatusCode::UNPROCESSABLE_ENTITY, "E1004", self.to_string())
            }
            AppError::OrderMismatch => (StatusCode::BAD_REQUEST, "E1005", self.to_string()),
            AppError::SignatureInvalid => (StatusCode::BAD_REQUEST, "E1006", self.to_string()),

            // Upstream errors (502) — safe to retry
            AppError::GatewayUnavailable(msg) => {
                error!(target: "gateway", error = %msg, "Payment gateway unavailable");
                (
                    StatusCode::BAD_GATEWAY,
                    "E5001",
                    "Payment gateway unavailable, please retry".to_string(),
                )
            }

            // Half-applied settlement (500) — internal only, repaired by reconcile
            AppError::ReconciliationRequired {
                payment_id,
                request_id,
            } => {
                error!(
                    target: "reconciliation",
                    payment_id,
                    request_id,
                    "Settlement left half-applied"
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9003",
                    "Internal server error".to_string(),
                )
            }

            // Database errors (500)
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "E9002", "Database error".to_string())
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "E9001",
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message,
            data: None,
        });

        (status, body).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        Self::Forbidden(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn invalid_token(msg: impl Into<String>) -> Self {
        Self::InvalidToken(msg.into())
    }

    /// Whether a client retry of the same call can succeed without any
    /// state change on our side.
    pub fn is_retry_safe(&self) -> bool {
        matches!(self, Self::GatewayUnavailable(_) | Self::Database(_))
    }
}

/// Application-level Result type
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_ready_messages_are_status_specific() {
        assert_eq!(
            not_ready_message(RequestStatus::Pending),
            "Service is still pending. Payment will be enabled after completion."
        );
        assert_eq!(
            not_ready_message(RequestStatus::InProgress),
            "Service is still in progress. Payment will be enabled after completion."
        );
        assert_eq!(
            not_ready_message(RequestStatus::Paid),
            "This service has already been paid for."
        );
        assert_eq!(
            not_ready_message(RequestStatus::Cancelled),
            "This service request has been cancelled."
        );
    }

    #[test]
    fn gateway_errors_are_retry_safe() {
        assert!(AppError::GatewayUnavailable("timeout".into()).is_retry_safe());
        assert!(!AppError::SignatureInvalid.is_retry_safe());
        assert!(!AppError::NotReady(RequestStatus::Pending).is_retry_safe());
    }
}

// ========== Helper functions ==========

/// Create a successful response
pub fn ok<T: Serialize>(data: T) -> Json<AppResponse<T>> {
    Json(AppResponse {
        code: "E0000".to_string(),
        message: "Success".to_string(),
        data: Some(data),
    })
}
