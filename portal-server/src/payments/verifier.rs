//! Payment verifier (phase two)
//!
//! Checks the gateway callback signature and settles in two writes:
//! payment first (the durable proof of capture), request second. If the
//! second write fails the payment row alone marks the settlement as
//! half-applied, and the reconciliation pass repairs it.

use sqlx::SqlitePool;

use shared::models::{Payment, PaymentStatus, RequestStatus, VerifyPaymentRequest, VerifyPaymentResponse};

use crate::auth::CurrentUser;
use crate::db::repository::{payment, service_request};
use crate::notify::ChangeNotifier;
use crate::payments::signature;
use crate::utils::{AppError, AppResult};

/// Verify a gateway callback and settle the payment.
///
/// Idempotent: re-verifying a completed payment succeeds without writing
/// anything (beyond healing a half-applied settlement if one is found).
pub async fn verify(
    pool: &SqlitePool,
    notifier: &ChangeNotifier,
    gateway_secret: &str,
    caller: &CurrentUser,
    data: VerifyPaymentRequest,
) -> AppResult<VerifyPaymentResponse> {
    let existing = payment::find_by_id(pool, data.payment_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Payment {} not found", data.payment_id)))?;

    if existing.owner_id != caller.id {
        return Err(AppError::forbidden("Payment does not belong to you"));
    }

    match existing.status {
        PaymentStatus::Completed => {
            // Retry after a success (or after a half-applied settlement):
            // nothing to verify again, just make sure the request caught up.
            settle_request(pool, notifier, &existing).await?;
            return Ok(VerifyPaymentResponse {
                success: true,
                message: "Payment already verified".to_string(),
                payment: existing,
            });
        }
        PaymentStatus::Failed => {
            return Err(AppError::Conflict(
                "Payment has already failed; create a new order".to_string(),
            ));
        }
        PaymentStatus::Pending => {}
    }

    settle_pending(pool, notifier, gateway_secret, data, existing).await
}

/// Conclude a pending payment against the callback data.
///
/// `pending` is the caller's snapshot; the conditional completion write
/// decides any race, and the loser re-reads and follows whatever outcome
/// actually landed.
async fn settle_pending(
    pool: &SqlitePool,
    notifier: &ChangeNotifier,
    gateway_secret: &str,
    data: VerifyPaymentRequest,
    pending: Payment,
) -> AppResult<VerifyPaymentResponse> {
    if data.gateway_order_id != pending.gateway_order_id {
        return Err(AppError::OrderMismatch);
    }

    let genuine = signature::verify(
        gateway_secret,
        &data.gateway_order_id,
        &data.gateway_payment_id,
        &data.gateway_signature,
    );

    if !genuine {
        // Record the rejected attempt with the identifiers it carried.
        // The request row stays untouched.
        payment::fail_if_pending(
            pool,
            pending.id,
            &data.gateway_payment_id,
            &data.gateway_signature,
        )
        .await?;
        tracing::warn!(
            target: "security",
            payment_id = pending.id,
            request_id = pending.service_request_id,
            "Payment signature verification failed"
        );
        return Err(AppError::SignatureInvalid);
    }

    let won = payment::complete_if_pending(
        pool,
        pending.id,
        &data.gateway_payment_id,
        &data.gateway_signature,
    )
    .await?;

    if !won {
        // A concurrent verify got there first; follow its outcome.
        let latest = payment::find_by_id(pool, pending.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Payment {} not found", pending.id)))?;
        return match latest.status {
            PaymentStatus::Completed => {
                settle_request(pool, notifier, &latest).await?;
                Ok(VerifyPaymentResponse {
                    success: true,
                    message: "Payment already verified".to_string(),
                    payment: latest,
                })
            }
            _ => Err(AppError::Conflict(
                "Payment was concluded by a concurrent verification".to_string(),
            )),
        };
    }

    let settled = payment::find_by_id(pool, pending.id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Payment {} not found", pending.id)))?;

    settle_request(pool, notifier, &settled).await?;
    notifier.publish("payment", "settled", &settled.id.to_string(), None);

    tracing::info!(
        payment_id = settled.id,
        request_id = settled.service_request_id,
        "Payment verified and settled"
    );

    Ok(VerifyPaymentResponse {
        success: true,
        message: "Payment verified successfully".to_string(),
        payment: settled,
    })
}

/// Bring the request row in line with a completed payment.
///
/// The write is conditional on the request still being `completed`: a
/// request already settled is a no-op success, anything else (a cancel
/// that landed mid-checkout, a vanished row) stays untouched and is
/// escalated for manual reconciliation.
async fn settle_request(
    pool: &SqlitePool,
    notifier: &ChangeNotifier,
    paid: &Payment,
) -> AppResult<()> {
    let half_applied = || AppError::ReconciliationRequired {
        payment_id: paid.id,
        request_id: paid.service_request_id,
    };

    let wrote = match service_request::mark_paid(pool, paid.service_request_id).await {
        Ok(wrote) => wrote,
        Err(e) => {
            tracing::error!(
                target: "reconciliation",
                payment_id = paid.id,
                request_id = paid.service_request_id,
                error = %e,
                "Request settlement write failed after payment completion"
            );
            return Err(half_applied());
        }
    };

    if !wrote {
        let current = service_request::find_by_id(pool, paid.service_request_id)
            .await
            .ok()
            .flatten();
        return match current {
            Some(request) if request.status == RequestStatus::Paid => Ok(()),
            other => {
                tracing::error!(
                    target: "reconciliation",
                    payment_id = paid.id,
                    request_id = paid.service_request_id,
                    status = ?other.map(|r| r.status),
                    "Completed payment references a request that cannot be settled"
                );
                Err(half_applied())
            }
        };
    }

    if let Some(updated) = service_request::find_by_id(pool, paid.service_request_id)
        .await
        .ok()
        .flatten()
    {
        notifier.request_changed(pool, &updated, "status_changed").await;
    }
    Ok(())
}

/// Repair half-applied settlements: completed payments whose request never
/// reached `paid`. Run at startup and on an interval.
pub async fn reconcile(pool: &SqlitePool, notifier: &ChangeNotifier) -> AppResult<usize> {
    let unsettled = payment::find_unsettled(pool).await?;
    let mut repaired = 0;
    for paid in &unsettled {
        match settle_request(pool, notifier, paid).await {
            Ok(()) => {
                repaired += 1;
                tracing::info!(
                    target: "reconciliation",
                    payment_id = paid.id,
                    request_id = paid.service_request_id,
                    "Repaired half-applied settlement"
                );
            }
            Err(e) => {
                tracing::error!(
                    target: "reconciliation",
                    payment_id = paid.id,
                    request_id = paid.service_request_id,
                    error = %e,
                    "Settlement repair failed, will retry next pass"
                );
            }
        }
    }
    Ok(repaired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    use rust_decimal::Decimal;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    use crate::db::MIGRATOR;
    use crate::db::repository::service_request::TransitionWrite;
    use shared::models::ServiceRequest;

    const SECRET: &str = "test-gateway-secret";

    async fn test_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("Failed to parse sqlite options")
            .pragma("foreign_keys", "ON");
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("Failed to open in-memory database");
        MIGRATOR.run(&pool).await.expect("Failed to run migrations");
        pool
    }

    /// A completed request with an open checkout: one pending payment row.
    async fn open_checkout(pool: &SqlitePool) -> (ServiceRequest, Payment) {
        let request = service_request::create(pool, 42, 1).await.unwrap();
        let request = service_request::apply_transition(
            pool,
            request.id,
            TransitionWrite {
                status: RequestStatus::Completed,
                progress: 100,
                amount: Some(Decimal::from(5000)),
                notes: None,
                document_ref: None,
            },
        )
        .await
        .unwrap();
        let pending = payment::create(
            pool,
            42,
            request.id,
            Decimal::from(5900),
            "INR",
            "order_race",
            None,
        )
        .await
        .unwrap();
        (request, pending)
    }

    fn callback(pending: &Payment, gateway_payment_id: &str) -> VerifyPaymentRequest {
        VerifyPaymentRequest {
            payment_id: pending.id,
            gateway_order_id: pending.gateway_order_id.clone(),
            gateway_payment_id: gateway_payment_id.to_string(),
            gateway_signature: signature::expected_signature(
                SECRET,
                &pending.gateway_order_id,
                gateway_payment_id,
            ),
        }
    }

    #[tokio::test]
    async fn losing_the_completion_write_takes_the_idempotent_path() {
        let pool = test_pool().await;
        let notifier = ChangeNotifier::new();
        let (request, pending) = open_checkout(&pool).await;

        // Another verification completes the payment first; this caller
        // still holds the pending snapshot.
        let data = callback(&pending, "pay_first");
        assert!(
            payment::complete_if_pending(&pool, pending.id, "pay_first", &data.gateway_signature)
                .await
                .unwrap()
        );

        let reply = settle_pending(&pool, &notifier, SECRET, data, pending)
            .await
            .unwrap();
        assert!(reply.success);
        assert_eq!(reply.message, "Payment already verified");
        assert_eq!(reply.payment.status, PaymentStatus::Completed);

        // The loser still drives the request home.
        let settled = service_request::find_by_id(&pool, request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(settled.status, RequestStatus::Paid);
        assert_eq!(settled.progress, 100);
    }

    #[tokio::test]
    async fn losing_to_a_failed_conclusion_is_a_conflict() {
        let pool = test_pool().await;
        let notifier = ChangeNotifier::new();
        let (request, pending) = open_checkout(&pool).await;

        // A forged attempt already burned the payment row.
        assert!(
            payment::fail_if_pending(&pool, pending.id, "pay_forged", "bad-signature")
                .await
                .unwrap()
        );

        let err = settle_pending(&pool, &notifier, SECRET, callback(&pending, "pay_real"), pending)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        let request = service_request::find_by_id(&pool, request.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(request.status, RequestStatus::Completed);
    }
}
