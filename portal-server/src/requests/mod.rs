//! Service request lifecycle
//!
//! The state machine and authorization guard for service requests. Every
//! mutation path except payment settlement goes through here; settlement
//! (the `paid` write) belongs exclusively to the payment verifier.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use shared::models::{
    RequestStatus, ServiceRequest, ServiceRequestCreate, ServiceRequestPatch,
};

use crate::auth::CurrentUser;
use crate::db::repository::{service, service_request};
use crate::db::repository::service_request::TransitionWrite;
use crate::notify::ChangeNotifier;
use crate::utils::validation::{MAX_NOTE_LEN, MAX_REF_LEN, validate_amount, validate_optional_text};
use crate::utils::{AppError, AppResult};

/// Submit a new service request (client-facing).
pub async fn create_request(
    pool: &SqlitePool,
    notifier: &ChangeNotifier,
    caller: &CurrentUser,
    data: ServiceRequestCreate,
) -> AppResult<ServiceRequest> {
    service::find_by_id(pool, data.service_id)
        .await?
        .filter(|s| s.is_active)
        .ok_or_else(|| AppError::not_found(format!("Service {} not found", data.service_id)))?;

    let request = service_request::create(pool, caller.id, data.service_id).await?;
    notifier.request_changed(pool, &request, "created").await;
    Ok(request)
}

/// Fetch a single request, guarded: owners see their own, staff see all.
pub async fn get_request(
    pool: &SqlitePool,
    caller: &CurrentUser,
    id: i64,
) -> AppResult<ServiceRequest> {
    let request = service_request::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Service request {id} not found")))?;
    if !caller.is_staff() && request.owner_id != caller.id {
        return Err(AppError::forbidden("Service request does not belong to you"));
    }
    Ok(request)
}

pub async fn list_own(pool: &SqlitePool, caller: &CurrentUser) -> AppResult<Vec<ServiceRequest>> {
    Ok(service_request::find_by_owner(pool, caller.id).await?)
}

pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<ServiceRequest>> {
    Ok(service_request::find_all(pool).await?)
}

/// Apply a staff patch to a request, enforcing the state machine.
pub async fn transition(
    pool: &SqlitePool,
    notifier: &ChangeNotifier,
    id: i64,
    caller: &CurrentUser,
    patch: ServiceRequestPatch,
) -> AppResult<ServiceRequest> {
    validate_optional_text(&patch.notes, "notes", MAX_NOTE_LEN)?;
    validate_optional_text(&patch.document_ref, "document_ref", MAX_REF_LEN)?;

    let current = service_request::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Service request {id} not found")))?;

    let write = resolve_transition(&current, caller, &patch)?;
    let status_changed = write.status != current.status;

    let updated = service_request::apply_transition(pool, id, write).await?;

    let action = if status_changed { "status_changed" } else { "updated" };
    notifier.request_changed(pool, &updated, action).await;

    Ok(updated)
}

/// Claim an unassigned request (first-claim-wins).
pub async fn claim(
    pool: &SqlitePool,
    id: i64,
    caller: &CurrentUser,
) -> AppResult<ServiceRequest> {
    if !caller.is_staff() {
        return Err(AppError::forbidden("Only staff may claim requests"));
    }

    let current = service_request::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Service request {id} not found")))?;
    if current.status.is_terminal() {
        return Err(AppError::Conflict(format!(
            "Service request is {} and can no longer be claimed",
            current.status
        )));
    }

    // Conditional write resolves concurrent claims to a single winner
    if !service_request::claim(pool, id, caller.id).await? {
        return Err(AppError::Conflict(
            "Service request is already claimed".to_string(),
        ));
    }

    let updated = service_request::find_by_id(pool, id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Service request {id} not found")))?;
    Ok(updated)
}

/// Validate a staff patch against the current row and resolve the final
/// values to persist. Pure; all I/O stays in the caller.
fn resolve_transition(
    current: &ServiceRequest,
    caller: &CurrentUser,
    patch: &ServiceRequestPatch,
) -> AppResult<TransitionWrite> {
    // All patch fields are staff-only; a client cannot transition at all.
    if !caller.is_staff() {
        return Err(AppError::forbidden(
            "Only staff may update service requests",
        ));
    }

    if patch.is_empty() {
        return Err(AppError::validation("Empty patch"));
    }

    if let Some(amount) = patch.amount {
        validate_amount(amount, "amount")?;
    }
    if let Some(progress) = patch.progress
        && !(0..=100).contains(&progress)
    {
        return Err(AppError::validation(format!(
            "progress must be between 0 and 100, got {progress}"
        )));
    }

    let target = patch.status.unwrap_or(current.status);

    if current.status.is_terminal() {
        // Terminal requests are fully immutable, field edits included.
        return Err(match patch.status {
            Some(to) => AppError::InvalidTransition {
                from: current.status,
                to,
            },
            None => AppError::Conflict(format!(
                "Service request is {} and can no longer be edited",
                current.status
            )),
        });
    }

    // Settlement is the verifier's transition; staff cannot write `paid`.
    if target == RequestStatus::Paid {
        return Err(AppError::forbidden(
            "Requests are marked paid by payment verification only",
        ));
    }

    if !current.status.can_transition_to(target) {
        return Err(AppError::InvalidTransition {
            from: current.status,
            to: target,
        });
    }

    let amount = patch.amount.or(current.amount);

    // A request may only complete once a chargeable amount exists.
    if target == RequestStatus::Completed && amount.unwrap_or(Decimal::ZERO) <= Decimal::ZERO {
        return Err(AppError::MissingAmount);
    }

    let progress = if target == RequestStatus::Completed {
        100
    } else {
        patch.progress.unwrap_or(current.progress)
    };

    Ok(TransitionWrite {
        status: target,
        progress,
        amount,
        notes: patch.notes.clone().or_else(|| current.notes.clone()),
        document_ref: patch
            .document_ref
            .clone()
            .or_else(|| current.document_ref.clone()),
    })
}
