//! Order issuer (phase one)
//!
//! Opens a gateway order for a completed request and records an inert
//! pending payment row. Nothing here mutates the request; only the
//! verifier does that.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use shared::models::{CreateOrderRequest, CreateOrderResponse, RequestStatus, ServiceRequest};
use shared::util::now_millis;

use crate::auth::CurrentUser;
use crate::db::repository::{payment, service_request};
use crate::payments::{pricing, PaymentGateway};
use crate::utils::validation::{validate_optional_text, MAX_NOTE_LEN};
use crate::utils::{AppError, AppResult};

/// Load a request and check it is payable by this caller.
///
/// Shared with the quote endpoint, which previews the same gate without
/// opening an order.
pub async fn payable_request(
    pool: &SqlitePool,
    caller: &CurrentUser,
    service_request_id: i64,
) -> AppResult<(ServiceRequest, Decimal)> {
    let request = service_request::find_by_id(pool, service_request_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!("Service request {service_request_id} not found"))
        })?;

    // Payment is strictly an owner action; staff settle nothing by hand.
    if request.owner_id != caller.id {
        return Err(AppError::forbidden("Service request does not belong to you"));
    }

    if request.status != RequestStatus::Completed {
        return Err(AppError::NotReady(request.status));
    }

    match request.amount {
        Some(amount) if amount > Decimal::ZERO => Ok((request, amount)),
        _ => Err(AppError::AmountNotSet),
    }
}

/// Open (or reuse) a payment order for a completed request.
pub async fn create_order(
    pool: &SqlitePool,
    gateway: &dyn PaymentGateway,
    currency: &str,
    caller: &CurrentUser,
    data: CreateOrderRequest,
) -> AppResult<CreateOrderResponse> {
    validate_optional_text(&data.description, "description", MAX_NOTE_LEN)?;

    let (request, amount) = payable_request(pool, caller, data.service_request_id).await?;
    let quote = pricing::quote(amount);
    let minor_units = pricing::to_minor_units(quote.total)
        .ok_or_else(|| AppError::internal("Payable total overflows minor units"))?;

    // An earlier abandoned checkout leaves a pending row behind; reuse it
    // as long as the priced total has not moved since.
    if let Some(existing) = payment::find_pending_for_request(pool, request.id).await?
        && existing.amount == quote.total
    {
        tracing::debug!(
            payment_id = existing.id,
            request_id = request.id,
            "Reusing pending payment order"
        );
        return Ok(CreateOrderResponse {
            gateway_order_id: existing.gateway_order_id.clone(),
            amount_minor_units: minor_units,
            currency: existing.currency.clone(),
            payment_id: existing.id,
            gateway_key_id: gateway.key_id().to_string(),
        });
    }

    let receipt = format!("receipt_{}", now_millis());
    let order = gateway
        .create_order(minor_units, currency, &receipt, data.description.as_deref())
        .await?;

    let created = payment::create(
        pool,
        caller.id,
        request.id,
        quote.total,
        currency,
        &order.order_id,
        data.description.as_deref(),
    )
    .await?;

    tracing::info!(
        payment_id = created.id,
        request_id = request.id,
        gateway_order_id = %order.order_id,
        amount = %quote.total,
        "Payment order issued"
    );

    Ok(CreateOrderResponse {
        gateway_order_id: order.order_id,
        amount_minor_units: minor_units,
        currency: currency.to_string(),
        payment_id: created.id,
        gateway_key_id: gateway.key_id().to_string(),
    })
}
