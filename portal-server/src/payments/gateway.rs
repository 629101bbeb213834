//! Payment gateway client
//!
//! The order issuer only needs one upstream call, so the seam is a small
//! trait; tests swap in a canned implementation instead of an HTTP server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::utils::{AppError, AppResult};

/// Gateway connection settings, loaded from the environment by
/// `core::Config`.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub base_url: String,
    pub currency: String,
    pub timeout_secs: u64,
}

/// An order opened on the gateway, referenced by callbacks later.
#[derive(Debug, Clone)]
pub struct GatewayOrder {
    pub order_id: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open an order for `amount_minor_units` and return its gateway id.
    async fn create_order(
        &self,
        amount_minor_units: i64,
        currency: &str,
        receipt: &str,
        notes: Option<&str>,
    ) -> AppResult<GatewayOrder>;

    /// Public key id the client SDK needs to open the checkout.
    fn key_id(&self) -> &str;
}

#[derive(Serialize)]
struct CreateOrderBody<'a> {
    amount: i64,
    currency: &'a str,
    receipt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
}

#[derive(Deserialize)]
struct CreateOrderReply {
    id: String,
}

/// Real HTTP gateway client. Every failure mode maps to
/// [`AppError::GatewayUnavailable`], which is retry-safe for the caller.
pub struct HttpPaymentGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl HttpPaymentGateway {
    pub fn new(config: GatewayConfig) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl PaymentGateway for HttpPaymentGateway {
    async fn create_order(
        &self,
        amount_minor_units: i64,
        currency: &str,
        receipt: &str,
        notes: Option<&str>,
    ) -> AppResult<GatewayOrder> {
        let url = format!("{}/v1/orders", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.config.key_id, Some(&self.config.key_secret))
            .json(&CreateOrderBody {
                amount: amount_minor_units,
                currency,
                receipt,
                notes,
            })
            .send()
            .await
            .map_err(|e| AppError::GatewayUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(target: "gateway", %status, body, "Order creation rejected");
            return Err(AppError::GatewayUnavailable(format!(
                "Order creation failed with status {status}"
            )));
        }

        let reply: CreateOrderReply = response
            .json()
            .await
            .map_err(|e| AppError::GatewayUnavailable(format!("Malformed order reply: {e}")))?;

        Ok(GatewayOrder { order_id: reply.id })
    }

    fn key_id(&self) -> &str {
        &self.config.key_id
    }
}
