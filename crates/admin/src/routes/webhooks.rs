//! Shopify webhook intake.
//!
//! Shopify signs each delivery with HMAC-SHA256 over the raw body, base64
//! encoded in `X-Shopify-Hmac-Sha256`. Verification runs on the exact bytes
//! received - any body extractor that parses first would break the
//! signature.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    routing::post,
};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use hmac::{Hmac, Mac};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::Deserialize;
use sha2::Sha256;

use crate::db::{AnalyticsRepository, OrderRecord};
use crate::error::AppError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Build the webhook router.
pub fn router() -> Router<AppState> {
    Router::new().route("/webhooks/orders-paid", post(orders_paid))
}

// =============================================================================
// Signature Verification
// =============================================================================

/// Verify a webhook delivery signature.
///
/// `signature` is the base64-encoded HMAC-SHA256 of `body` under the shop's
/// webhook secret. Comparison is constant-time via `Mac::verify_slice`.
#[must_use]
pub fn verify_webhook_signature(secret: &str, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = BASE64.decode(signature) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

// =============================================================================
// Payload
// =============================================================================

/// Order id as delivered: a number in REST webhooks, occasionally a string.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OrderId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DiscountApplication {
    #[serde(default)]
    title: Option<String>,
}

/// The subset of the `orders/paid` payload we record.
#[derive(Debug, Deserialize)]
struct OrdersPaidPayload {
    id: OrderId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    contact_email: Option<String>,
    /// Money amounts arrive as decimal strings ("12.50").
    #[serde(default)]
    total_discounts: Option<String>,
    #[serde(default)]
    total_price: Option<String>,
    #[serde(default)]
    line_items: Vec<serde_json::Value>,
    #[serde(default)]
    discount_applications: Vec<DiscountApplication>,
}

fn parse_amount(raw: Option<&str>) -> Decimal {
    raw.and_then(|s| s.parse().ok()).unwrap_or(Decimal::ZERO)
}

impl OrdersPaidPayload {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn into_record(self, shop_domain: String) -> OrderRecord {
        // Funnel attribution keys off the first discount application
        // title, which is the discount message rather than a stable id.
        let funnel = self
            .discount_applications
            .first()
            .and_then(|a| a.title.clone());

        OrderRecord {
            order_id: self.id.to_string(),
            order_name: self.name,
            shop_domain,
            customer_email: self.email.or(self.contact_email),
            discount_amount: parse_amount(self.total_discounts.as_deref()),
            total_amount: parse_amount(self.total_price.as_deref()),
            line_items_count: self.line_items.len() as i32,
            funnel_id: funnel.clone(),
            funnel_name: funnel,
        }
    }
}

// =============================================================================
// Route Handlers
// =============================================================================

/// POST /webhooks/orders-paid - record order analytics.
///
/// Test deliveries (`X-Shopify-Test: true`) skip signature verification.
/// Recording failures still answer 200: Shopify retries are for transport
/// problems, and replaying an order we failed to store is handled by the
/// repository's idempotent insert.
async fn orders_paid(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    let is_test = headers
        .get("X-Shopify-Test")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == "true");

    if is_test {
        tracing::debug!("Test webhook delivery - skipping signature verification");
    } else {
        let signature = headers
            .get("X-Shopify-Hmac-Sha256")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing webhook signature".to_string()))?;

        let secret = state.config().webhook_secret.expose_secret();
        if !verify_webhook_signature(secret, &body, signature) {
            return Err(AppError::Unauthorized(
                "invalid webhook signature".to_string(),
            ));
        }
    }

    let payload: OrdersPaidPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("invalid payload: {e}")))?;

    let shop_domain = headers
        .get("X-Shopify-Shop-Domain")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
        .to_string();

    let record = payload.into_record(shop_domain);
    tracing::info!(
        order = %record.order_name,
        discount = %record.discount_amount,
        funnel = record.funnel_name.as_deref().unwrap_or("-"),
        "orders/paid webhook received"
    );

    let repo = AnalyticsRepository::new(state.pool());
    match repo.record_order(&record).await {
        Ok(true) => {}
        Ok(false) => tracing::debug!(order_id = %record.order_id, "Duplicate delivery ignored"),
        Err(e) => tracing::error!(error = %e, "Failed to record order analytics"),
    }

    Ok(Json(serde_json::json!({ "ok": true })).into_response())
}
