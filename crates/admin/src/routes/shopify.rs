//! Shopify Admin API OAuth routes.
//!
//! These routes connect the panel to the shop's Admin API. The CSRF `state`
//! parameter lives in an in-process TTL cache; each state is single-use.

use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use tracing::instrument;

use crate::db::ShopifyTokenRepository;
use crate::state::AppState;

/// Required scopes for the Admin API.
const ADMIN_SCOPES: &[&str] = &[
    "read_products",
    "read_orders",
    "read_discounts",
    "write_discounts",
];

// =============================================================================
// Templates
// =============================================================================

/// Shopify settings page template.
#[derive(Template)]
#[template(path = "shopify/settings.html")]
pub struct ShopifySettingsTemplate {
    pub connected: bool,
    pub shop: String,
    pub scopes: Vec<String>,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Build the Shopify OAuth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shopify", get(settings_page))
        .route("/shopify/connect", get(connect))
        .route("/shopify/disconnect", get(disconnect))
        .route("/shopify/callback", get(callback))
}

// =============================================================================
// Query Parameters
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct SettingsQueryParams {
    pub success: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OAuthCallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub shop: Option<String>,
    pub hmac: Option<String>,
    pub timestamp: Option<String>,
    pub host: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

// =============================================================================
// HMAC Verification
// =============================================================================

type HmacSha256 = Hmac<Sha256>;

/// Verify the HMAC signature from the Shopify OAuth callback.
///
/// The message is the sorted query string minus the `hmac` parameter;
/// the signature is hex encoded. Comparison is constant-time via
/// `Mac::verify_slice`.
fn verify_shopify_hmac(params: &OAuthCallbackParams, client_secret: &str) -> bool {
    let Some(provided_hmac) = &params.hmac else {
        return false;
    };
    let Ok(expected) = hex::decode(provided_hmac) else {
        return false;
    };

    // Build the message from sorted params (excluding hmac and signature)
    let mut param_pairs: Vec<(&str, &String)> = Vec::new();

    if let Some(v) = &params.code {
        param_pairs.push(("code", v));
    }
    if let Some(v) = &params.host {
        param_pairs.push(("host", v));
    }
    if let Some(v) = &params.shop {
        param_pairs.push(("shop", v));
    }
    if let Some(v) = &params.state {
        param_pairs.push(("state", v));
    }
    if let Some(v) = &params.timestamp {
        param_pairs.push(("timestamp", v));
    }

    param_pairs.sort_by(|a, b| a.0.cmp(b.0));

    let message: String = param_pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    let Ok(mut mac) = HmacSha256::new_from_slice(client_secret.as_bytes()) else {
        return false;
    };
    mac.update(message.as_bytes());
    mac.verify_slice(&expected).is_ok()
}

// =============================================================================
// Route Handlers
// =============================================================================

/// GET /shopify - Shopify settings page.
#[instrument(skip(state))]
async fn settings_page(
    State(state): State<AppState>,
    Query(params): Query<SettingsQueryParams>,
) -> Response {
    let shop = state.shopify().store().to_string();
    let repo = ShopifyTokenRepository::new(state.pool());
    let token = repo.get_by_shop(&shop).await.ok().flatten();
    let connected = token.is_some();
    let scopes = token.map_or_else(Vec::new, |t| t.scopes);

    let success_message = params.success.as_deref().map(|s| match s {
        "connected" => "Successfully connected to Shopify!".to_string(),
        "disconnected" => "Successfully disconnected from Shopify.".to_string(),
        _ => format!("Success: {s}"),
    });

    let error_message = params.error.as_deref().map(|e| match e {
        "oauth_denied" => "OAuth authorization was denied.".to_string(),
        "oauth_invalid_hmac" => "Invalid security signature. Please try again.".to_string(),
        "oauth_invalid_state" => "Invalid state parameter. Please try again.".to_string(),
        "oauth_failed" => "OAuth flow failed. Please try again.".to_string(),
        "oauth_exchange_failed" => "Failed to exchange authorization code.".to_string(),
        "oauth_save_failed" => "Failed to save credentials.".to_string(),
        "disconnect_failed" => "Failed to disconnect from Shopify.".to_string(),
        _ => format!("Error: {e}"),
    });

    let template = ShopifySettingsTemplate {
        connected,
        shop,
        scopes,
        success_message,
        error_message,
    };

    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
    .into_response()
}

/// GET /shopify/connect - start the OAuth flow.
#[instrument(skip(state))]
async fn connect(State(state): State<AppState>) -> Response {
    // Random state parameter for CSRF protection
    let oauth_state = uuid::Uuid::new_v4().to_string();
    state.store_oauth_state(oauth_state.clone()).await;

    let redirect_uri = format!("{}/shopify/callback", state.config().base_url);
    let auth_url = state
        .shopify()
        .authorization_url(&redirect_uri, ADMIN_SCOPES, &oauth_state);

    tracing::info!("Redirecting to Shopify OAuth");
    Redirect::to(&auth_url).into_response()
}

/// GET /shopify/callback - handle the OAuth callback.
#[instrument(skip(state, params))]
async fn callback(
    State(state): State<AppState>,
    Query(params): Query<OAuthCallbackParams>,
) -> Response {
    if let Some(error) = &params.error {
        let description = params.error_description.as_deref().unwrap_or_default();
        tracing::error!("Shopify OAuth error: {} - {}", error, description);
        return Redirect::to("/shopify?error=oauth_denied").into_response();
    }

    if !verify_shopify_hmac(&params, state.shopify().client_secret()) {
        tracing::error!("Invalid HMAC signature in OAuth callback");
        return Redirect::to("/shopify?error=oauth_invalid_hmac").into_response();
    }

    let Some(code) = &params.code else {
        tracing::error!("Missing authorization code in callback");
        return Redirect::to("/shopify?error=oauth_failed").into_response();
    };

    let Some(callback_state) = &params.state else {
        tracing::error!("Missing state parameter in callback");
        return Redirect::to("/shopify?error=oauth_failed").into_response();
    };

    if !state.take_oauth_state(callback_state).await {
        tracing::error!("OAuth state mismatch - possible CSRF attack");
        return Redirect::to("/shopify?error=oauth_invalid_state").into_response();
    }

    let token = match state.shopify().exchange_code(code).await {
        Ok(token) => token,
        Err(e) => {
            tracing::error!("Failed to exchange OAuth code: {}", e);
            return Redirect::to("/shopify?error=oauth_exchange_failed").into_response();
        }
    };

    let repo = ShopifyTokenRepository::new(state.pool());
    let scopes: Vec<String> = token
        .scope
        .split(',')
        .map(|s| s.trim().to_string())
        .collect();

    if let Err(e) = repo
        .save(&token.shop, &token.access_token, &scopes, token.obtained_at)
        .await
    {
        tracing::error!("Failed to save Shopify token: {}", e);
        return Redirect::to("/shopify?error=oauth_save_failed").into_response();
    }

    tracing::info!("Successfully connected to Shopify store: {}", token.shop);
    Redirect::to("/shopify?success=connected").into_response()
}

/// GET /shopify/disconnect - drop the stored token.
#[instrument(skip(state))]
async fn disconnect(State(state): State<AppState>) -> Response {
    let shop = state.shopify().store();

    let repo = ShopifyTokenRepository::new(state.pool());
    if let Err(e) = repo.delete(shop).await {
        tracing::error!("Failed to delete Shopify token: {}", e);
        return Redirect::to("/shopify?error=disconnect_failed").into_response();
    }

    state.shopify().clear_token().await;

    tracing::info!("Disconnected from Shopify store: {}", shop);
    Redirect::to("/shopify?success=disconnected").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signed_params(secret: &str) -> OAuthCallbackParams {
        let mut params = OAuthCallbackParams {
            code: Some("authcode".to_string()),
            state: Some("state-1".to_string()),
            shop: Some("test.myshopify.com".to_string()),
            hmac: None,
            timestamp: Some("1700000000".to_string()),
            host: None,
            error: None,
            error_description: None,
        };

        let message = format!(
            "code={}&shop={}&state={}&timestamp={}",
            params.code.as_deref().unwrap_or_default(),
            params.shop.as_deref().unwrap_or_default(),
            params.state.as_deref().unwrap_or_default(),
            params.timestamp.as_deref().unwrap_or_default(),
        );
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac key");
        mac.update(message.as_bytes());
        params.hmac = Some(hex::encode(mac.finalize().into_bytes()));
        params
    }

    #[test]
    fn test_valid_callback_hmac() {
        let params = signed_params("client-secret");
        assert!(verify_shopify_hmac(&params, "client-secret"));
    }

    #[test]
    fn test_tampered_callback_fails() {
        let mut params = signed_params("client-secret");
        params.code = Some("other-code".to_string());
        assert!(!verify_shopify_hmac(&params, "client-secret"));
    }

    #[test]
    fn test_missing_hmac_fails() {
        let mut params = signed_params("client-secret");
        params.hmac = None;
        assert!(!verify_shopify_hmac(&params, "client-secret"));
    }

    #[test]
    fn test_non_hex_hmac_fails() {
        let mut params = signed_params("client-secret");
        params.hmac = Some("zzzz".to_string());
        assert!(!verify_shopify_hmac(&params, "client-secret"));
    }
}
