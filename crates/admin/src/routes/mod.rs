//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! # Funnels (metafield-backed)
//! GET  /funnels                funnel list
//! GET  /funnels/new            creation form
//! POST /funnels                create
//! GET  /funnels/{id}/edit      edit form
//! POST /funnels/{id}           update
//! POST /funnels/{id}/delete    delete
//! POST /funnels/{id}/status    toggle ACTIVE/INACTIVE
//!
//! # Analytics
//! GET  /analytics              dashboard page
//! GET  /analytics.json         summary as JSON
//!
//! # Storefront API
//! POST /api/check-discount     funnel lookup for the product page widget
//!
//! # Webhooks
//! POST /webhooks/orders-paid   order analytics intake (HMAC verified)
//!
//! # Shopify connection
//! GET  /shopify                connection status page
//! GET  /shopify/connect        start OAuth
//! GET  /shopify/callback       OAuth callback
//! GET  /shopify/disconnect     drop the stored token
//! ```

use axum::Router;

use crate::state::AppState;

pub mod analytics;
pub mod api;
pub mod funnels;
pub mod shopify;
pub mod webhooks;

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(funnels::router())
        .merge(analytics::router())
        .merge(api::router())
        .merge(webhooks::router())
        .merge(shopify::router())
}
