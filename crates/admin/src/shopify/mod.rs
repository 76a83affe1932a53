//! Shopify Admin API client (HIGH PRIVILEGE).
//!
//! # Architecture
//!
//! - Hand-written GraphQL documents in [`queries`], one serde response
//!   envelope per document, validated at the boundary
//! - Direct API calls to Shopify; funnel definitions live in a shop
//!   metafield, not a local table
//! - Rate limiting and auth failures surface as typed errors
//!
//! # Example
//!
//! ```rust,ignore
//! use funnelkit_admin::shopify::{AdminClient, FunnelStore};
//!
//! let client = AdminClient::new(&config.shopify);
//! let snapshot = FunnelStore::new(&client).load().await?;
//! ```

mod client;
pub mod discounts;
pub mod funnels;
pub mod products;
pub mod queries;

pub use client::{AdminClient, OAuthToken};
pub use discounts::ensure_automatic_discount;
pub use funnels::{FunnelForm, FunnelFormError, FunnelSnapshot, FunnelStore, TierForm};
pub use products::list_products;

use thiserror::Error;

/// Errors that can occur when interacting with the Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// No OAuth token available - complete the connect flow first.
    #[error("No access token - connect the store via /shopify/connect")]
    NoAccessToken,

    /// OAuth flow failure.
    #[error("OAuth error: {0}")]
    OAuth(String),

    /// User error from a mutation (e.g., invalid metafield input).
    #[error("User error: {0}")]
    UserError(String),
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}
