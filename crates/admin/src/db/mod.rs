//! Database operations for admin `PostgreSQL`.
//!
//! ## Tables
//!
//! - `order_analytics` - One row per paid order seen by the webhook
//! - `shop_analytics` - Running totals per shop
//! - `funnel_performance` - Per-funnel discount counters
//! - `shopify_tokens` - Admin API OAuth tokens
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p funnelkit-cli -- migrate
//! ```

pub mod analytics;
pub mod shopify_tokens;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use analytics::{AnalyticsRepository, AnalyticsSummary, FunnelPerformance, OrderRecord};
pub use shopify_tokens::ShopifyTokenRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
