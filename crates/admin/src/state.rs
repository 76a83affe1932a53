//! Application state shared across handlers.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::db::{RepositoryError, ShopifyTokenRepository};
use crate::shopify::{AdminClient, OAuthToken};

/// How long an OAuth CSRF state stays redeemable.
const OAUTH_STATE_TTL: Duration = Duration::from_secs(600);

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    shopify: AdminClient,
    /// Outstanding OAuth CSRF states; entries expire instead of being
    /// cleaned up explicitly.
    oauth_states: moka::future::Cache<String, ()>,
}

impl AppState {
    /// Build application state and prime the Shopify client with any
    /// previously stored OAuth token.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` when the token lookup fails. A missing
    /// token is fine - the merchant connects via `/shopify/connect`.
    pub async fn new(config: AdminConfig, pool: PgPool) -> Result<Self, RepositoryError> {
        let shopify = AdminClient::new(&config.shopify);

        let repo = ShopifyTokenRepository::new(&pool);
        if let Some(stored) = repo.get_by_shop(&config.shopify.store).await? {
            shopify
                .set_token(OAuthToken {
                    access_token: stored.access_token.expose_secret().to_string(),
                    scope: stored.scopes.join(","),
                    obtained_at: stored.obtained_at,
                    shop: stored.shop,
                })
                .await;
            tracing::info!(shop = %config.shopify.store, "Loaded stored Shopify token");
        }

        let oauth_states = moka::future::Cache::builder()
            .time_to_live(OAUTH_STATE_TTL)
            .max_capacity(1024)
            .build();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                shopify,
                oauth_states,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn shopify(&self) -> &AdminClient {
        &self.inner.shopify
    }

    /// Register a fresh OAuth CSRF state.
    pub async fn store_oauth_state(&self, state: String) {
        self.inner.oauth_states.insert(state, ()).await;
    }

    /// Redeem an OAuth CSRF state. Each state is single-use.
    pub async fn take_oauth_state(&self, state: &str) -> bool {
        let present = self.inner.oauth_states.get(state).await.is_some();
        if present {
            self.inner.oauth_states.invalidate(state).await;
        }
        present
    }
}
