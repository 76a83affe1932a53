//! Shopify OAuth token repository.

use secrecy::SecretString;
use sqlx::PgPool;

use super::RepositoryError;

/// A stored Admin API OAuth token.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct StoredToken {
    /// Shop domain (e.g., your-store.myshopify.com).
    pub shop: String,
    /// OAuth access token (HIGH PRIVILEGE - redacted in debug output).
    pub access_token: SecretString,
    /// Granted scopes.
    pub scopes: Vec<String>,
    /// Unix timestamp when the token was obtained.
    pub obtained_at: i64,
}

impl std::fmt::Debug for StoredToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoredToken")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("scopes", &self.scopes)
            .field("obtained_at", &self.obtained_at)
            .finish()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TokenRow {
    shop: String,
    access_token: String,
    scope: String,
    obtained_at: i64,
}

impl From<TokenRow> for StoredToken {
    fn from(row: TokenRow) -> Self {
        let scopes = row
            .scope
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        Self {
            shop: row.shop,
            access_token: SecretString::from(row.access_token),
            scopes,
            obtained_at: row.obtained_at,
        }
    }
}

/// Repository for Admin API OAuth tokens.
pub struct ShopifyTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ShopifyTokenRepository<'a> {
    /// Create a new token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get the token for a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_shop(&self, shop: &str) -> Result<Option<StoredToken>, RepositoryError> {
        let row = sqlx::query_as::<_, TokenRow>(
            r"
            SELECT shop, access_token, scope, obtained_at
            FROM shopify_tokens
            WHERE shop = $1
            ",
        )
        .bind(shop)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(StoredToken::from))
    }

    /// Save or update the token for a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn save(
        &self,
        shop: &str,
        access_token: &str,
        scopes: &[String],
        obtained_at: i64,
    ) -> Result<(), RepositoryError> {
        let scope = scopes.join(",");

        sqlx::query(
            r"
            INSERT INTO shopify_tokens (shop, access_token, scope, obtained_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (shop) DO UPDATE SET
                access_token = EXCLUDED.access_token,
                scope = EXCLUDED.scope,
                obtained_at = EXCLUDED.obtained_at,
                updated_at = now()
            ",
        )
        .bind(shop)
        .bind(access_token)
        .bind(scope)
        .bind(obtained_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }

    /// Delete the token for a shop.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, shop: &str) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM shopify_tokens WHERE shop = $1")
            .bind(shop)
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
