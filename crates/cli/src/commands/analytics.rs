//! Analytics maintenance commands.

use funnelkit_admin::db::{AnalyticsRepository, RepositoryError, create_pool};
use secrecy::SecretString;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanupError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Delete order analytics rows older than the retention window.
///
/// # Errors
///
/// Returns `CleanupError` when the database is unreachable or the delete
/// fails.
pub async fn cleanup(retention_days: i64) -> Result<(), CleanupError> {
    dotenvy::dotenv().ok();

    let database_url = std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map_err(|_| CleanupError::MissingEnvVar("ADMIN_DATABASE_URL"))?;

    let pool = create_pool(&SecretString::from(database_url)).await?;

    let repo = AnalyticsRepository::new(&pool);
    let deleted = repo.cleanup_old(retention_days).await?;

    tracing::info!("Deleted {deleted} order record(s) older than {retention_days} days");
    Ok(())
}
