//! Schema migrations for the legacy `dashboard` and nested `folder` tables.

use sqlx::PgPool;
use tracing::info;

use folderhub_core::error::{AppError, ErrorKind};

/// Apply every pending migration under `migrations/`.
pub async fn run_migrations(pool: &PgPool) -> Result<(), AppError> {
    sqlx::migrate!("../../migrations")
        .run(pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to run migrations", e))?;

    info!("Folder schema is up to date");
    Ok(())
}
