//! FolderHub maintenance entry point.
//!
//! Applies the folder schema migrations and brings the nested folder table
//! in line with the legacy table, so the folder service can start in
//! nested mode.

use anyhow::Context;
use tracing_subscriber::{EnvFilter, fmt};

use folderhub_core::config::AppConfig;
use folderhub_database::{DatabasePool, FolderDatabase, SyncReport};

#[tokio::main]
async fn main() {
    let env = std::env::var("FOLDERHUB_ENV").unwrap_or_else(|_| "development".to_string());
    let config = match AppConfig::load(&env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = format!("{e:#}"), "Startup failed");
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

async fn run(config: AppConfig) -> anyhow::Result<()> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        nested_folders = config.folders.nested_folders,
        "Starting FolderHub"
    );

    let pool = DatabasePool::connect(&config.database)
        .await
        .context("database connection failed")?;
    pool.migrate().await.context("migration failed")?;

    if config.folders.sync_on_startup {
        sync_folders(&pool.folder_database()).await;
    } else {
        tracing::info!("Nested folder sync disabled");
    }

    pool.close().await;
    Ok(())
}

/// Run the legacy to nested sync. A failure is logged and not fatal.
async fn sync_folders(database: &dyn FolderDatabase) -> Option<SyncReport> {
    match database.sync_nested_from_legacy().await {
        Ok(report) => {
            tracing::info!(
                upserted = report.upserted,
                removed = report.removed,
                "Nested folder table synchronized"
            );
            Some(report)
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to sync nested folders from legacy store");
            None
        }
    }
}
