//! Application startup and initialization logic

use anyhow::{anyhow, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::app_state::AppState;
use crate::config::{Config, StorageBackend};
use crate::database::{self, InMemoryListingRepository, ListingRepository, PgListingRepository};

/// Initialize the listing store and metrics recorder, and create the AppState.
pub async fn initialize_app(config: &Config) -> Result<AppState> {
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow!("Failed to install Prometheus recorder: {}", e))?;
    info!("Prometheus metrics initialized");

    let repository = setup_repository(config).await?;

    let app_state = AppState::new(repository, config.clone()).with_metrics(metrics_handle);
    info!(
        environment = %config.environment,
        storage = %config.storage_backend,
        "AppState created"
    );

    Ok(app_state)
}

/// Connect the configured listing store.
async fn setup_repository(config: &Config) -> Result<Arc<dyn ListingRepository>> {
    match config.storage_backend {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow!("DATABASE_URL is required for the postgres backend"))?;

            let pool = database::setup_database(url, config.max_connections).await?;
            database::run_migrations(&pool).await?;
            info!("PostgreSQL listing store ready");

            Ok(Arc::new(PgListingRepository::new(pool)))
        }
        StorageBackend::Memory => {
            if config.is_production() {
                warn!("In-memory listing store in production: data is lost on restart");
            }
            info!("In-memory listing store ready");

            Ok(Arc::new(InMemoryListingRepository::new()))
        }
    }
}

/// Wait for shutdown signal.
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal, shutting down gracefully");
        },
        _ = terminate => {
            info!("Received SIGTERM signal, shutting down gracefully");
        },
    }
}
