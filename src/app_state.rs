//! Application state shared across all handlers.

use std::sync::Arc;

use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::Config;
use crate::database::ListingRepository;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Listing store selected at startup
    pub repository: Arc<dyn ListingRepository>,
    /// Application configuration
    pub config: Config,
    /// Prometheus render handle, absent when no recorder is installed
    pub metrics_handle: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(repository: Arc<dyn ListingRepository>, config: Config) -> Self {
        Self {
            repository,
            config,
            metrics_handle: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics_handle = Some(handle);
        self
    }
}
