use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use utoipa::ToSchema;

use crate::error::ErrorCode;
use crate::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Healthy,
    Unhealthy,
}

/// Probe result for one backing service
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DependencyHealth {
    pub name: String,
    pub status: Status,
    pub response_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthReport {
    pub status: Status,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    pub environment: String,
    pub dependencies: Vec<DependencyHealth>,
}

/// Health check including a round trip to the listing store
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthReport),
        (status = 503, description = "Listing store is unreachable", body = HealthReport)
    )
)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let start = Instant::now();
    let probe = state.repository.ping().await;
    let response_time_ms = start.elapsed().as_millis() as u64;

    let store = match probe {
        Ok(()) => DependencyHealth {
            name: format!("storage:{}", state.config.storage_backend),
            status: Status::Healthy,
            response_time_ms,
            error_message: None,
        },
        Err(e) => {
            tracing::error!("Listing store health probe failed: {}", e);
            DependencyHealth {
                name: format!("storage:{}", state.config.storage_backend),
                status: Status::Unhealthy,
                response_time_ms,
                error_message: Some(ErrorCode::StoreFailure.default_message().to_string()),
            }
        }
    };

    let code = match store.status {
        Status::Healthy => StatusCode::OK,
        Status::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    let report = HealthReport {
        status: store.status,
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        dependencies: vec![store],
    };

    (code, Json(report))
}
