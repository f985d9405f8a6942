// Metrics endpoint for Prometheus

use crate::{AppState, error::ApiError};
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};

/// Prometheus metrics endpoint
///
/// # Errors
///
/// Returns an error if no Prometheus recorder was installed at startup
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "metrics",
    summary = "Prometheus metrics",
    responses(
        (status = 200, description = "Prometheus metrics", content_type = "text/plain"),
        (status = 500, description = "Metrics recorder not installed")
    )
)]
pub async fn get_prometheus_metrics(
    State(app_state): State<AppState>,
) -> Result<Response, ApiError> {
    let handle = app_state
        .metrics_handle
        .as_ref()
        .ok_or_else(|| ApiError::Internal("Prometheus recorder not installed".to_string()))?;

    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    )
        .into_response())
}
