//! Router configuration

use axum::{
    http::StatusCode,
    middleware::from_fn,
    routing::get,
    Json, Router,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::app_state::AppState;
use crate::error::ApiError;
use crate::handlers::{health, listings, metrics};
use crate::middleware::{add_security_headers, metrics_middleware, request_logger_middleware};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(title = "Listings API", version = "0.1.0"),
    paths(
        listings::list_listings,
        listings::get_listing,
        listings::create_listing,
        listings::update_listing,
        listings::delete_listing,
        health::health_check,
        metrics::get_prometheus_metrics,
    ),
    components(schemas(
        crate::models::Listing,
        crate::models::ListingFields,
        crate::models::NewListing,
        crate::models::Address,
        crate::models::Geo,
        health::HealthReport,
        health::DependencyHealth,
        health::Status,
    )),
    tags(
        (name = "listings", description = "Listing CRUD"),
        (name = "health", description = "Service health"),
        (name = "metrics", description = "Prometheus metrics")
    )
)]
pub struct ApiDoc;

/// Listing CRUD routes. The collection also answers with a trailing slash.
pub fn listing_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/listings",
            get(listings::list_listings).post(listings::create_listing),
        )
        .route(
            "/listings/",
            get(listings::list_listings).post(listings::create_listing),
        )
        .route(
            "/listings/{id}",
            get(listings::get_listing)
                .put(listings::update_listing)
                .delete(listings::delete_listing),
        )
}

/// Build the application router.
pub fn build_router(app_state: AppState) -> Router {
    let request_timeout = Duration::from_secs(app_state.config.request_timeout);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::get_prometheus_metrics))
        .route("/api/docs/openapi.json", get(openapi_json))
        .merge(listing_routes())
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(request_logger_middleware))
                .layer(from_fn(add_security_headers))
                .layer(from_fn(metrics_middleware))
                .layer(TimeoutLayer::with_status_code(
                    StatusCode::REQUEST_TIMEOUT,
                    request_timeout,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(app_state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route")
}
