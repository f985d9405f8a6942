//! Listing Handlers
//!
//! Translate HTTP requests into repository calls and repository results into
//! status codes and JSON bodies.

use axum::{
    extract::State,
    response::{IntoResponse, Json, Response},
};
use tracing::{debug, info};

use super::extractors::{ApiQuery, ListingId, ValidatedJson};
use super::response::Created;
use crate::database::UpdateResult;
use crate::error::{ApiError, Result};
use crate::models::{Listing, ListingFields, ListingFilter, NewListing};
use crate::AppState;

/// List all listings, or fetch the one matching `price`
/// GET /listings
#[utoipa::path(
    get,
    path = "/listings",
    tag = "listings",
    params(
        ("price" = Option<String>, Query, description = "Return the single listing with this price")
    ),
    responses(
        (status = 200, description = "All listings, or the listing matching the price filter", body = [Listing]),
        (status = 404, description = "No listing matches the price filter"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_listings(
    State(state): State<AppState>,
    ApiQuery(filter): ApiQuery<ListingFilter>,
) -> Result<Response> {
    if filter.price.is_some() {
        let listing = state
            .repository
            .find_one(&filter)
            .await?
            .ok_or_else(|| ApiError::not_found("Listing"))?;
        return Ok(Json(listing).into_response());
    }

    let listings = state.repository.find_all().await?;
    debug!(count = listings.len(), "Listings fetched");
    Ok(Json(listings).into_response())
}

/// Get a listing by id
/// GET /listings/{id}
#[utoipa::path(
    get,
    path = "/listings/{id}",
    tag = "listings",
    params(("id" = String, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "The listing", body = Listing),
        (status = 400, description = "Invalid listing id"),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn get_listing(
    State(state): State<AppState>,
    id: ListingId,
) -> Result<Json<Listing>> {
    state
        .repository
        .find_by_id(id.as_str())
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Listing"))
}

/// Create a listing
/// POST /listings
#[utoipa::path(
    post,
    path = "/listings",
    tag = "listings",
    request_body = NewListing,
    responses(
        (status = 201, description = "Listing created", body = Listing),
        (status = 400, description = "Missing or malformed fields"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_listing(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NewListing>,
) -> Result<Created<Listing>> {
    let listing = state.repository.create(payload.into()).await?;
    info!(id = %listing.id, "Listing created");
    Ok(Created(listing))
}

/// Update a listing, inserting it when the id is unknown
/// PUT /listings/{id}
#[utoipa::path(
    put,
    path = "/listings/{id}",
    tag = "listings",
    params(("id" = String, Path, description = "Listing ID")),
    request_body = ListingFields,
    responses(
        (status = 201, description = "Listing did not exist and was created", body = Listing),
        (status = 200, description = "Listing updated", body = Listing),
        (status = 204, description = "Listing matched but nothing changed"),
        (status = 400, description = "Invalid listing id or payload"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_listing(
    State(state): State<AppState>,
    id: ListingId,
    ValidatedJson(patch): ValidatedJson<ListingFields>,
) -> Result<UpdateResult> {
    let result = state.repository.update_one(id.as_str(), patch).await?;
    info!(id = %id.as_str(), outcome = ?result.outcome, "Listing updated");
    Ok(result)
}

/// Delete a listing
/// DELETE /listings/{id}
#[utoipa::path(
    delete,
    path = "/listings/{id}",
    tag = "listings",
    params(("id" = String, Path, description = "Listing ID")),
    responses(
        (status = 200, description = "Listing deleted", body = Listing),
        (status = 400, description = "Invalid listing id"),
        (status = 404, description = "Listing not found")
    )
)]
pub async fn delete_listing(
    State(state): State<AppState>,
    id: ListingId,
) -> Result<Json<Listing>> {
    let listing = state
        .repository
        .delete_by_id(id.as_str())
        .await?
        .ok_or_else(|| ApiError::not_found("Listing"))?;

    info!(id = %listing.id, "Listing deleted");
    Ok(Json(listing))
}
