//! Response helpers for API handlers.
//!
//! Listing endpoints return the bare document (or array of documents) as the
//! body, so these helpers only pick the status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::database::{UpdateOutcome, UpdateResult};

/// Response helper for created resources
pub struct Created<T>(pub T);

impl<T: Serialize> IntoResponse for Created<T> {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self.0)).into_response()
    }
}

/// Response helper for no content
pub struct NoContent;

impl IntoResponse for NoContent {
    fn into_response(self) -> Response {
        StatusCode::NO_CONTENT.into_response()
    }
}

/// Upsert result mapped onto `201` / `200` / `204`
impl IntoResponse for UpdateResult {
    fn into_response(self) -> Response {
        match self.outcome {
            UpdateOutcome::Upserted => Created(self.listing).into_response(),
            UpdateOutcome::Modified => (StatusCode::OK, Json(self.listing)).into_response(),
            UpdateOutcome::Unchanged => NoContent.into_response(),
        }
    }
}
