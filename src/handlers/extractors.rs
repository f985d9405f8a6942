//! Common extractors for API handlers.
//!
//! Rejections from axum's built-in extractors are converted into [`ApiError`]
//! so every client error leaves the service in the same JSON shape.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, Request},
    http::request::Parts,
    Json,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

static LISTING_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,64}$").expect("listing id pattern is valid"));

/// JSON body that has been deserialized and passed `validator` rules
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        value.validate()?;
        Ok(ValidatedJson(value))
    }
}

/// Query string with rejections mapped to [`ApiError`]
#[derive(Debug, Clone, Default)]
pub struct ApiQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state).await?;
        Ok(ApiQuery(value))
    }
}

/// Listing identifier taken from the `{id}` path segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingId(pub String);

impl ListingId {
    /// Parse and validate an identifier, returning an ApiError on failure
    pub fn parse(s: &str) -> Result<Self, ApiError> {
        if LISTING_ID.is_match(s) {
            Ok(ListingId(s.to_string()))
        } else {
            Err(ApiError::invalid_field(
                "id",
                format!("Invalid listing id: {}", s),
            ))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ListingId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state).await?;
        ListingId::parse(&raw)
    }
}
