//! Data access for listing documents.
//!
//! Handlers only ever see [`ListingRepository`]; the concrete store is picked at
//! startup and shared as `Arc<dyn ListingRepository>`.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{Listing, ListingFields, ListingFilter};

/// What an upserting update did to the collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// No document had the id, a new one was inserted
    Upserted,
    /// An existing document was changed
    Modified,
    /// An existing document matched but the patch changed nothing
    Unchanged,
}

/// Result of [`ListingRepository::update_one`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResult {
    pub outcome: UpdateOutcome,
    /// The document as stored after the update
    pub listing: Listing,
}

impl UpdateResult {
    pub fn new(outcome: UpdateOutcome, listing: Listing) -> Self {
        Self { outcome, listing }
    }
}

/// Document-collection operations backing the listings API
#[async_trait]
pub trait ListingRepository: Send + Sync {
    /// All listings in creation order
    async fn find_all(&self) -> Result<Vec<Listing>, ApiError>;

    /// First listing matching the filter
    async fn find_one(&self, filter: &ListingFilter) -> Result<Option<Listing>, ApiError>;

    /// Find listing by ID
    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, ApiError>;

    /// Insert a new listing, assigning its id and version marker
    async fn create(&self, fields: ListingFields) -> Result<Listing, ApiError>;

    /// Apply `patch` to the listing with `id`, inserting it when absent
    async fn update_one(&self, id: &str, patch: ListingFields) -> Result<UpdateResult, ApiError>;

    /// Remove a listing, returning the removed document
    async fn delete_by_id(&self, id: &str) -> Result<Option<Listing>, ApiError>;

    /// Cheap liveness probe for health reporting
    async fn ping(&self) -> Result<(), ApiError> {
        Ok(())
    }
}

/// Generate a fresh listing identifier
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}
