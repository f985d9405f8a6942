//! In-process listing store used for development runs and tests.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::repository::{generate_id, ListingRepository, UpdateOutcome, UpdateResult};
use crate::error::ApiError;
use crate::models::{Listing, ListingFields, ListingFilter};

/// Listings kept in insertion order behind an async lock
#[derive(Debug, Default)]
pub struct InMemoryListingRepository {
    listings: RwLock<Vec<Listing>>,
}

impl InMemoryListingRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing set of documents
    pub fn with_listings(listings: Vec<Listing>) -> Self {
        Self {
            listings: RwLock::new(listings),
        }
    }

    pub async fn len(&self) -> usize {
        self.listings.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.listings.read().await.is_empty()
    }
}

#[async_trait]
impl ListingRepository for InMemoryListingRepository {
    async fn find_all(&self) -> Result<Vec<Listing>, ApiError> {
        Ok(self.listings.read().await.clone())
    }

    async fn find_one(&self, filter: &ListingFilter) -> Result<Option<Listing>, ApiError> {
        let listings = self.listings.read().await;
        Ok(listings.iter().find(|l| filter.matches(l)).cloned())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, ApiError> {
        let listings = self.listings.read().await;
        Ok(listings.iter().find(|l| l.id == id).cloned())
    }

    async fn create(&self, fields: ListingFields) -> Result<Listing, ApiError> {
        let listing = Listing::new(generate_id(), fields);
        self.listings.write().await.push(listing.clone());
        debug!(id = %listing.id, "Listing inserted");
        Ok(listing)
    }

    async fn update_one(&self, id: &str, patch: ListingFields) -> Result<UpdateResult, ApiError> {
        let mut listings = self.listings.write().await;

        match listings.iter_mut().find(|l| l.id == id) {
            Some(existing) => {
                let outcome = if existing.fields.merge(patch) {
                    UpdateOutcome::Modified
                } else {
                    UpdateOutcome::Unchanged
                };
                Ok(UpdateResult::new(outcome, existing.clone()))
            }
            None => {
                let listing = Listing::new(id, patch);
                listings.push(listing.clone());
                debug!(id = %id, "Listing upserted");
                Ok(UpdateResult::new(UpdateOutcome::Upserted, listing))
            }
        }
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Listing>, ApiError> {
        let mut listings = self.listings.write().await;
        let removed = listings
            .iter()
            .position(|l| l.id == id)
            .map(|index| listings.remove(index));
        Ok(removed)
    }
}
