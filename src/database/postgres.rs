//! PostgreSQL-backed listing store.
//!
//! Each listing is one row holding the document body as JSONB, so the table
//! behaves like a document collection: fields absent from a document are simply
//! absent from `doc`, and the price filter reads `doc->>'price'`.

use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use tracing::{debug, warn};

use super::repository::{generate_id, ListingRepository, UpdateOutcome, UpdateResult};
use crate::error::ApiError;
use crate::models::{Listing, ListingFields, ListingFilter};

const SELECT_LISTING: &str = "SELECT id, version, doc FROM listings";

/// Upsert attempts before giving up on a contended id
const MAX_UPSERT_ATTEMPTS: usize = 3;

#[derive(Debug, sqlx::FromRow)]
struct ListingRow {
    id: String,
    version: i64,
    doc: Json<ListingFields>,
}

impl From<ListingRow> for Listing {
    fn from(row: ListingRow) -> Self {
        Listing {
            id: row.id,
            version: row.version,
            fields: row.doc.0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PgListingRepository {
    pool: PgPool,
}

impl PgListingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ListingRepository for PgListingRepository {
    async fn find_all(&self) -> Result<Vec<Listing>, ApiError> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            "{SELECT_LISTING} ORDER BY created_at, id"
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Listing::from).collect())
    }

    async fn find_one(&self, filter: &ListingFilter) -> Result<Option<Listing>, ApiError> {
        let mut query = QueryBuilder::<Postgres>::new(SELECT_LISTING);
        if let Some(price) = &filter.price {
            query.push(" WHERE doc->>'price' = ").push_bind(price.clone());
        }
        query.push(" ORDER BY created_at, id LIMIT 1");

        let row = query
            .build_query_as::<ListingRow>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Listing::from))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Listing>, ApiError> {
        let row = sqlx::query_as::<_, ListingRow>(&format!("{SELECT_LISTING} WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Listing::from))
    }

    async fn create(&self, fields: ListingFields) -> Result<Listing, ApiError> {
        let row = sqlx::query_as::<_, ListingRow>(
            "INSERT INTO listings (id, doc) VALUES ($1, $2) RETURNING id, version, doc",
        )
        .bind(generate_id())
        .bind(Json(&fields))
        .fetch_one(&self.pool)
        .await?;

        debug!(id = %row.id, "Listing inserted");
        Ok(row.into())
    }

    async fn update_one(&self, id: &str, patch: ListingFields) -> Result<UpdateResult, ApiError> {
        let mut tx = self.pool.begin().await?;

        for attempt in 1..=MAX_UPSERT_ATTEMPTS {
            let current = sqlx::query_as::<_, ListingRow>(&format!(
                "{SELECT_LISTING} WHERE id = $1 FOR UPDATE"
            ))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(row) = current {
                let mut listing = Listing::from(row);
                if !listing.fields.merge(patch) {
                    tx.commit().await?;
                    return Ok(UpdateResult::new(UpdateOutcome::Unchanged, listing));
                }

                sqlx::query("UPDATE listings SET doc = $2, updated_at = NOW() WHERE id = $1")
                    .bind(id)
                    .bind(Json(&listing.fields))
                    .execute(&mut *tx)
                    .await?;
                tx.commit().await?;
                return Ok(UpdateResult::new(UpdateOutcome::Modified, listing));
            }

            // A concurrent writer may insert the same id between the SELECT and
            // here; DO NOTHING leaves the transaction usable for another pass.
            let inserted = sqlx::query_as::<_, ListingRow>(
                "INSERT INTO listings (id, doc) VALUES ($1, $2) \
                 ON CONFLICT (id) DO NOTHING RETURNING id, version, doc",
            )
            .bind(id)
            .bind(Json(&patch))
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(row) = inserted {
                tx.commit().await?;
                debug!(id = %id, "Listing upserted");
                return Ok(UpdateResult::new(UpdateOutcome::Upserted, row.into()));
            }

            warn!(id = %id, attempt, "Upsert raced with a concurrent insert, retrying");
        }

        Err(ApiError::Internal(format!(
            "upsert of listing {} did not settle after {} attempts",
            id, MAX_UPSERT_ATTEMPTS
        )))
    }

    async fn delete_by_id(&self, id: &str) -> Result<Option<Listing>, ApiError> {
        let row = sqlx::query_as::<_, ListingRow>(
            "DELETE FROM listings WHERE id = $1 RETURNING id, version, doc",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Listing::from))
    }

    async fn ping(&self) -> Result<(), ApiError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
