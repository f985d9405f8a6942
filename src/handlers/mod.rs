pub mod extractors;
pub mod health;
pub mod listings;
pub mod metrics;
pub mod response;

// Re-export commonly used types
pub use extractors::{ApiQuery, ListingId, ValidatedJson};
pub use response::{Created, NoContent};
