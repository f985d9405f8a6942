// Data models and DTOs

pub mod listing;

pub use listing::{
    json_field_name, Address, Geo, Listing, ListingFields, ListingFilter, NewListing,
};
