//! Listing documents and the payloads that create or patch them.
//!
//! Scalar values travel as strings on the wire. Clients that send numbers or
//! booleans (`"price": 888`, `"active": true`) are accepted and normalized to
//! the string form before anything reaches the store.

use serde::{Deserialize, Deserializer, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Geographic coordinates of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Geo {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "scalar_string")]
    pub lat: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "scalar_string")]
    pub lng: Option<String>,
}

/// Postal address of a listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "scalar_string")]
    pub street: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "scalar_string")]
    pub zipcode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "scalar_string")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "scalar_string")]
    pub kommun: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<Geo>,
}

/// The document body of a listing.
///
/// Every field is optional because the same shape doubles as a partial update:
/// a field that is `None` in a patch leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct ListingFields {
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "scalar_string"
    )]
    #[validate(length(min = 1, message = "type must not be empty"))]
    pub listing_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "scalar_string")]
    #[validate(length(min = 1, message = "price must not be empty"))]
    pub price: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "scalar_string")]
    #[validate(length(min = 1, message = "fee must not be empty"))]
    pub fee: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "scalar_string")]
    #[validate(length(min = 1, message = "active must not be empty"))]
    pub active: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<Address>,
}

/// A stored listing as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Listing {
    /// Store-assigned identifier, immutable once set
    #[serde(rename = "_id")]
    pub id: String,
    /// Store-managed version marker
    #[serde(rename = "__v")]
    pub version: i64,
    #[serde(flatten)]
    pub fields: ListingFields,
}

/// Payload for `POST /listings`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct NewListing {
    #[serde(rename = "type", deserialize_with = "required_scalar_string")]
    #[validate(length(min = 1, message = "type is required"))]
    pub listing_type: String,

    #[serde(deserialize_with = "required_scalar_string")]
    #[validate(length(min = 1, message = "price is required"))]
    pub price: String,

    #[serde(deserialize_with = "required_scalar_string")]
    #[validate(length(min = 1, message = "fee is required"))]
    pub fee: String,

    #[serde(deserialize_with = "required_scalar_string")]
    #[validate(length(min = 1, message = "active is required"))]
    pub active: String,

    #[serde(default)]
    pub address: Option<Address>,
}

impl From<NewListing> for ListingFields {
    fn from(new: NewListing) -> Self {
        Self {
            listing_type: Some(new.listing_type),
            price: Some(new.price),
            fee: Some(new.fee),
            active: Some(new.active),
            address: new.address,
        }
    }
}

/// Filter accepted by `find_one`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ListingFilter {
    pub price: Option<String>,
}

impl ListingFilter {
    pub fn by_price(price: impl Into<String>) -> Self {
        Self {
            price: Some(price.into()),
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        match &self.price {
            Some(price) => listing.fields.price.as_ref() == Some(price),
            None => true,
        }
    }
}

impl Listing {
    pub fn new(id: impl Into<String>, fields: ListingFields) -> Self {
        Self {
            id: id.into(),
            version: 0,
            fields,
        }
    }
}

/// Overwrite `slot` with `value` when present. Returns whether anything changed.
fn set_field<T: PartialEq>(slot: &mut Option<T>, value: Option<T>) -> bool {
    match value {
        Some(v) if slot.as_ref() != Some(&v) => {
            *slot = Some(v);
            true
        }
        _ => false,
    }
}

/// Merge `patch` into a nested object. An absent object is only created when
/// the patch actually sets one of its fields.
fn merge_nested<T: Default>(
    slot: &mut Option<T>,
    patch: Option<T>,
    merge: fn(&mut T, T) -> bool,
) -> bool {
    let Some(patch) = patch else {
        return false;
    };
    match slot {
        Some(current) => merge(current, patch),
        None => {
            let mut fresh = T::default();
            let changed = merge(&mut fresh, patch);
            if changed {
                *slot = Some(fresh);
            }
            changed
        }
    }
}

impl Geo {
    fn merge(&mut self, patch: Geo) -> bool {
        let lat = set_field(&mut self.lat, patch.lat);
        let lng = set_field(&mut self.lng, patch.lng);
        lat | lng
    }
}

impl Address {
    fn merge(&mut self, patch: Address) -> bool {
        let mut changed = set_field(&mut self.street, patch.street);
        changed |= set_field(&mut self.zipcode, patch.zipcode);
        changed |= set_field(&mut self.city, patch.city);
        changed |= set_field(&mut self.kommun, patch.kommun);
        changed |= merge_nested(&mut self.geo, patch.geo, Geo::merge);
        changed
    }
}

impl ListingFields {
    /// Apply a partial update with `$set` semantics: present fields overwrite,
    /// absent fields are kept and nested objects merge field by field.
    ///
    /// Returns `true` when the document changed.
    pub fn merge(&mut self, patch: ListingFields) -> bool {
        let mut changed = set_field(&mut self.listing_type, patch.listing_type);
        changed |= set_field(&mut self.price, patch.price);
        changed |= set_field(&mut self.fee, patch.fee);
        changed |= set_field(&mut self.active, patch.active);
        changed |= merge_nested(&mut self.address, patch.address, Address::merge);
        changed
    }
}

/// JSON key a client uses for a listing field, for error reporting
pub fn json_field_name(field: &str) -> &str {
    match field {
        "listing_type" => "type",
        other => other,
    }
}

/// JSON scalar accepted where a string is expected
#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl From<Scalar> for String {
    fn from(scalar: Scalar) -> Self {
        match scalar {
            Scalar::String(s) => s,
            Scalar::Number(n) => n.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

fn scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(String::from))
}

fn required_scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(deserializer).map(String::from)
}
