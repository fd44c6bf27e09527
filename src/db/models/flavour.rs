//! Flavour Model
//!
//! A flavour document belongs to exactly one product. A flavour shared across
//! products is represented as one document per product. The pair
//! `(product_id, flavor_id)` must stay unique; the same `flavor_id` may
//! legitimately repeat under other products, and (for deliberately supplied
//! ids) even within the same brand.

use super::serde_thing;
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use validator::Validate;

pub type FlavourId = Thing;

/// Flavour model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flavour {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_thing::option"
    )]
    pub id: Option<FlavourId>,
    pub name: String,
    #[serde(default)]
    pub brand: String,
    /// External flavour id, unique only within the owning product
    #[serde(rename = "flavorId", default)]
    pub flavor_id: String,
    /// Owning product document id (string form, e.g. "products:abc")
    #[serde(rename = "productId", default)]
    pub product_id: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub created_at: i64,
}

impl Flavour {
    pub fn new(name: String, brand: String) -> Self {
        Self {
            id: None,
            name,
            brand,
            flavor_id: String::new(),
            product_id: String::new(),
            image: String::new(),
            created_at: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FlavourCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub brand: Option<String>,
    #[serde(rename = "flavorId")]
    pub flavor_id: Option<String>,
    #[serde(rename = "productId")]
    pub product_id: Option<String>,
    pub image: Option<String>,
    /// Preserved when supplied (bulk imports carry original timestamps)
    pub created_at: Option<i64>,
}

/// Updates preserve an existing `flavorId`/`image` unless explicitly set here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlavourUpdate {
    pub name: Option<String>,
    pub brand: Option<String>,
    #[serde(rename = "flavorId")]
    pub flavor_id: Option<String>,
    #[serde(rename = "productId")]
    pub product_id: Option<String>,
    pub image: Option<String>,
}
