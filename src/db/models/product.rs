//! Product Model

use super::serde_thing;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use validator::Validate;

pub type ProductId = Thing;

/// Availability status shown on the storefront
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ProductStatus {
    #[default]
    Available,
    #[serde(rename = "Out of Stock")]
    OutOfStock,
    #[serde(rename = "Coming Soon")]
    ComingSoon,
}

/// Denormalized flavour entry embedded on a product.
///
/// This is a cache of the authoritative `flavours` documents and can drift
/// after flavour deletion (known consistency gap, tolerated). Legacy records
/// hold bare strings instead of `{name, flavorId}` objects.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FlavourEntry {
    Legacy(String),
    Entry {
        name: String,
        #[serde(rename = "flavorId")]
        flavor_id: String,
    },
}

impl FlavourEntry {
    pub fn name(&self) -> &str {
        match self {
            FlavourEntry::Legacy(n) => n,
            FlavourEntry::Entry { name, .. } => name,
        }
    }

    pub fn flavor_id(&self) -> Option<&str> {
        match self {
            FlavourEntry::Legacy(_) => None,
            FlavourEntry::Entry { flavor_id, .. } => Some(flavor_id.as_str()),
        }
    }
}

/// Product model
///
/// `name` is not unique in the store, but the import engine treats the
/// lower-cased trimmed name as its dedup key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_thing::option"
    )]
    pub id: Option<ProductId>,
    pub name: String,
    #[serde(default)]
    pub price: Decimal,
    /// Free-text brand name; should match a Brand.name but is not a foreign key
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub flavour: Vec<FlavourEntry>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub created_at: i64,
}

impl Product {
    pub fn new(name: String) -> Self {
        Self {
            id: None,
            name,
            price: Decimal::ZERO,
            brand: String::new(),
            flavour: Vec::new(),
            description: String::new(),
            stock: 0,
            status: ProductStatus::Available,
            featured: false,
            image: String::new(),
            created_at: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProductCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub price: Option<Decimal>,
    pub brand: Option<String>,
    pub flavour: Option<Vec<FlavourEntry>>,
    pub description: Option<String>,
    #[validate(range(min = 0))]
    pub stock: Option<i64>,
    pub status: Option<ProductStatus>,
    pub featured: Option<bool>,
    pub image: Option<String>,
    /// Preserved when supplied (bulk imports carry original timestamps)
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub brand: Option<String>,
    pub flavour: Option<Vec<FlavourEntry>>,
    pub description: Option<String>,
    pub stock: Option<i64>,
    pub status: Option<ProductStatus>,
    pub featured: Option<bool>,
    pub image: Option<String>,
}
