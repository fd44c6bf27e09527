//! Brand Model

use super::serde_thing;
use serde::{Deserialize, Serialize};
use surrealdb::sql::Thing;
use validator::Validate;

pub type BrandId = Thing;

/// Legacy flavour reference as stored on brand documents.
///
/// Older records hold bare flavour names; newer ones hold the full
/// `{id, flavorId, name}` shape. Both must keep deserializing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum FlavourRef {
    Name(String),
    Full {
        #[serde(default)]
        id: Option<String>,
        #[serde(rename = "flavorId", default)]
        flavor_id: Option<String>,
        name: String,
    },
}

impl FlavourRef {
    pub fn name(&self) -> &str {
        match self {
            FlavourRef::Name(n) => n,
            FlavourRef::Full { name, .. } => name,
        }
    }
}

/// Brand model
///
/// `name` is compared case-sensitively and treated as unique by the admin
/// flows; the store itself does not enforce it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Brand {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_thing::option"
    )]
    pub id: Option<BrandId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// 1-based position in storefront brand listings
    #[serde(default = "default_display_order")]
    pub display_order: i32,
    #[serde(default)]
    pub assigned_flavours: Vec<FlavourRef>,
    #[serde(default)]
    pub created_at: i64,
}

fn default_display_order() -> i32 {
    1
}

impl Brand {
    pub fn new(name: String) -> Self {
        Self {
            id: None,
            name,
            description: String::new(),
            display_order: 1,
            assigned_flavours: Vec::new(),
            created_at: 0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BrandCreate {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 1))]
    pub display_order: Option<i32>,
    /// Preserved when supplied (bulk imports carry original timestamps)
    pub created_at: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BrandUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub display_order: Option<i32>,
    pub assigned_flavours: Option<Vec<FlavourRef>>,
}
