//! Flavour Repository

use super::{
    BaseRepository, FLAVOURS_TABLE, PRODUCTS_TABLE, RepoError, RepoResult, strip_table_prefix,
};
use crate::db::models::{Flavour, FlavourCreate, FlavourUpdate};
use crate::utils::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct FlavourRepository {
    base: BaseRepository,
}

impl FlavourRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Flavour>> {
        let flavours: Vec<Flavour> = self
            .base
            .db()
            .query("SELECT * FROM flavours ORDER BY brand, name")
            .await?
            .take(0)?;
        Ok(flavours)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Flavour>> {
        let pure_id = strip_table_prefix(FLAVOURS_TABLE, id);
        let flavour: Option<Flavour> = self.base.db().select((FLAVOURS_TABLE, pure_id)).await?;
        Ok(flavour)
    }

    pub async fn find_by_brand(&self, brand: &str) -> RepoResult<Vec<Flavour>> {
        let brand_owned = brand.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM flavours WHERE brand = $brand ORDER BY name")
            .bind(("brand", brand_owned))
            .await?;
        let flavours: Vec<Flavour> = result.take(0)?;
        Ok(flavours)
    }

    /// First flavour with this name under the brand, if any (import lookups)
    pub async fn find_by_brand_and_name(
        &self,
        brand: &str,
        name: &str,
    ) -> RepoResult<Option<Flavour>> {
        let brand_owned = brand.to_string();
        let name_owned = name.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM flavours WHERE brand = $brand AND name = $name LIMIT 1")
            .bind(("brand", brand_owned))
            .bind(("name", name_owned))
            .await?;
        let flavours: Vec<Flavour> = result.take(0)?;
        Ok(flavours.into_iter().next())
    }

    /// Lookup by the `(productId, flavorId)` pair that must stay unique.
    /// The pair check is plain string equality, so `productId` is always
    /// compared in its raw form, never with a `products:` prefix.
    pub async fn find_by_product_and_flavor_id(
        &self,
        product_id: &str,
        flavor_id: &str,
    ) -> RepoResult<Option<Flavour>> {
        let product_owned = strip_table_prefix(PRODUCTS_TABLE, product_id).to_string();
        let flavor_owned = flavor_id.to_string();
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM flavours WHERE productId = $product AND flavorId = $flavor LIMIT 1",
            )
            .bind(("product", product_owned))
            .bind(("flavor", flavor_owned))
            .await?;
        let flavours: Vec<Flavour> = result.take(0)?;
        Ok(flavours.into_iter().next())
    }

    /// Create a flavour document.
    ///
    /// Enforces `(productId, flavorId)` uniqueness when both are present.
    /// Brand-level duplicate flavour ids are deliberately allowed; the admin
    /// "add flavour on the fly" flow depends on it.
    pub async fn create(&self, data: FlavourCreate) -> RepoResult<Flavour> {
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation("name is required".into()));
        }

        let flavor_id = data.flavor_id.unwrap_or_default();
        // Stored in raw form so the pair check cannot be evaded by a
        // `products:` prefixed spelling of the same id
        let product_id = data
            .product_id
            .map(|p| strip_table_prefix(PRODUCTS_TABLE, &p).to_string())
            .unwrap_or_default();
        if !flavor_id.is_empty()
            && !product_id.is_empty()
            && self
                .find_by_product_and_flavor_id(&product_id, &flavor_id)
                .await?
                .is_some()
        {
            return Err(RepoError::Duplicate(format!(
                "Flavour with flavorId '{flavor_id}' already exists on product '{product_id}'"
            )));
        }

        let flavour = Flavour {
            id: None,
            name: data.name,
            brand: data.brand.unwrap_or_default(),
            flavor_id,
            product_id,
            image: data.image.unwrap_or_default(),
            created_at: data.created_at.unwrap_or_else(now_millis),
        };

        let created: Option<Flavour> = self
            .base
            .db()
            .create(FLAVOURS_TABLE)
            .content(flavour)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create flavour".to_string()))
    }

    /// Partial update. Existing `flavorId` and `image` survive unless the
    /// caller explicitly supplies replacements.
    pub async fn update(&self, id: &str, data: FlavourUpdate) -> RepoResult<Flavour> {
        let pure_id = strip_table_prefix(FLAVOURS_TABLE, id);
        let existing = self
            .find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Flavour {id} not found")))?;

        // id comes from the record key; never sent in the content payload
        let updated = Flavour {
            id: None,
            name: data.name.unwrap_or(existing.name),
            brand: data.brand.unwrap_or(existing.brand),
            flavor_id: data.flavor_id.unwrap_or(existing.flavor_id),
            product_id: data
                .product_id
                .map(|p| strip_table_prefix(PRODUCTS_TABLE, &p).to_string())
                .unwrap_or(existing.product_id),
            image: data.image.unwrap_or(existing.image),
            created_at: existing.created_at,
        };

        let result: Option<Flavour> = self
            .base
            .db()
            .update((FLAVOURS_TABLE, pure_id))
            .content(updated)
            .await?;
        result.ok_or_else(|| RepoError::NotFound(format!("Flavour {id} not found")))
    }

    /// Hard delete. Does NOT touch the denormalized `Product.flavour` arrays;
    /// they may drift until the product is next edited (known gap).
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let pure_id = strip_table_prefix(FLAVOURS_TABLE, id);
        let result: Option<Flavour> = self.base.db().delete((FLAVOURS_TABLE, pure_id)).await?;
        if result.is_none() {
            return Err(RepoError::NotFound(format!("Flavour {id} not found")));
        }
        Ok(())
    }

    pub fn base(&self) -> &BaseRepository {
        &self.base
    }
}
