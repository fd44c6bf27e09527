//! Brand Repository

use super::{BaseRepository, BRANDS_TABLE, RepoError, RepoResult, strip_table_prefix};
use crate::db::models::{Brand, BrandCreate, BrandUpdate};
use crate::utils::now_millis;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct BrandRepository {
    base: BaseRepository,
}

impl BrandRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// All brands ordered for the storefront
    pub async fn find_all(&self) -> RepoResult<Vec<Brand>> {
        let brands: Vec<Brand> = self
            .base
            .db()
            .query("SELECT * FROM brands ORDER BY display_order, name")
            .await?
            .take(0)?;
        Ok(brands)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Brand>> {
        let pure_id = strip_table_prefix(BRANDS_TABLE, id);
        let brand: Option<Brand> = self.base.db().select((BRANDS_TABLE, pure_id)).await?;
        Ok(brand)
    }

    /// Exact, case-sensitive name lookup (the brand "unique name" contract)
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Brand>> {
        let name_owned = name.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM brands WHERE name = $name LIMIT 1")
            .bind(("name", name_owned))
            .await?;
        let brands: Vec<Brand> = result.take(0)?;
        Ok(brands.into_iter().next())
    }

    pub async fn create(&self, data: BrandCreate) -> RepoResult<Brand> {
        if self.find_by_name(&data.name).await?.is_some() {
            return Err(RepoError::Duplicate(format!(
                "Brand '{}' already exists",
                data.name
            )));
        }

        let brand = Brand {
            id: None,
            name: data.name,
            description: data.description.unwrap_or_default(),
            display_order: data.display_order.unwrap_or(1),
            assigned_flavours: Vec::new(),
            created_at: data.created_at.unwrap_or_else(now_millis),
        };

        let created: Option<Brand> = self.base.db().create(BRANDS_TABLE).content(brand).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create brand".to_string()))
    }

    /// Insert without the duplicate-name guard. Bulk import trusts its own
    /// upstream existence checks and must not fail a whole run on one name
    /// collision.
    pub async fn insert(&self, data: BrandCreate) -> RepoResult<Brand> {
        let brand = Brand {
            id: None,
            name: data.name,
            description: data.description.unwrap_or_default(),
            display_order: data.display_order.unwrap_or(1),
            assigned_flavours: Vec::new(),
            created_at: data.created_at.unwrap_or_else(now_millis),
        };
        let created: Option<Brand> = self.base.db().create(BRANDS_TABLE).content(brand).await?;
        created.ok_or_else(|| RepoError::Database("Failed to create brand".to_string()))
    }

    /// Partial update; only supplied fields change
    pub async fn update(&self, id: &str, data: BrandUpdate) -> RepoResult<Brand> {
        let pure_id = strip_table_prefix(BRANDS_TABLE, id);
        let existing = self
            .find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Brand {id} not found")))?;

        // id comes from the record key; never sent in the content payload
        let updated = Brand {
            id: None,
            name: data.name.unwrap_or(existing.name),
            description: data.description.unwrap_or(existing.description),
            display_order: data.display_order.unwrap_or(existing.display_order),
            assigned_flavours: data.assigned_flavours.unwrap_or(existing.assigned_flavours),
            created_at: existing.created_at,
        };

        let result: Option<Brand> = self
            .base
            .db()
            .update((BRANDS_TABLE, pure_id))
            .content(updated)
            .await?;
        result.ok_or_else(|| RepoError::NotFound(format!("Brand {id} not found")))
    }

    /// Mutate only the storefront position
    pub async fn update_display_order(&self, id: &str, display_order: i32) -> RepoResult<Brand> {
        self.update(
            id,
            BrandUpdate {
                display_order: Some(display_order),
                ..Default::default()
            },
        )
        .await
    }

    /// Hard delete. Cascades nothing: products and flavours referencing the
    /// brand by name keep their dangling references, as the storefront
    /// tolerates orphans.
    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let pure_id = strip_table_prefix(BRANDS_TABLE, id);
        let result: Option<Brand> = self.base.db().delete((BRANDS_TABLE, pure_id)).await?;
        if result.is_none() {
            return Err(RepoError::NotFound(format!("Brand {id} not found")));
        }
        Ok(())
    }

    pub fn base(&self) -> &BaseRepository {
        &self.base
    }
}
