//! Product Repository

use super::{BaseRepository, PRODUCTS_TABLE, RepoError, RepoResult, strip_table_prefix};
use crate::db::models::{Product, ProductCreate, ProductStatus, ProductUpdate};
use crate::utils::now_millis;
use rust_decimal::Decimal;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct ProductRepository {
    base: BaseRepository,
}

impl ProductRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_all(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM products ORDER BY name")
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Product>> {
        let pure_id = strip_table_prefix(PRODUCTS_TABLE, id);
        let product: Option<Product> = self.base.db().select((PRODUCTS_TABLE, pure_id)).await?;
        Ok(product)
    }

    /// Exact name lookup (used by admin duplicate checks)
    pub async fn find_by_name(&self, name: &str) -> RepoResult<Option<Product>> {
        let name_owned = name.to_string();
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM products WHERE name = $name LIMIT 1")
            .bind(("name", name_owned))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    /// Case-insensitive trimmed name lookup, the import dedup key
    pub async fn find_by_name_ci(&self, name: &str) -> RepoResult<Option<Product>> {
        let key = name.trim().to_lowercase();
        let mut result = self
            .base
            .db()
            .query(
                "SELECT * FROM products WHERE string::lowercase(string::trim(name)) = $key LIMIT 1",
            )
            .bind(("key", key))
            .await?;
        let products: Vec<Product> = result.take(0)?;
        Ok(products.into_iter().next())
    }

    pub async fn find_featured(&self) -> RepoResult<Vec<Product>> {
        let products: Vec<Product> = self
            .base
            .db()
            .query("SELECT * FROM products WHERE featured = true ORDER BY name")
            .await?
            .take(0)?;
        Ok(products)
    }

    pub async fn count_featured(&self) -> RepoResult<usize> {
        Ok(self.find_featured().await?.len())
    }

    pub async fn create(&self, data: ProductCreate) -> RepoResult<Product> {
        if data.name.trim().is_empty() {
            return Err(RepoError::Validation("name is required".into()));
        }
        let price = data.price.unwrap_or(Decimal::ZERO);
        if price < Decimal::ZERO {
            return Err(RepoError::Validation("price must be >= 0".into()));
        }

        let product = Product {
            id: None,
            name: data.name,
            price,
            brand: data.brand.unwrap_or_default(),
            flavour: data.flavour.unwrap_or_default(),
            description: data.description.unwrap_or_default(),
            stock: data.stock.unwrap_or(0).max(0),
            status: data.status.unwrap_or(ProductStatus::Available),
            featured: data.featured.unwrap_or(false),
            image: data.image.unwrap_or_default(),
            created_at: data.created_at.unwrap_or_else(now_millis),
        };

        let created: Option<Product> = self
            .base
            .db()
            .create(PRODUCTS_TABLE)
            .content(product)
            .await?;
        created.ok_or_else(|| RepoError::Database("Failed to create product".to_string()))
    }

    /// Partial update; only supplied fields change
    pub async fn update(&self, id: &str, data: ProductUpdate) -> RepoResult<Product> {
        let pure_id = strip_table_prefix(PRODUCTS_TABLE, id);
        let existing = self
            .find_by_id(pure_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))?;

        if let Some(p) = data.price
            && p < Decimal::ZERO
        {
            return Err(RepoError::Validation("price must be >= 0".into()));
        }

        // id comes from the record key; never sent in the content payload
        let updated = Product {
            id: None,
            name: data.name.unwrap_or(existing.name),
            price: data.price.unwrap_or(existing.price),
            brand: data.brand.unwrap_or(existing.brand),
            flavour: data.flavour.unwrap_or(existing.flavour),
            description: data.description.unwrap_or(existing.description),
            stock: data.stock.unwrap_or(existing.stock),
            status: data.status.unwrap_or(existing.status),
            featured: data.featured.unwrap_or(existing.featured),
            image: data.image.unwrap_or(existing.image),
            created_at: existing.created_at,
        };

        let result: Option<Product> = self
            .base
            .db()
            .update((PRODUCTS_TABLE, pure_id))
            .content(updated)
            .await?;
        result.ok_or_else(|| RepoError::NotFound(format!("Product {id} not found")))
    }

    pub async fn delete(&self, id: &str) -> RepoResult<()> {
        let pure_id = strip_table_prefix(PRODUCTS_TABLE, id);
        let result: Option<Product> = self.base.db().delete((PRODUCTS_TABLE, pure_id)).await?;
        if result.is_none() {
            return Err(RepoError::NotFound(format!("Product {id} not found")));
        }
        Ok(())
    }

    pub fn base(&self) -> &BaseRepository {
        &self.base
    }
}
