//! Product Admin Controller
//!
//! Product CRUD plus the two guarded flows: the featured soft limit and the
//! phrase-confirmed destructive wipe.

use validator::Validate;

use super::brands::thing_id;
use crate::core::CatalogState;
use crate::db::models::{Product, ProductCreate, ProductUpdate};
use crate::db::repository::{BRANDS_TABLE, FLAVOURS_TABLE, PRODUCTS_TABLE};
use crate::feed::ChangeAction;
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, MAX_URL_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Soft cap on featured products. Crossing it requires an explicit operator
/// confirmation, it is never enforced by the store.
pub const FEATURED_SOFT_LIMIT: usize = 5;

/// Exact phrase the operator must type to run the catalog wipe
pub const WIPE_CONFIRMATION_PHRASE: &str = "DELETE ALL PRODUCTS";

/// Admin view over the products collection with an explicit snapshot
pub struct ProductAdmin {
    state: CatalogState,
    pub products: Vec<Product>,
}

impl ProductAdmin {
    pub async fn new(state: CatalogState) -> AppResult<Self> {
        let mut admin = Self {
            state,
            products: Vec::new(),
        };
        admin.refresh().await?;
        Ok(admin)
    }

    pub async fn refresh(&mut self) -> AppResult<()> {
        self.products = self.state.products().find_all().await?;
        Ok(())
    }

    pub async fn create(&mut self, data: ProductCreate) -> AppResult<Product> {
        data.validate()?;
        if data.featured == Some(true) {
            self.check_featured_limit(false, None).await?;
        }
        let created = self.state.products().create(data).await?;
        let id = thing_id(&created.id);
        self.state
            .broadcast_change(PRODUCTS_TABLE, ChangeAction::Created, &id, Some(&created));
        self.refresh().await?;
        Ok(created)
    }

    pub async fn update(&mut self, id: &str, data: ProductUpdate) -> AppResult<Product> {
        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_optional_text(&data.description, "description", MAX_DESCRIPTION_LEN)?;
        validate_optional_text(&data.image, "image", MAX_URL_LEN)?;

        if data.featured == Some(true) {
            self.check_featured_limit(false, Some(id)).await?;
        }
        let updated = self.state.products().update(id, data).await?;
        self.state
            .broadcast_change(PRODUCTS_TABLE, ChangeAction::Updated, id, Some(&updated));
        self.refresh().await?;
        Ok(updated)
    }

    /// Toggle the featured flag. Featuring past the soft limit needs
    /// `confirm_over_limit`; un-featuring is never guarded.
    pub async fn set_featured(
        &mut self,
        id: &str,
        featured: bool,
        confirm_over_limit: bool,
    ) -> AppResult<Product> {
        if featured {
            self.check_featured_limit(confirm_over_limit, Some(id))
                .await?;
        }
        let updated = self
            .state
            .products()
            .update(
                id,
                ProductUpdate {
                    featured: Some(featured),
                    ..Default::default()
                },
            )
            .await?;
        self.state
            .broadcast_change(PRODUCTS_TABLE, ChangeAction::Updated, id, Some(&updated));
        self.refresh().await?;
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &str) -> AppResult<()> {
        self.state.products().delete(id).await?;
        self.state
            .broadcast_change::<()>(PRODUCTS_TABLE, ChangeAction::Deleted, id, None);
        self.refresh().await?;
        Ok(())
    }

    async fn check_featured_limit(
        &self,
        confirmed: bool,
        updating_id: Option<&str>,
    ) -> AppResult<()> {
        let featured = self.state.products().find_featured().await?;
        // A product that is already featured does not count against itself
        let count = match updating_id {
            Some(id) => {
                let pure =
                    crate::db::repository::strip_table_prefix(PRODUCTS_TABLE, id).to_string();
                featured
                    .iter()
                    .filter(|p| thing_id(&p.id) != pure)
                    .count()
            }
            None => featured.len(),
        };
        if count >= FEATURED_SOFT_LIMIT && !confirmed {
            return Err(AppError::business_rule(format!(
                "Featured list already has {count} products (soft limit {FEATURED_SOFT_LIMIT}); \
                 confirm to exceed it"
            )));
        }
        Ok(())
    }
}

/// Destructive catalog wipe: products, flavours and brands, in that order.
///
/// Refuses to run unless `phrase` matches [`WIPE_CONFIRMATION_PHRASE`]
/// exactly. Deletes are chunked batch deletes per collection; a failure
/// leaves earlier collections gone (no cross-collection transaction).
pub async fn wipe_catalog(state: &CatalogState, phrase: &str) -> AppResult<()> {
    if phrase != WIPE_CONFIRMATION_PHRASE {
        return Err(AppError::validation(format!(
            "Wipe not confirmed: type '{WIPE_CONFIRMATION_PHRASE}' exactly"
        )));
    }

    let products = state.products();
    let product_ids: Vec<String> = products
        .find_all()
        .await?
        .iter()
        .map(|p| thing_id(&p.id))
        .collect();
    products
        .base()
        .batch_delete(PRODUCTS_TABLE, &product_ids)
        .await?;
    state.broadcast_change::<()>(PRODUCTS_TABLE, ChangeAction::Deleted, "batch", None);

    let flavours = state.flavours();
    let flavour_ids: Vec<String> = flavours
        .find_all()
        .await?
        .iter()
        .map(|f| thing_id(&f.id))
        .collect();
    flavours
        .base()
        .batch_delete(FLAVOURS_TABLE, &flavour_ids)
        .await?;
    state.broadcast_change::<()>(FLAVOURS_TABLE, ChangeAction::Deleted, "batch", None);

    let brands = state.brands();
    let brand_ids: Vec<String> = brands
        .find_all()
        .await?
        .iter()
        .map(|b| thing_id(&b.id))
        .collect();
    brands.base().batch_delete(BRANDS_TABLE, &brand_ids).await?;
    state.broadcast_change::<()>(BRANDS_TABLE, ChangeAction::Deleted, "batch", None);

    tracing::warn!(
        products = product_ids.len(),
        flavours = flavour_ids.len(),
        brands = brand_ids.len(),
        "Catalog wiped"
    );
    Ok(())
}
