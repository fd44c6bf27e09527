//! Brand Admin Controller

use validator::Validate;

use crate::core::CatalogState;
use crate::db::models::{Brand, BrandCreate, BrandUpdate};
use crate::db::repository::BRANDS_TABLE;
use crate::feed::ChangeAction;
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, validate_optional_text, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Admin view over the brands collection. Holds an explicit snapshot that is
/// refreshed from the store after every mutation; view code reads
/// [`BrandAdmin::brands`] between refreshes.
pub struct BrandAdmin {
    state: CatalogState,
    pub brands: Vec<Brand>,
}

impl BrandAdmin {
    pub async fn new(state: CatalogState) -> AppResult<Self> {
        let mut admin = Self {
            state,
            brands: Vec::new(),
        };
        admin.refresh().await?;
        Ok(admin)
    }

    /// Re-fetch the snapshot (called after mutations and on feed events)
    pub async fn refresh(&mut self) -> AppResult<()> {
        self.brands = self.state.brands().find_all().await?;
        Ok(())
    }

    pub async fn create(&mut self, data: BrandCreate) -> AppResult<Brand> {
        data.validate()?;
        let created = self.state.brands().create(data).await?;
        let id = thing_id(&created.id);
        self.state
            .broadcast_change(BRANDS_TABLE, ChangeAction::Created, &id, Some(&created));
        self.refresh().await?;
        Ok(created)
    }

    pub async fn update(&mut self, id: &str, data: BrandUpdate) -> AppResult<Brand> {
        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_optional_text(&data.description, "description", MAX_DESCRIPTION_LEN)?;

        // Renaming onto an existing brand would break the unique-name contract
        if let Some(new_name) = &data.name
            && let Some(other) = self.state.brands().find_by_name(new_name).await?
            && thing_id(&other.id) != crate::db::repository::strip_table_prefix(BRANDS_TABLE, id)
        {
            return Err(AppError::conflict(format!(
                "Brand '{new_name}' already exists"
            )));
        }

        let updated = self.state.brands().update(id, data).await?;
        self.state
            .broadcast_change(BRANDS_TABLE, ChangeAction::Updated, id, Some(&updated));
        self.refresh().await?;
        Ok(updated)
    }

    /// Move a brand in the storefront ordering
    pub async fn reorder(&mut self, id: &str, display_order: i32) -> AppResult<Brand> {
        if display_order < 1 {
            return Err(AppError::validation("display_order must be >= 1"));
        }
        let updated = self
            .state
            .brands()
            .update_display_order(id, display_order)
            .await?;
        self.state
            .broadcast_change(BRANDS_TABLE, ChangeAction::Updated, id, Some(&updated));
        self.refresh().await?;
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &str) -> AppResult<()> {
        self.state.brands().delete(id).await?;
        self.state
            .broadcast_change::<()>(BRANDS_TABLE, ChangeAction::Deleted, id, None);
        self.refresh().await?;
        Ok(())
    }
}

pub(crate) fn thing_id(id: &Option<surrealdb::sql::Thing>) -> String {
    id.as_ref().map(|t| t.id.to_raw()).unwrap_or_default()
}
