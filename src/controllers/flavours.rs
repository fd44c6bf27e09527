//! Flavour Admin Controller

use validator::Validate;

use super::brands::thing_id;
use crate::core::CatalogState;
use crate::db::models::{Flavour, FlavourCreate, FlavourUpdate};
use crate::db::repository::FLAVOURS_TABLE;
use crate::feed::ChangeAction;
use crate::utils::AppResult;
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_URL_LEN, validate_optional_text, validate_required_text,
};

/// Admin view over the flavours collection, usually scoped to one brand
pub struct FlavourAdmin {
    state: CatalogState,
    brand: Option<String>,
    pub flavours: Vec<Flavour>,
}

impl FlavourAdmin {
    /// Brand-scoped admin (the usual flow: editing one brand's flavours)
    pub async fn for_brand(state: CatalogState, brand: impl Into<String>) -> AppResult<Self> {
        let mut admin = Self {
            state,
            brand: Some(brand.into()),
            flavours: Vec::new(),
        };
        admin.refresh().await?;
        Ok(admin)
    }

    /// Unscoped admin over every flavour
    pub async fn all(state: CatalogState) -> AppResult<Self> {
        let mut admin = Self {
            state,
            brand: None,
            flavours: Vec::new(),
        };
        admin.refresh().await?;
        Ok(admin)
    }

    pub async fn refresh(&mut self) -> AppResult<()> {
        self.flavours = match &self.brand {
            Some(brand) => self.state.flavours().find_by_brand(brand).await?,
            None => self.state.flavours().find_all().await?,
        };
        Ok(())
    }

    /// Create a flavour, the "add on the fly" path while editing a product.
    ///
    /// A missing flavour id is minted here. The supplied (or minted) id may
    /// duplicate another flavour of the same brand; only the
    /// `(productId, flavorId)` pair is guarded, and that check lives in the
    /// repository.
    pub async fn create(&mut self, mut data: FlavourCreate) -> AppResult<Flavour> {
        data.validate()?;
        if data.brand.is_none() {
            data.brand = self.brand.clone();
        }
        if data.flavor_id.as_deref().is_none_or(str::is_empty) {
            data.flavor_id = Some(uuid::Uuid::new_v4().to_string());
        }
        let created = self.state.flavours().create(data).await?;
        let id = thing_id(&created.id);
        self.state
            .broadcast_change(FLAVOURS_TABLE, ChangeAction::Created, &id, Some(&created));
        self.refresh().await?;
        Ok(created)
    }

    pub async fn update(&mut self, id: &str, data: FlavourUpdate) -> AppResult<Flavour> {
        if let Some(name) = &data.name {
            validate_required_text(name, "name", MAX_NAME_LEN)?;
        }
        validate_optional_text(&data.image, "image", MAX_URL_LEN)?;
        let updated = self.state.flavours().update(id, data).await?;
        self.state
            .broadcast_change(FLAVOURS_TABLE, ChangeAction::Updated, id, Some(&updated));
        self.refresh().await?;
        Ok(updated)
    }

    pub async fn delete(&mut self, id: &str) -> AppResult<()> {
        self.state.flavours().delete(id).await?;
        self.state
            .broadcast_change::<()>(FLAVOURS_TABLE, ChangeAction::Deleted, id, None);
        self.refresh().await?;
        Ok(())
    }
}
