//! Slider Repository
//!
//! The carousel is one well-known document, `sliders:main`.

use super::{BaseRepository, RepoResult, SLIDERS_TABLE};
use crate::db::models::{SLIDER_DOC_ID, SliderDoc};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

#[derive(Clone)]
pub struct SliderRepository {
    base: BaseRepository,
}

impl SliderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// The singleton slider document; an empty one when never written
    pub async fn get(&self) -> RepoResult<SliderDoc> {
        let doc: Option<SliderDoc> = self
            .base
            .db()
            .select((SLIDERS_TABLE, SLIDER_DOC_ID))
            .await?;
        Ok(doc.unwrap_or_default())
    }

    /// Replace the singleton slider document (upsert)
    pub async fn set(&self, mut doc: SliderDoc) -> RepoResult<SliderDoc> {
        doc.id = None;
        let saved: Option<SliderDoc> = self
            .base
            .db()
            .upsert((SLIDERS_TABLE, SLIDER_DOC_ID))
            .content(doc)
            .await?;
        Ok(saved.unwrap_or_default())
    }

    /// Set one `image<N>` slot
    pub async fn set_image(&self, index: u32, path: &str) -> RepoResult<SliderDoc> {
        let mut doc = self.get().await?;
        doc.set_image(index, path);
        self.set(doc).await
    }
}
