//! Slider Model
//!
//! The storefront carousel is a single document (`sliders:main`) mapping
//! `image1`, `image2`, … keys to image paths or URLs.

use super::serde_thing;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use surrealdb::sql::Thing;

/// Fixed record key of the singleton slider document
pub const SLIDER_DOC_ID: &str = "main";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SliderDoc {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "serde_thing::option"
    )]
    pub id: Option<Thing>,
    /// `imageN` key → path/URL, kept sorted so slide order is stable
    #[serde(flatten)]
    pub images: BTreeMap<String, String>,
}

impl SliderDoc {
    /// Slide paths in `image1..imageN` order
    pub fn ordered_images(&self) -> Vec<&str> {
        let mut keyed: Vec<(u32, &str)> = self
            .images
            .iter()
            .filter_map(|(k, v)| {
                k.strip_prefix("image")
                    .and_then(|n| n.parse::<u32>().ok())
                    .map(|n| (n, v.as_str()))
            })
            .collect();
        keyed.sort_by_key(|(n, _)| *n);
        keyed.into_iter().map(|(_, v)| v).collect()
    }

    pub fn set_image(&mut self, index: u32, path: impl Into<String>) {
        self.images.insert(format!("image{index}"), path.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordered_images_sorts_numerically() {
        let mut doc = SliderDoc::default();
        doc.set_image(10, "j.jpg");
        doc.set_image(2, "b.jpg");
        doc.set_image(1, "a.jpg");
        assert_eq!(doc.ordered_images(), vec!["a.jpg", "b.jpg", "j.jpg"]);
    }
}
