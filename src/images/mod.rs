//! Image Resolution
//!
//! Assigns catalog images to products and flavours from a static per-brand
//! pool. Resolution prefers the best name match above the similarity
//! threshold; when nothing matches, a round-robin over the brand's pool keeps
//! assignments varied without repeats until the pool is exhausted.

pub mod catalog;
pub mod similarity;

pub use catalog::{BRAND_IMAGES, DEFAULT_IMAGE, candidates_for, resolve_brand_key};
pub use similarity::{KeywordScorer, SIMILARITY_THRESHOLD, SimilarityScorer, normalize};

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// What kind of entity the image is for. Currently both kinds draw from the
/// same pool; the split exists so flavour thumbnails can diverge later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Product,
    Flavour,
}

#[derive(Default)]
struct UsedImages {
    used: HashSet<&'static str>,
    cursor: usize,
}

/// Stateful resolver. Tracks which candidates each brand has handed out so a
/// batch of assignments (one import run, one admin session) avoids repeats.
pub struct ImageResolver<S: SimilarityScorer = KeywordScorer> {
    scorer: S,
    state: Mutex<HashMap<&'static str, UsedImages>>,
}

impl Default for ImageResolver<KeywordScorer> {
    fn default() -> Self {
        Self::new(KeywordScorer)
    }
}

impl<S: SimilarityScorer> ImageResolver<S> {
    pub fn new(scorer: S) -> Self {
        Self {
            scorer,
            state: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve an image path for `name` under `brand`.
    ///
    /// A stored absolute URL wins outright and is returned unchanged; a
    /// stored relative path is treated as unresolved and falls through to
    /// the catalog. Unknown brands get [`DEFAULT_IMAGE`]. Known brands never
    /// go imageless: the best-scoring unused candidate wins; with no
    /// candidate above the threshold the round-robin cursor picks the next
    /// unused one; an exhausted pool resets and starts over.
    pub fn resolve(
        &self,
        stored: Option<&str>,
        brand: &str,
        name: &str,
        _kind: ImageKind,
    ) -> String {
        if let Some(url) = stored
            && is_absolute_url(url)
        {
            return url.to_string();
        }
        let Some(key) = resolve_brand_key(brand) else {
            return DEFAULT_IMAGE.to_string();
        };
        let pool = candidates_for(key);
        if pool.is_empty() {
            return DEFAULT_IMAGE.to_string();
        }

        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let entry = state.entry(key).or_default();

        if entry.used.len() >= pool.len() {
            entry.used.clear();
        }

        // Best unused candidate above the threshold
        let best = pool
            .iter()
            .filter(|p| !entry.used.contains(**p))
            .map(|p| (*p, self.scorer.score(name, p)))
            .filter(|(_, score)| *score >= SIMILARITY_THRESHOLD)
            .max_by_key(|(_, score)| *score);

        let chosen = match best {
            Some((path, _)) => path,
            None => {
                // Round-robin fallback; an unused candidate always exists
                // because the pool resets when exhausted
                let mut pick = pool[entry.cursor % pool.len()];
                while entry.used.contains(pick) {
                    entry.cursor = entry.cursor.wrapping_add(1);
                    pick = pool[entry.cursor % pool.len()];
                }
                entry.cursor = entry.cursor.wrapping_add(1);
                pick
            }
        };

        entry.used.insert(chosen);
        chosen.to_string()
    }

    /// Forget per-brand usage history
    pub fn reset(&self) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }
}

/// Absolute URLs pass through resolution untouched; anything else (bare file
/// names, catalog-relative paths) goes through the catalog
pub fn is_absolute_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://") || s.starts_with("//")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_absolute_url_is_returned_unchanged() {
        let resolver = ImageResolver::default();
        let url = "https://cdn.example.com/uploads/custom.jpg";
        // Even a known brand with a matching candidate never overrides it
        let path = resolver.resolve(Some(url), "Coastal Clouds", "Blue Raz Ice", ImageKind::Product);
        assert_eq!(path, url);
        let path = resolver.resolve(Some(url), "No Such Brand", "Anything", ImageKind::Flavour);
        assert_eq!(path, url);
    }

    #[test]
    fn stored_relative_path_falls_through_to_the_catalog() {
        let resolver = ImageResolver::default();
        let path = resolver.resolve(
            Some("uploads/custom.jpg"),
            "Coastal Clouds",
            "Blue Raz Ice",
            ImageKind::Flavour,
        );
        assert_eq!(path, "images/coastal_clouds/blue_raz_ice.jpg");
    }

    #[test]
    fn exact_flavour_name_picks_the_matching_file() {
        let resolver = ImageResolver::default();
        let path = resolver.resolve(None, "Coastal Clouds", "Blue Raz Ice", ImageKind::Flavour);
        assert_eq!(path, "images/coastal_clouds/blue_raz_ice.jpg");
    }

    #[test]
    fn unknown_brand_falls_back_to_placeholder() {
        let resolver = ImageResolver::default();
        let path = resolver.resolve(None, "No Such Brand", "Anything", ImageKind::Product);
        assert_eq!(path, DEFAULT_IMAGE);
    }

    #[test]
    fn known_brand_never_goes_imageless() {
        let resolver = ImageResolver::default();
        let path = resolver.resolve(None, "Twist", "Zzz Qqq Xxx", ImageKind::Product);
        assert_ne!(path, DEFAULT_IMAGE);
        assert!(path.starts_with("images/twist/"));
    }

    #[test]
    fn assignments_avoid_repeats_until_pool_exhausts() {
        let resolver = ImageResolver::default();
        let pool = candidates_for("blvk");
        let mut seen = std::collections::HashSet::new();
        for i in 0..pool.len() {
            let path =
                resolver.resolve(None, "BLVK", &format!("Nothing Matches {i}"), ImageKind::Product);
            assert!(seen.insert(path), "repeat before pool exhausted");
        }
        // Pool exhausted: the next call resets and reuses
        let again = resolver.resolve(None, "BLVK", "Still Nothing", ImageKind::Product);
        assert!(pool.contains(&again.as_str()));
    }
}
