//! Name Similarity Scoring
//!
//! Scores how well a candidate image path matches a flavour or product name.
//! Scores are 0..=100; anything under [`SIMILARITY_THRESHOLD`] is treated as
//! no match.

use std::collections::HashSet;

/// Minimum score for a candidate to count as a match
pub const SIMILARITY_THRESHOLD: u32 = 30;

/// Strategy seam for scoring a name against a candidate path
pub trait SimilarityScorer: Send + Sync {
    fn score(&self, name: &str, candidate_path: &str) -> u32;
}

/// Keyword scorer: exact match wins outright, containment scales with length
/// ratio, otherwise shared tokens carry the score.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeywordScorer;

impl SimilarityScorer for KeywordScorer {
    fn score(&self, name: &str, candidate_path: &str) -> u32 {
        let name_norm = normalize(name);
        let file_norm = normalize(file_stem(candidate_path));
        if name_norm.is_empty() || file_norm.is_empty() {
            return 0;
        }

        if name_norm == file_norm {
            return 100;
        }

        // Containment either way: score by how much of the longer string the
        // shorter one covers
        if name_norm.contains(&file_norm) || file_norm.contains(&name_norm) {
            let shorter = name_norm.len().min(file_norm.len()) as u32;
            let longer = name_norm.len().max(file_norm.len()) as u32;
            return (100 * shorter / longer).max(SIMILARITY_THRESHOLD);
        }

        token_overlap_score(&name_norm, &file_norm)
    }
}

/// Fraction of name tokens found in the candidate, with a small bonus for
/// partial token containment
fn token_overlap_score(name_norm: &str, file_norm: &str) -> u32 {
    let name_tokens: Vec<&str> = name_norm.split(' ').filter(|t| t.len() > 1).collect();
    if name_tokens.is_empty() {
        return 0;
    }
    let file_tokens: HashSet<&str> = file_norm.split(' ').collect();

    let mut exact = 0u32;
    let mut partial = 0u32;
    for token in &name_tokens {
        if file_tokens.contains(token) {
            exact += 1;
        } else if file_tokens.iter().any(|f| f.contains(token) || token.contains(f)) {
            partial += 1;
        }
    }

    let base = 90 * exact / name_tokens.len() as u32;
    let bonus = (10 * partial / name_tokens.len() as u32).min(10);
    (base + bonus).min(100)
}

/// File name without directories or extension
fn file_stem(path: &str) -> &str {
    let name = path.rsplit('/').next().unwrap_or(path);
    name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name)
}

/// Lower-case, punctuation and separators to spaces, collapse runs
pub fn normalize(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut last_space = true;
    for c in s.chars() {
        if c.is_alphanumeric() {
            out.extend(c.to_lowercase());
            last_space = false;
        } else if !last_space {
            out.push(' ');
            last_space = true;
        }
    }
    while out.ends_with(' ') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_file_stem_match_scores_high() {
        let scorer = KeywordScorer;
        let score = scorer.score("Blue Raz Ice", "images/coastal_clouds/blue_raz_ice.jpg");
        assert!(score >= 90, "expected >= 90, got {score}");
    }

    #[test]
    fn unrelated_name_scores_below_threshold() {
        let scorer = KeywordScorer;
        let score = scorer.score("Totally Unrelated", "images/coastal_clouds/blue_raz_ice.jpg");
        assert!(
            score < SIMILARITY_THRESHOLD,
            "expected < {SIMILARITY_THRESHOLD}, got {score}"
        );
    }

    #[test]
    fn partial_token_overlap_lands_between() {
        let scorer = KeywordScorer;
        let score = scorer.score("Blue Raspberry", "images/x/blue_raz_ice.jpg");
        assert!(score >= SIMILARITY_THRESHOLD);
        assert!(score < 90);
    }

    #[test]
    fn normalization_strips_punctuation_and_case() {
        assert_eq!(normalize("  Blue-Raz   ICE! "), "blue raz ice");
        assert_eq!(normalize("naked100"), "naked100");
    }
}
