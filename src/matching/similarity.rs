// src/matching/similarity.rs - Composite fuzzy scoring

use std::collections::HashSet;

use strsim::jaro_winkler;

const JARO_WINKLER_WEIGHT: f64 = 0.7;
const JACCARD_WEIGHT: f64 = 0.3;

/// Jaccard similarity over token *sets* (duplicates collapsed), with a
/// union-size floor of 1 so two empty sets score 0 instead of dividing by
/// zero.
pub fn jaccard(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let intersection = a.intersection(b).count();
    let union = a.union(b).count().max(1);
    intersection as f64 / union as f64
}

/// Weighted blend used by the fuzzy mode: 0.7 Jaro-Winkler on the normalized
/// names plus 0.3 Jaccard on the token sets. Jaro-Winkler carries the
/// character-level misspelling tolerance; Jaccard anchors the score to how
/// many whole tokens the two names actually share.
pub fn composite_score(
    norm_a: &str,
    norm_b: &str,
    tokens_a: &HashSet<String>,
    tokens_b: &HashSet<String>,
) -> f64 {
    JARO_WINKLER_WEIGHT * jaro_winkler(norm_a, norm_b) + JACCARD_WEIGHT * jaccard(tokens_a, tokens_b)
}
