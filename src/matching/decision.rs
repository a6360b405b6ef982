// src/matching/decision.rs - Accept/review tiering and in-run deduplication

use std::collections::HashSet;

use log::debug;

use crate::matching::name::normalize_name;
use crate::models::matching::{MatchCandidate, MatchThresholds};

#[derive(Debug, Default, Clone, Copy)]
pub struct DecisionCounts {
    pub accepted: usize,
    pub review: usize,
    pub discarded: usize,
    pub deduplicated: usize,
}

/// Classifies scored candidates into accept and review tiers, discarding
/// everything under the review threshold. Within the run, accepted and
/// review candidates are deduplicated by (name_norm, date_published,
/// volume_no); the first occurrence wins and later ones are dropped
/// silently. Candidates must arrive ranked the way the indexer produced
/// them, best score first per gazette record.
pub fn decide(
    candidates: Vec<MatchCandidate>,
    thresholds: &MatchThresholds,
) -> (Vec<MatchCandidate>, Vec<MatchCandidate>, DecisionCounts) {
    let mut accepted = Vec::new();
    let mut review = Vec::new();
    let mut counts = DecisionCounts::default();
    let mut seen_keys: HashSet<(String, String, String)> = HashSet::new();

    for candidate in candidates {
        if candidate.score < thresholds.review {
            counts.discarded += 1;
            continue;
        }

        let key = (
            normalize_name(&candidate.gazette.name_of_deceased),
            candidate.gazette.date_published.clone(),
            candidate.gazette.volume_no.clone(),
        );
        if !seen_keys.insert(key) {
            counts.deduplicated += 1;
            continue;
        }

        if candidate.score >= thresholds.accept {
            counts.accepted += 1;
            accepted.push(candidate);
        } else {
            counts.review += 1;
            review.push(candidate);
        }
    }

    debug!(
        "Decision pass: {} accepted, {} for review, {} discarded, {} deduplicated",
        counts.accepted, counts.review, counts.discarded, counts.deduplicated
    );

    (accepted, review, counts)
}
