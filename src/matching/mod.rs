// src/matching/mod.rs - Matching run coordination

pub mod candidates;
pub mod decision;
pub mod name;
pub mod similarity;

use anyhow::Result;
use log::{debug, info};

use crate::matching::candidates::{
    build_token_index, fuzzy_candidates, index_by_norm, index_by_signature, prepare_gazette_data,
    prepare_registry_data, RegistryNameData,
};
use crate::models::core::{GazetteRecord, RegistryRow};
use crate::models::matching::{MatchCandidate, MatchMode, MatchOutcome, MatchThresholds};
use crate::models::stats::MatchRunStats;

/// Runs one matching pass of gazette records against registry rows.
///
/// Thresholds are validated before any work begins. Extraction-side records
/// with unusable names and registry rows whose name resolution missed are
/// skipped as normal control flow. Accepted candidates are intended for
/// persistence; review candidates are returned for manual disposition.
pub fn match_records(
    gazette_records: &[GazetteRecord],
    registry_rows: &[RegistryRow],
    mode: MatchMode,
    thresholds: MatchThresholds,
) -> Result<MatchOutcome> {
    thresholds.validate()?;

    info!(
        "Matching {} gazette records against {} registry rows in {} mode",
        gazette_records.len(),
        registry_rows.len(),
        mode.as_str()
    );

    let gazette_data = prepare_gazette_data(gazette_records);
    let registry_data = prepare_registry_data(registry_rows);
    let rows_without_name = registry_rows.len() - registry_data.len();
    if rows_without_name > 0 {
        debug!(
            "{} registry rows had no resolvable decedent name and were excluded",
            rows_without_name
        );
    }

    let mut candidates: Vec<MatchCandidate> = Vec::new();
    match mode {
        MatchMode::Exact => {
            let index = index_by_norm(&registry_data);
            for entry in &gazette_data {
                if let Some(indices) = index.get(&entry.name_norm) {
                    push_unit_candidates(&mut candidates, entry.record.clone(), indices, &registry_data, mode);
                }
            }
        }
        MatchMode::Tokens => {
            let index = index_by_signature(&registry_data);
            for entry in &gazette_data {
                if entry.signature.is_empty() {
                    continue;
                }
                if let Some(indices) = index.get(&entry.signature) {
                    push_unit_candidates(&mut candidates, entry.record.clone(), indices, &registry_data, mode);
                }
            }
        }
        MatchMode::Fuzzy => {
            let token_index = build_token_index(&registry_data);
            for entry in &gazette_data {
                for (idx, score) in
                    fuzzy_candidates(entry, &registry_data, &token_index, thresholds.review)
                {
                    candidates.push(MatchCandidate {
                        gazette: entry.record.clone(),
                        registry: registry_data[idx].row.clone(),
                        score,
                        mode,
                    });
                }
            }
        }
    }

    let candidates_considered = candidates.len();
    let (accepted, review, counts) = decision::decide(candidates, &thresholds);

    let stats = MatchRunStats {
        gazette_records: gazette_records.len(),
        registry_rows: registry_rows.len(),
        rows_without_name,
        candidates_considered,
        accepted: counts.accepted,
        review: counts.review,
        discarded: counts.discarded,
        deduplicated: counts.deduplicated,
    };

    info!(
        "Matching complete: {} accepted, {} for review ({} considered, {} discarded, {} deduplicated)",
        stats.accepted, stats.review, stats.candidates_considered, stats.discarded, stats.deduplicated
    );

    Ok(MatchOutcome {
        accepted,
        review,
        stats,
    })
}

fn push_unit_candidates(
    candidates: &mut Vec<MatchCandidate>,
    gazette: GazetteRecord,
    indices: &[usize],
    registry_data: &[RegistryNameData],
    mode: MatchMode,
) {
    for idx in indices {
        candidates.push(MatchCandidate {
            gazette: gazette.clone(),
            registry: registry_data[*idx].row.clone(),
            score: 1.0,
            mode,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InputValidationError;
    use crate::models::core::MatchStatus;
    use std::str::FromStr;

    fn gazette(name: &str) -> GazetteRecord {
        GazetteRecord {
            court_station: "Nairobi High Court".to_string(),
            cause_no: "123 OF 2020".to_string(),
            name_of_deceased: name.to_string(),
            status_at_gp: MatchStatus::Published,
            volume_no: "Vol. CXXII - No. 45".to_string(),
            date_published: "15th May 2020".to_string(),
        }
    }

    fn registry_row(label: &str, name: &str) -> RegistryRow {
        RegistryRow::from_columns(vec![(label.to_string(), name.to_string())])
    }

    #[test]
    fn test_exact_mode_matches_normalized_names() {
        let outcome = match_records(
            &[gazette("JOHN KAMAU")],
            &[
                registry_row("Name of the Deceased", "John Kamau"),
                registry_row("Name of the Deceased", "Peter Otieno"),
            ],
            MatchMode::Exact,
            MatchThresholds::default(),
        )
        .unwrap();

        assert_eq!(outcome.accepted.len(), 1);
        assert!(outcome.review.is_empty());
        assert_eq!(outcome.accepted[0].registry.name_raw, "John Kamau");
        assert!((outcome.accepted[0].score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_tokens_mode_is_word_order_insensitive() {
        let outcome = match_records(
            &[gazette("JOHN OTIENO")],
            &[registry_row("Deceased Name", "Otieno John")],
            MatchMode::Tokens,
            MatchThresholds::default(),
        )
        .unwrap();

        assert_eq!(outcome.accepted.len(), 1);
    }

    #[test]
    fn test_tokens_mode_does_not_tolerate_misspelling() {
        let outcome = match_records(
            &[gazette("JOHN OTIENO")],
            &[registry_row("Deceased Name", "Jon Otieno")],
            MatchMode::Tokens,
            MatchThresholds::default(),
        )
        .unwrap();

        assert!(outcome.accepted.is_empty());
        assert!(outcome.review.is_empty());
    }

    #[test]
    fn test_fuzzy_mode_sends_misspelling_to_review() {
        let outcome = match_records(
            &[gazette("JOHN KAMAU")],
            &[registry_row("Deceased Name", "Jon Kamau")],
            MatchMode::Fuzzy,
            MatchThresholds::default(),
        )
        .unwrap();

        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.review.len(), 1);
        let score = outcome.review[0].score;
        assert!(score > 0.75 && score < 0.80, "score was {}", score);
    }

    #[test]
    fn test_fuzzy_mode_accepts_strong_overlap() {
        let outcome = match_records(
            &[gazette("JOHN KAMAU")],
            &[registry_row("Deceased Name", "John Kamau Mwangi")],
            MatchMode::Fuzzy,
            MatchThresholds::default(),
        )
        .unwrap();

        assert_eq!(outcome.accepted.len(), 1);
        assert!(outcome.accepted[0].score >= 0.8);
    }

    #[test]
    fn test_rows_without_name_are_excluded() {
        let outcome = match_records(
            &[gazette("JOHN KAMAU")],
            &[registry_row("Remarks", "John Kamau")],
            MatchMode::Exact,
            MatchThresholds::default(),
        )
        .unwrap();

        assert!(outcome.accepted.is_empty());
        assert_eq!(outcome.stats.rows_without_name, 1);
    }

    #[test]
    fn test_threshold_validation_rejects_bad_input() {
        let err = match_records(
            &[],
            &[],
            MatchMode::Exact,
            MatchThresholds::new(1.5, 0.5),
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<InputValidationError>(),
            Some(&InputValidationError::ThresholdOutOfRange(1.5))
        );

        let err = match_records(
            &[],
            &[],
            MatchMode::Exact,
            MatchThresholds::new(0.6, 0.9),
        )
        .unwrap_err();
        assert_eq!(
            err.downcast_ref::<InputValidationError>(),
            Some(&InputValidationError::ThresholdOrder {
                review: 0.9,
                accept: 0.6
            })
        );
    }

    #[test]
    fn test_unknown_mode_string_is_rejected() {
        let err = MatchMode::from_str("semantic").unwrap_err();
        assert_eq!(err.0, "semantic");
        assert!(MatchMode::from_str("Fuzzy").is_ok());
    }
}
