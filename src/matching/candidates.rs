// src/matching/candidates.rs - Lookup indices and fuzzy candidate generation

use std::collections::{HashMap, HashSet};

use crate::matching::name::{canonical_signature, name_tokens, normalize_name};
use crate::matching::similarity::composite_score;
use crate::models::core::{GazetteRecord, RegistryRow};

/// Fuzzy results are capped per gazette record to bound output size.
pub const MAX_CANDIDATES_PER_RECORD: usize = 5;

/// Above this registry size the fuzzy scan is restricted to rows sharing at
/// least one name token with the gazette record. Below it a full scan runs,
/// preserving tolerance for names misspelled in every token.
pub const FUZZY_FULL_SCAN_LIMIT: usize = 2_000;

/// A gazette record with its derived name forms, computed once per run.
#[derive(Debug, Clone)]
pub struct GazetteNameData {
    pub record: GazetteRecord,
    pub name_norm: String,
    pub signature: String,
    pub tokens: HashSet<String>,
}

/// A registry row with its derived name forms, computed once per run.
#[derive(Debug, Clone)]
pub struct RegistryNameData {
    pub row: RegistryRow,
    pub name_norm: String,
    pub signature: String,
    pub tokens: HashSet<String>,
}

/// Prepares gazette records for matching. Records whose name normalizes to
/// nothing cannot match anything and are skipped here.
pub fn prepare_gazette_data(records: &[GazetteRecord]) -> Vec<GazetteNameData> {
    records
        .iter()
        .filter_map(|record| {
            let name_norm = normalize_name(&record.name_of_deceased);
            if name_norm.is_empty() {
                return None;
            }
            Some(GazetteNameData {
                record: record.clone(),
                signature: canonical_signature(&record.name_of_deceased),
                tokens: name_tokens(&record.name_of_deceased),
                name_norm,
            })
        })
        .collect()
}

/// Prepares registry rows for matching. Rows whose name resolution missed
/// (empty `name_raw`) are excluded; that is normal control flow.
pub fn prepare_registry_data(rows: &[RegistryRow]) -> Vec<RegistryNameData> {
    rows.iter()
        .filter(|row| row.has_name())
        .filter_map(|row| {
            let name_norm = normalize_name(&row.name_raw);
            if name_norm.is_empty() {
                return None;
            }
            Some(RegistryNameData {
                row: row.clone(),
                signature: canonical_signature(&row.name_raw),
                tokens: name_tokens(&row.name_raw),
                name_norm,
            })
        })
        .collect()
}

/// Index from normalized name to registry row positions. O(1) average lookup
/// for the exact mode.
pub fn index_by_norm(data: &[RegistryNameData]) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, entry) in data.iter().enumerate() {
        index.entry(entry.name_norm.clone()).or_default().push(idx);
    }
    index
}

/// Index from canonical token signature to registry row positions, for the
/// tokens mode.
pub fn index_by_signature(data: &[RegistryNameData]) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, entry) in data.iter().enumerate() {
        if !entry.signature.is_empty() {
            index.entry(entry.signature.clone()).or_default().push(idx);
        }
    }
    index
}

/// Coarse token -> row-positions index used to restrict large fuzzy scans.
pub fn build_token_index(data: &[RegistryNameData]) -> HashMap<String, Vec<usize>> {
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    for (idx, entry) in data.iter().enumerate() {
        for token in &entry.tokens {
            index.entry(token.clone()).or_default().push(idx);
        }
    }
    index
}

/// Scores one gazette record against the registry and returns row positions
/// with their composite scores: only pairs at or above `floor`, ranked
/// descending, capped at [`MAX_CANDIDATES_PER_RECORD`].
pub fn fuzzy_candidates(
    gazette: &GazetteNameData,
    registry: &[RegistryNameData],
    token_index: &HashMap<String, Vec<usize>>,
    floor: f64,
) -> Vec<(usize, f64)> {
    let candidate_indices: Vec<usize> = if registry.len() > FUZZY_FULL_SCAN_LIMIT {
        let mut seen: HashSet<usize> = HashSet::new();
        for token in &gazette.tokens {
            if let Some(indices) = token_index.get(token) {
                seen.extend(indices.iter().copied());
            }
        }
        let mut indices: Vec<usize> = seen.into_iter().collect();
        indices.sort_unstable();
        indices
    } else {
        (0..registry.len()).collect()
    };

    let mut scored: Vec<(usize, f64)> = candidate_indices
        .into_iter()
        .map(|idx| {
            let entry = &registry[idx];
            let score = composite_score(
                &gazette.name_norm,
                &entry.name_norm,
                &gazette.tokens,
                &entry.tokens,
            );
            (idx, score)
        })
        .filter(|(_, score)| *score >= floor)
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(MAX_CANDIDATES_PER_RECORD);
    scored
}
