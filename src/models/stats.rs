// src/models/stats.rs

use serde::{Deserialize, Serialize};

/// Counters describing a single matching run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchRunStats {
    pub gazette_records: usize,
    pub registry_rows: usize,
    pub rows_without_name: usize,
    pub candidates_considered: usize,
    pub accepted: usize,
    pub review: usize,
    pub discarded: usize,
    pub deduplicated: usize,
}

/// Counters describing a single persistence pass.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UpsertStats {
    pub inserted: u64,
    pub updated: u64,
    pub failed_batches: u64,
}
