// src/models/core.rs

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Confirmation status of a match as it appears in the gazette workflow.
/// Status may only ever escalate from `Published` to `Approved`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchStatus {
    Published,
    Approved,
}

impl MatchStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchStatus::Published => "Published",
            MatchStatus::Approved => "Approved",
        }
    }

    pub fn from_db_str(s: &str) -> Self {
        if s == "Approved" {
            MatchStatus::Approved
        } else {
            MatchStatus::Published
        }
    }
}

/// One structured estate notice extracted from raw gazette text.
/// Ephemeral: created fresh per extraction pass, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GazetteRecord {
    pub court_station: String,
    pub cause_no: String,
    pub name_of_deceased: String,
    pub status_at_gp: MatchStatus,
    pub volume_no: String,
    pub date_published: String,
}

/// One row from the comparison spreadsheet, with the decedent-name field
/// already resolved from its arbitrary author-chosen column labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryRow {
    pub columns: Vec<(String, String)>,
    pub name_raw: String,
}

impl RegistryRow {
    /// Builds a row from decoded tabular output, resolving the decedent name.
    /// A row whose resolution misses gets an empty `name_raw` and is later
    /// excluded from matching; that is expected, not an error.
    pub fn from_columns(columns: Vec<(String, String)>) -> Self {
        let name_raw = crate::extraction::registry::resolve_name(&columns);
        Self { columns, name_raw }
    }

    pub fn has_name(&self) -> bool {
        !self.name_raw.trim().is_empty()
    }
}

/// A durably stored match row, one per composite identity
/// (court_station, cause_no, name_norm, date_published, volume_no).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedMatch {
    pub id: i64,
    pub court_station: String,
    pub cause_no: String,
    pub name_norm: String,
    pub name_of_deceased: String,
    pub status_at_gp: MatchStatus,
    pub volume_no: String,
    pub date_published: String,
    pub score: f64,
    pub duplicate: bool,
    pub excel_name: Option<String>,
    pub match_type: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}
