// src/lib.rs

pub mod db;
pub mod error;
pub mod extraction;
pub mod matching;
pub mod models;
pub mod utils;

pub use db::{clear_matches, flag_duplicates, init_schema, list_matches, upsert_matches, NewMatchRow};
pub use error::{InputValidationError, UnknownModeError};
pub use extraction::{extract, resolve_name};
pub use matching::match_records;
pub use models::core::{GazetteRecord, MatchStatus, PersistedMatch, RegistryRow};
pub use models::matching::{MatchCandidate, MatchMode, MatchOutcome, MatchThresholds};
pub use models::stats::{MatchRunStats, UpsertStats};
pub use utils::db_connect::StoreConfig;
