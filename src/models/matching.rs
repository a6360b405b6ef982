// src/models/matching.rs

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{InputValidationError, UnknownModeError};
use crate::models::core::{GazetteRecord, RegistryRow};
use crate::models::stats::MatchRunStats;

/// Matching strategy selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMode {
    Exact,
    Tokens,
    Fuzzy,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Exact => "exact",
            MatchMode::Tokens => "tokens",
            MatchMode::Fuzzy => "fuzzy",
        }
    }
}

impl FromStr for MatchMode {
    type Err = UnknownModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "exact" => Ok(MatchMode::Exact),
            "tokens" => Ok(MatchMode::Tokens),
            "fuzzy" => Ok(MatchMode::Fuzzy),
            other => Err(UnknownModeError(other.to_string())),
        }
    }
}

/// Accept/review score cutoffs for the decision engine.
/// Both must lie in [0, 1] and `review` must not exceed `accept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchThresholds {
    pub accept: f64,
    pub review: f64,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            accept: 0.8,
            review: 0.5,
        }
    }
}

impl MatchThresholds {
    pub fn new(accept: f64, review: f64) -> Self {
        Self { accept, review }
    }

    pub fn validate(&self) -> Result<(), InputValidationError> {
        for value in [self.accept, self.review] {
            if !(0.0..=1.0).contains(&value) || value.is_nan() {
                return Err(InputValidationError::ThresholdOutOfRange(value));
            }
        }
        if self.review > self.accept {
            return Err(InputValidationError::ThresholdOrder {
                review: self.review,
                accept: self.accept,
            });
        }
        Ok(())
    }
}

/// One scored gazette/registry pairing produced during a matching run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCandidate {
    pub gazette: GazetteRecord,
    pub registry: RegistryRow,
    pub score: f64,
    pub mode: MatchMode,
}

/// Result of a matching run: accept-tier candidates (forwarded to
/// persistence), review-tier candidates (returned for manual disposition),
/// and run-level counters.
#[derive(Debug, Clone)]
pub struct MatchOutcome {
    pub accepted: Vec<MatchCandidate>,
    pub review: Vec<MatchCandidate>,
    pub stats: MatchRunStats,
}
