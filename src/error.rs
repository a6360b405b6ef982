// src/error.rs

use thiserror::Error;

/// Caller-supplied input failed a precondition. Checked before any matching
/// work begins; never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputValidationError {
    #[error("threshold {0} is outside the [0, 1] range")]
    ThresholdOutOfRange(f64),
    #[error("review threshold {review} exceeds accept threshold {accept}")]
    ThresholdOrder { review: f64, accept: f64 },
}

/// The requested match mode is not one of exact, tokens or fuzzy.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unknown match mode '{0}' (expected one of: exact, tokens, fuzzy)")]
pub struct UnknownModeError(pub String);
