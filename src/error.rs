//! Input validation errors for the rubric engine.
//!
//! Only malformed records are errors. Degraded stance classification
//! (no similarity backend, short evidence text) falls back silently and is
//! never reported through this type.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A required field is missing or a value lies outside its closed domain.
    #[error("malformed evaluation record: {0}")]
    Malformed(String),

    #[error("numeric_diffs[{index}] is negative ({value})")]
    NegativeNumericDiff { index: usize, value: f64 },

    #[error("numeric_diffs[{index}] is not a finite number")]
    NonFiniteNumericDiff { index: usize },

    #[error("citation_verifiability_rate must lie in [0, 1], got {0}")]
    VerifiabilityOutOfRange(f64),
}

impl From<serde_json::Error> for ValidationError {
    fn from(e: serde_json::Error) -> Self {
        ValidationError::Malformed(e.to_string())
    }
}
