//! Error types for the AMN core library.
//!
//! Only configuration problems surface as errors. Degraded inputs (empty
//! text, no lexicon matches, empty candidate sets) always produce neutral
//! results instead.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all AMN operations.
#[derive(Error, Debug)]
pub enum AmnError {
    /// Retrieval weights do not sum to 1.0.
    #[error("Retrieval weights must sum to 1.0 (got {sum:.4})")]
    InvalidWeights {
        /// The actual sum of the configured weights.
        sum: f64,
    },

    /// A capacity-like setting was zero.
    #[error("{setting} must be at least 1 (got {value})")]
    InvalidCapacity {
        /// Which setting was invalid.
        setting: &'static str,
        /// The rejected value.
        value: usize,
    },

    /// The lexicon source does not exist.
    #[error("Lexicon not found: {}", .0.display())]
    LexiconNotFound(PathBuf),

    /// A lexicon row was malformed or out of range.
    #[error("Invalid lexicon row {line}: {reason}")]
    LexiconRow {
        /// 1-based line number in the source.
        line: u64,
        /// What was wrong with the row.
        reason: String,
    },

    /// CSV decoding failure while reading the lexicon.
    #[error("Lexicon CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Any other configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The external response generator failed.
    #[error("Response generator failed: {0}")]
    Generator(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, AmnError>;
