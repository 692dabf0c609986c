//! Error types for the HemaGuard pipeline.
//!
//! All fallible operations return `HemaResult<T>`. Variants carry a plain
//! `reason` string so the CLI can print them without further formatting.

use thiserror::Error;

/// The unified error type for every HemaGuard crate.
#[derive(Debug, Error)]
pub enum HemaError {
    /// A required marker is missing or non-numeric for a single record.
    ///
    /// Fatal to that one request only; other records are unaffected.
    #[error("invalid record: {reason}")]
    InvalidRecord { reason: String },

    /// The model artifact or its feature manifest could not be loaded, or the
    /// manifest does not match the feature order the caller expects.
    #[error("model load failed: {reason}")]
    ModelLoad { reason: String },

    /// A batch table lacks a column that cannot be recovered through synonyms
    /// or fallbacks. Aborts that batch job.
    #[error("dataset schema error: {reason}")]
    DatasetSchema { reason: String },

    /// A rule or application configuration document is malformed.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// Reading or writing a file failed.
    #[error("io error: {reason}")]
    Io { reason: String },

    /// A CSV document could not be parsed or written.
    #[error("csv error: {reason}")]
    Csv { reason: String },
}

impl HemaError {
    /// Shorthand for `HemaError::InvalidRecord`.
    pub fn invalid_record(reason: impl Into<String>) -> Self {
        Self::InvalidRecord { reason: reason.into() }
    }

    /// Shorthand for `HemaError::ModelLoad`.
    pub fn model_load(reason: impl Into<String>) -> Self {
        Self::ModelLoad { reason: reason.into() }
    }

    /// Shorthand for `HemaError::DatasetSchema`.
    pub fn dataset_schema(reason: impl Into<String>) -> Self {
        Self::DatasetSchema { reason: reason.into() }
    }
}

/// Convenience alias used throughout the HemaGuard crates.
pub type HemaResult<T> = Result<T, HemaError>;
