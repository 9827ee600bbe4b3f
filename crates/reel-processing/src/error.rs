//! Custom error types for the cleaning pipeline.
//!
//! This module provides the error hierarchy using `thiserror`. Every stage
//! fails as a whole: an error identifies the stage and the offending column
//! so the caller can diagnose without inspecting a half-mutated table.

use thiserror::Error;

/// The main error type for the cleaning pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The input file could not be read or parsed into a table.
    #[error("Failed to ingest '{path}': {reason}")]
    Ingest { path: String, reason: String },

    /// A stage referenced a column that does not exist.
    #[error("Column '{column}' not found during {stage}")]
    Schema {
        stage: &'static str,
        column: String,
    },

    /// The imputation mean is undefined for a column.
    #[error("Failed to impute column '{column}': {reason}")]
    Imputation { column: String, reason: String },

    /// A derived column could not be computed.
    #[error("Failed to compute derived column from '{column}': {reason}")]
    Computation { column: String, reason: String },

    /// An aggregate query referenced a bad grouping or value column.
    #[error("Aggregation over column '{column}' failed: {reason}")]
    Aggregation { column: String, reason: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PipelineError>,
    },
}

impl PipelineError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PipelineError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code, useful for matching in callers and logs.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Ingest { .. } => "INGEST_ERROR",
            Self::Schema { .. } => "SCHEMA_ERROR",
            Self::Imputation { .. } => "IMPUTATION_ERROR",
            Self::Computation { .. } => "COMPUTATION_ERROR",
            Self::Aggregation { .. } => "AGGREGATION_ERROR",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Convenience constructor for missing-column failures.
    pub fn missing_column(stage: &'static str, column: impl Into<String>) -> Self {
        Self::Schema {
            stage,
            column: column.into(),
        }
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PipelineError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        let err = PipelineError::missing_column("prune", "homepage");
        assert_eq!(err.error_code(), "SCHEMA_ERROR");

        let err = PipelineError::Imputation {
            column: "budget".to_string(),
            reason: "no non-sentinel values".to_string(),
        };
        assert_eq!(err.error_code(), "IMPUTATION_ERROR");
    }

    #[test]
    fn test_with_context_preserves_code() {
        let err = PipelineError::Aggregation {
            column: "profit".to_string(),
            reason: "column is not numeric".to_string(),
        }
        .with_context("While answering question 1");

        assert!(err.to_string().contains("While answering question 1"));
        assert_eq!(err.error_code(), "AGGREGATION_ERROR");
    }

    #[test]
    fn test_display_names_column() {
        let err = PipelineError::missing_column("expand", "genres");
        assert!(err.to_string().contains("genres"));
        assert!(err.to_string().contains("expand"));
    }
}
