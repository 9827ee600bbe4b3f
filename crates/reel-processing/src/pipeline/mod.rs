//! Pipeline module.
//!
//! Provides the main cleaning pipeline and its builder.

mod builder;

pub use builder::{Pipeline, PipelineBuilder};

use polars::prelude::DataFrame;
use serde::Serialize;

/// The outcome of a pipeline run.
#[derive(Debug)]
pub struct PipelineResult {
    /// The fully cleaned, expanded table.
    pub data: DataFrame,
    /// Human-readable log of what each stage did.
    pub steps: Vec<String>,
    /// Shape and timing summary.
    pub summary: RunSummary,
}

/// Before/after shape and timing of a pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,
    pub duration_ms: u128,
}
