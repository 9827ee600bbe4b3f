//! Row expansion stage.
//!
//! A multi-valued field like `"Action|Adventure"` models a one-to-many
//! relationship between a movie and its genres. The expander materializes
//! that relationship as one physical row per (movie, genre) pair. This is
//! the pipeline's only cardinality-increasing step.

use crate::config::EmptySplitPolicy;
use crate::error::{PipelineError, Result};
use crate::utils::series_to_strings;
use polars::prelude::*;
use tracing::debug;

/// Explodes a delimiter-separated multi-valued column into one row per token.
pub struct RowExpander;

impl RowExpander {
    /// Expand `source` on `delimiter`, renaming the result to `output`.
    ///
    /// Output rows preserve the input row order, with all expansions of one
    /// input row emitted contiguously in token order. The exploded column is
    /// re-appended as the last column. Rows whose source value is null or
    /// empty follow `policy`. Expanding an already-atomic column is a no-op
    /// apart from the rename.
    pub fn expand(
        df: DataFrame,
        source: &str,
        delimiter: char,
        output: &str,
        policy: EmptySplitPolicy,
        processing_steps: &mut Vec<String>,
    ) -> Result<DataFrame> {
        let series = df
            .column(source)
            .map_err(|_| PipelineError::missing_column("expand", source))?
            .as_materialized_series();

        let values = series_to_strings(series)?;

        let mut indices: Vec<IdxSize> = Vec::with_capacity(values.len());
        let mut tokens: Vec<Option<String>> = Vec::with_capacity(values.len());

        for (row, value) in values.iter().enumerate() {
            match value.as_deref() {
                None | Some("") => match policy {
                    EmptySplitPolicy::NullRow => {
                        indices.push(row as IdxSize);
                        tokens.push(None);
                    }
                    EmptySplitPolicy::Skip => {}
                },
                Some(text) => {
                    for token in text.split(delimiter) {
                        indices.push(row as IdxSize);
                        tokens.push(Some(token.to_string()));
                    }
                }
            }
        }

        let rows_before = df.height();
        let idx = IdxCa::from_vec("idx".into(), indices);
        let mut expanded = df.take(&idx)?;

        // Matches the original wrangling: the source column is deleted and
        // the per-token category column is joined back as the last column.
        expanded.drop_in_place(source)?;
        expanded.with_column(Series::new(output.into(), tokens))?;

        processing_steps.push(format!(
            "Expanded '{}' into '{}': {} rows -> {} rows",
            source,
            output,
            rows_before,
            expanded.height()
        ));
        debug!(
            "Expanded '{}' on '{}': {} -> {} rows",
            source,
            delimiter,
            rows_before,
            expanded.height()
        );

        Ok(expanded)
    }
}
