//! Column pruning stage.

use crate::config::PrunePolicy;
use crate::error::{PipelineError, Result};
use crate::utils::has_column;
use polars::prelude::*;
use tracing::debug;

/// Removes a fixed set of analytically irrelevant columns.
pub struct ColumnPruner;

impl ColumnPruner {
    /// Drop the named columns, leaving all others and the row order intact.
    ///
    /// Under [`PrunePolicy::Strict`] a missing column is a
    /// [`PipelineError::Schema`]; under [`PrunePolicy::Lenient`] it is
    /// skipped silently.
    pub fn prune(
        df: DataFrame,
        columns: &[String],
        policy: PrunePolicy,
        processing_steps: &mut Vec<String>,
    ) -> Result<DataFrame> {
        let mut df = df;
        let mut dropped = Vec::new();

        for column in columns {
            if !has_column(&df, column) {
                match policy {
                    PrunePolicy::Strict => {
                        return Err(PipelineError::missing_column("prune", column));
                    }
                    PrunePolicy::Lenient => {
                        debug!("Skipping absent column '{}'", column);
                        continue;
                    }
                }
            }

            df = df.drop(column)?;
            dropped.push(column.as_str());
        }

        if !dropped.is_empty() {
            processing_steps.push(format!("Dropped columns: {}", dropped.join(", ")));
        }

        Ok(df)
    }
}
