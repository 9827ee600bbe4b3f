//! Sentinel-value imputation stage.
//!
//! Movie exports encode "unknown" budget/revenue/runtime as a literal zero
//! rather than a null. The imputer replaces those sentinels with the mean
//! of the genuine values. The mean is computed over the whole column before
//! any substitution happens, so it cannot drift mid-pass.

use crate::error::{PipelineError, Result};
use crate::utils::{is_numeric_dtype, series_to_f64};
use polars::prelude::*;
use tracing::debug;

/// Replaces sentinel "missing" values with the column mean.
pub struct SentinelImputer;

impl SentinelImputer {
    /// Impute every target column in turn.
    pub fn impute(
        df: &mut DataFrame,
        columns: &[String],
        sentinel: f64,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        for column in columns {
            Self::impute_column(df, column, sentinel, processing_steps)?;
        }
        Ok(())
    }

    /// Impute a single column, returning the mean that was substituted.
    ///
    /// True nulls are left untouched; only values equal to the sentinel are
    /// replaced. Fails with [`PipelineError::Imputation`] when the mean is
    /// undefined (no non-sentinel, non-null values).
    pub fn impute_column(
        df: &mut DataFrame,
        column: &str,
        sentinel: f64,
        processing_steps: &mut Vec<String>,
    ) -> Result<f64> {
        let series = df
            .column(column)
            .map_err(|_| PipelineError::missing_column("impute", column))?
            .as_materialized_series();

        if !is_numeric_dtype(series.dtype()) {
            return Err(PipelineError::Imputation {
                column: column.to_string(),
                reason: format!("column is not numeric (dtype: {})", series.dtype()),
            });
        }

        let values = series_to_f64(series)?;

        // Pass 1: the reference mean over non-sentinel, non-null values.
        let mut sum = 0.0;
        let mut count = 0usize;
        for value in values.iter().flatten() {
            if *value != sentinel {
                sum += value;
                count += 1;
            }
        }

        if count == 0 {
            return Err(PipelineError::Imputation {
                column: column.to_string(),
                reason: format!("no values other than the sentinel {}", sentinel),
            });
        }

        let mean = sum / count as f64;

        // Pass 2: substitute sentinels only.
        let mut replaced = 0usize;
        let filled: Vec<Option<f64>> = values
            .into_iter()
            .map(|value| match value {
                Some(v) if v == sentinel => {
                    replaced += 1;
                    Some(mean)
                }
                other => other,
            })
            .collect();

        df.replace(column, Series::new(column.into(), filled))?;

        processing_steps.push(format!(
            "Imputed '{}': {} sentinel values replaced with mean {:.2}",
            column, replaced, mean
        ));
        debug!("Imputed '{}' with mean {:.4}", column, mean);

        Ok(mean)
    }
}
