//! Derived-column stage.
//!
//! Profit is computed in two explicit steps: the raw difference
//! `revenue - budget` is appended first, and the rescale (division by one
//! million) is applied afterwards in place. The intermediate unscaled
//! column is a supported state that other pipelines may consume.

use crate::error::{PipelineError, Result};
use crate::utils::{is_numeric_dtype, series_to_f64};
use polars::prelude::*;
use tracing::debug;

/// Appends a profit column derived from revenue and budget.
pub struct ProfitComputer;

impl ProfitComputer {
    /// Step 1: append `output = revenue - budget`, unscaled.
    ///
    /// A row where either operand is null yields a null profit. Fails with
    /// [`PipelineError::Computation`] if a source column is absent or not
    /// numeric.
    pub fn compute_raw(
        df: &mut DataFrame,
        revenue: &str,
        budget: &str,
        output: &str,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        let revenue_values = Self::numeric_column(df, revenue)?;
        let budget_values = Self::numeric_column(df, budget)?;

        let profit: Vec<Option<f64>> = revenue_values
            .into_iter()
            .zip(budget_values)
            .map(|(r, b)| match (r, b) {
                (Some(r), Some(b)) => Some(r - b),
                _ => None,
            })
            .collect();

        df.with_column(Series::new(output.into(), profit))?;

        processing_steps.push(format!("Derived '{}' = {} - {}", output, revenue, budget));
        debug!("Computed raw '{}' from '{}' - '{}'", output, revenue, budget);
        Ok(())
    }

    /// Step 2: divide `column` by `factor` in place.
    pub fn rescale(
        df: &mut DataFrame,
        column: &str,
        factor: f64,
        processing_steps: &mut Vec<String>,
    ) -> Result<()> {
        let values = Self::numeric_column(df, column)?;
        let scaled: Vec<Option<f64>> = values.into_iter().map(|v| v.map(|v| v / factor)).collect();

        df.replace(column, Series::new(column.into(), scaled))?;

        processing_steps.push(format!("Rescaled '{}' by 1/{}", column, factor));
        debug!("Rescaled '{}' by 1/{}", column, factor);
        Ok(())
    }

    fn numeric_column(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
        let series = df
            .column(column)
            .map_err(|_| PipelineError::Computation {
                column: column.to_string(),
                reason: "column not found".to_string(),
            })?
            .as_materialized_series();

        if !is_numeric_dtype(series.dtype()) {
            return Err(PipelineError::Computation {
                column: column.to_string(),
                reason: format!("column is not numeric (dtype: {})", series.dtype()),
            });
        }

        Ok(series_to_f64(series)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_raw_then_rescale() {
        let mut df = df![
            "revenue" => [300.0, 200.0],
            "budget" => [100.0, 75.0],
        ]
        .unwrap();
        let mut steps = Vec::new();

        ProfitComputer::compute_raw(&mut df, "revenue", "budget", "profit", &mut steps).unwrap();

        // Raw difference is available before rescaling.
        let profit = df.column("profit").unwrap();
        assert_eq!(profit.get(0).unwrap().try_extract::<f64>().unwrap(), 200.0);
        assert_eq!(profit.get(1).unwrap().try_extract::<f64>().unwrap(), 125.0);

        ProfitComputer::rescale(&mut df, "profit", 1_000_000.0, &mut steps).unwrap();

        let profit = df.column("profit").unwrap();
        assert_eq!(
            profit.get(0).unwrap().try_extract::<f64>().unwrap(),
            0.0002
        );
        assert_eq!(
            profit.get(1).unwrap().try_extract::<f64>().unwrap(),
            0.000125
        );
        assert_eq!(steps.len(), 2);
    }

    #[test]
    fn test_compute_raw_null_operand_gives_null() {
        let mut df = df![
            "revenue" => [Some(300.0), None],
            "budget" => [Some(100.0), Some(50.0)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        ProfitComputer::compute_raw(&mut df, "revenue", "budget", "profit", &mut steps).unwrap();
        assert_eq!(df.column("profit").unwrap().null_count(), 1);
    }

    #[test]
    fn test_compute_raw_missing_column() {
        let mut df = df!["revenue" => [1.0]].unwrap();
        let mut steps = Vec::new();

        let err = ProfitComputer::compute_raw(&mut df, "revenue", "budget", "profit", &mut steps)
            .unwrap_err();
        assert_eq!(err.error_code(), "COMPUTATION_ERROR");
    }

    #[test]
    fn test_compute_raw_non_numeric_column() {
        let mut df = df![
            "revenue" => [1.0],
            "budget" => ["lots"],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let err = ProfitComputer::compute_raw(&mut df, "revenue", "budget", "profit", &mut steps)
            .unwrap_err();
        assert_eq!(err.error_code(), "COMPUTATION_ERROR");
        assert!(err.to_string().contains("budget"));
    }
}
