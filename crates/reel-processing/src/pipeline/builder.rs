//! Main cleaning pipeline.
//!
//! The pipeline runs the stages in a fixed order — prune, impute, expand,
//! drop nulls, derive, rescale — each stage fully owning its input table.
//! There is no branching and no partial output: a run either yields a
//! fully cleaned table or fails with a typed error.

use crate::config::{ConfigValidationError, PipelineConfig};
use crate::error::Result;
use crate::ingest::DatasetLoader;
use crate::pipeline::{PipelineResult, RunSummary};
use crate::stages::{ColumnPruner, NullDropper, ProfitComputer, RowExpander, SentinelImputer};
use polars::prelude::*;
use std::path::Path;
use std::time::Instant;
use tracing::{error, info};

/// The movie-metadata cleaning pipeline.
///
/// # Example
///
/// ```rust,ignore
/// use reel_processing::{Pipeline, PipelineConfig};
///
/// let result = Pipeline::builder()
///     .config(PipelineConfig::default())
///     .build()?
///     .run("tmdb-movies.csv")?;
///
/// println!("{} cleaned rows", result.data.height());
/// ```
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline builder.
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Create a pipeline with the default TMDB configuration.
    pub fn with_defaults() -> Self {
        Self {
            config: PipelineConfig::default(),
        }
    }

    /// The configuration this pipeline runs with.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load a CSV file and process it.
    pub fn run(&self, path: impl AsRef<Path>) -> Result<PipelineResult> {
        let path = path.as_ref();
        info!("Loading dataset from: {}", path.display());
        let df = DatasetLoader::load(path)?;
        info!("Dataset loaded: {:?}", df.shape());
        self.process(df)
    }

    /// Process an already-loaded DataFrame through all cleaning stages.
    pub fn process(&self, df: DataFrame) -> Result<PipelineResult> {
        match self.process_internal(df) {
            Ok(result) => {
                info!(
                    "Pipeline complete: {} rows x {} columns in {}ms",
                    result.summary.rows_after,
                    result.summary.columns_after,
                    result.summary.duration_ms
                );
                Ok(result)
            }
            Err(e) => {
                error!("Pipeline failed [{}]: {}", e.error_code(), e);
                Err(e)
            }
        }
    }

    fn process_internal(&self, df: DataFrame) -> Result<PipelineResult> {
        let start_time = Instant::now();
        let rows_before = df.height();
        let columns_before = df.width();
        let mut steps: Vec<String> = Vec::new();

        info!("Step 1: Pruning {} columns...", self.config.drop_columns.len());
        let df = ColumnPruner::prune(
            df,
            &self.config.drop_columns,
            self.config.prune_policy,
            &mut steps,
        )?;

        info!("Step 2: Imputing sentinel values...");
        let mut df = df;
        SentinelImputer::impute(
            &mut df,
            &self.config.impute_columns,
            self.config.sentinel,
            &mut steps,
        )?;

        info!("Step 3: Expanding '{}'...", self.config.multi_value_column);
        let df = RowExpander::expand(
            df,
            &self.config.multi_value_column,
            self.config.delimiter,
            &self.config.category_column,
            self.config.empty_split_policy,
            &mut steps,
        )?;

        info!("Step 4: Dropping rows with nulls...");
        let mut df = NullDropper::drop_null_rows(&df, &mut steps)?;

        info!("Step 5: Deriving '{}'...", self.config.profit_column);
        ProfitComputer::compute_raw(
            &mut df,
            &self.config.revenue_column,
            &self.config.budget_column,
            &self.config.profit_column,
            &mut steps,
        )?;
        ProfitComputer::rescale(
            &mut df,
            &self.config.profit_column,
            self.config.profit_scale,
            &mut steps,
        )?;

        let summary = RunSummary {
            rows_before,
            rows_after: df.height(),
            columns_before,
            columns_after: df.width(),
            duration_ms: start_time.elapsed().as_millis(),
        };

        Ok(PipelineResult {
            data: df,
            steps,
            summary,
        })
    }
}

/// Builder for [`Pipeline`].
#[derive(Debug, Default)]
pub struct PipelineBuilder {
    config: Option<PipelineConfig>,
}

impl PipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<Pipeline, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;
        Ok(Pipeline { config })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmptySplitPolicy;

    fn movie_frame() -> DataFrame {
        df![
            "original_title" => ["First", "Second", "Third"],
            "homepage" => [Some("a"), None, Some("c")],
            "budget" => [100.0, 0.0, 50.0],
            "revenue" => [300.0, 200.0, 75.0],
            "genres" => [Some("Action|Adventure"), Some("Action"), None],
            "vote_average" => [7.5, 6.0, 8.0],
            "release_year" => [1999i64, 2005, 2010],
        ]
        .unwrap()
    }

    fn test_config() -> PipelineConfig {
        PipelineConfig::builder()
            .drop_columns(["homepage"])
            .impute_columns(["budget", "revenue"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_pipeline_builder_default() {
        let pipeline = Pipeline::builder().build().unwrap();
        assert_eq!(pipeline.config.multi_value_column, "genres");
    }

    #[test]
    fn test_pipeline_builder_invalid_config_rejected() {
        let config = PipelineConfig {
            profit_scale: 0.0,
            ..PipelineConfig::default()
        };
        assert!(Pipeline::builder().config(config).build().is_err());
    }

    #[test]
    fn test_process_end_to_end() {
        let pipeline = Pipeline::builder().config(test_config()).build().unwrap();
        let result = pipeline.process(movie_frame()).unwrap();

        // Two genre rows for "First", one for "Second"; the null-genre row
        // for "Third" is dropped.
        assert_eq!(result.summary.rows_before, 3);
        assert_eq!(result.summary.rows_after, 3);

        let df = &result.data;
        for column in df.get_columns() {
            assert_eq!(column.null_count(), 0);
        }

        // Budget sentinel replaced with mean of {100, 50} = 75,
        // profit = (revenue - budget) / 1e6.
        let profit = df.column("profit").unwrap();
        assert_eq!(profit.get(0).unwrap().try_extract::<f64>().unwrap(), 0.0002);
        assert_eq!(profit.get(1).unwrap().try_extract::<f64>().unwrap(), 0.0002);
        assert_eq!(
            profit.get(2).unwrap().try_extract::<f64>().unwrap(),
            0.000125
        );

        assert!(!result.steps.is_empty());
    }

    #[test]
    fn test_process_skip_policy_drops_empty_genre_rows_early() {
        let config = PipelineConfig::builder()
            .drop_columns(["homepage"])
            .impute_columns(["budget", "revenue"])
            .empty_split_policy(EmptySplitPolicy::Skip)
            .build()
            .unwrap();

        let pipeline = Pipeline::builder().config(config).build().unwrap();
        let result = pipeline.process(movie_frame()).unwrap();
        assert_eq!(result.summary.rows_after, 3);
    }

    #[test]
    fn test_run_missing_file() {
        let pipeline = Pipeline::with_defaults();
        let err = pipeline.run("no/such/file.csv").unwrap_err();
        assert_eq!(err.error_code(), "INGEST_ERROR");
    }
}
