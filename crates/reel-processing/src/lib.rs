//! Movie Metadata Cleaning Pipeline
//!
//! A single-pass cleaning and aggregation library for TMDB-style movie
//! exports, built with Rust and Polars.
//!
//! # Overview
//!
//! The pipeline turns a raw CSV export into an analysis-ready table:
//!
//! - **Loading**: CSV ingestion with type inference and quote-handling
//!   fallbacks
//! - **Pruning**: removal of analytically irrelevant columns
//! - **Imputation**: sentinel zeros in budget/revenue/runtime replaced by
//!   the column mean
//! - **Row expansion**: the pipe-delimited `genres` field exploded into one
//!   row per (movie, genre) pair
//! - **Null dropping**: rows still holding nulls are removed
//! - **Derivation**: `profit = revenue - budget`, rescaled to millions in a
//!   separate step
//!
//! Aggregate queries (mean, count, distinct count, with filtering and
//! sorting) answer questions over the cleaned table; the charting and
//! narrative around them are left to the caller.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use reel_processing::{Aggregator, Pipeline, PipelineConfig, queries};
//!
//! let result = Pipeline::builder()
//!     .config(PipelineConfig::default())
//!     .build()?
//!     .run("tmdb-movies.csv")?;
//!
//! for row in Aggregator::aggregate(&result.data, &queries::mean_profit_by_genre())? {
//!     println!("{}: {:.2}M", row.key, row.value);
//! }
//! ```
//!
//! # Configuration
//!
//! Use [`PipelineConfig`] to customize the stages:
//!
//! ```rust,ignore
//! use reel_processing::{EmptySplitPolicy, PipelineConfig, PrunePolicy};
//!
//! let config = PipelineConfig::builder()
//!     .drop_columns(["homepage", "tagline"])
//!     .impute_columns(["budget", "revenue"])
//!     .prune_policy(PrunePolicy::Lenient)
//!     .empty_split_policy(EmptySplitPolicy::Skip)
//!     .build()?;
//! ```

pub mod aggregate;
pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod stages;
pub mod utils;

// Re-exports for convenient access
pub use aggregate::queries;
pub use aggregate::{
    AggregateQuery, AggregateRow, Aggregation, Aggregator, FilterOp, GroupKey, RowFilter, SortBy,
    SortDirective,
};
pub use config::{
    ConfigValidationError, EmptySplitPolicy, PipelineConfig, PipelineConfigBuilder, PrunePolicy,
};
pub use error::{PipelineError, ResultExt};
pub use ingest::DatasetLoader;
pub use pipeline::{Pipeline, PipelineBuilder, PipelineResult, RunSummary};
pub use stages::{ColumnPruner, NullDropper, ProfitComputer, RowExpander, SentinelImputer};
