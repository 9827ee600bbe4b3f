//! Configuration types for the cleaning pipeline.
//!
//! Every stage reads its parameters from an immutable [`PipelineConfig`]
//! built through [`PipelineConfigBuilder`]. The defaults encode the TMDB
//! movie-metadata setup: drop the columns that carry no analytical value,
//! impute zero-sentinel budget/revenue/runtime, explode `genres` on `|`,
//! and derive `profit` in millions.

use serde::{Deserialize, Serialize};

/// Policy for pruning columns that are not present in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PrunePolicy {
    /// Error on the first requested column that does not exist
    #[default]
    Strict,
    /// Silently skip requested columns that do not exist
    Lenient,
}

/// Policy for rows whose multi-valued field is null or empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EmptySplitPolicy {
    /// Emit one row with a null category (removed by the null dropper)
    #[default]
    NullRow,
    /// Emit no row at all
    Skip,
}

/// Configuration for the cleaning pipeline.
///
/// Use [`PipelineConfig::builder()`] for a fluent API, or
/// [`PipelineConfig::default()`] for the TMDB movie setup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Columns removed by the pruner before any other stage runs.
    pub drop_columns: Vec<String>,

    /// How the pruner treats a requested column that is absent.
    /// Default: Strict
    pub prune_policy: PrunePolicy,

    /// Numeric columns whose sentinel values are replaced by the column mean.
    pub impute_columns: Vec<String>,

    /// The value that stands in for "missing" in the impute columns.
    /// Default: 0.0
    pub sentinel: f64,

    /// The column holding delimiter-separated multi-valued strings.
    /// Default: "genres"
    pub multi_value_column: String,

    /// Name given to the exploded category column.
    /// Default: "genre"
    pub category_column: String,

    /// Delimiter separating tokens in the multi-valued column.
    /// Default: '|'
    pub delimiter: char,

    /// How the expander treats null/empty multi-valued fields.
    /// Default: NullRow
    pub empty_split_policy: EmptySplitPolicy,

    /// Minuend column for the derived profit.
    /// Default: "revenue"
    pub revenue_column: String,

    /// Subtrahend column for the derived profit.
    /// Default: "budget"
    pub budget_column: String,

    /// Name of the derived column.
    /// Default: "profit"
    pub profit_column: String,

    /// Divisor applied to the raw difference in a second, separate step.
    /// Default: 1_000_000.0 (profit expressed in millions)
    pub profit_scale: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            drop_columns: [
                "imdb_id",
                "cast",
                "homepage",
                "director",
                "tagline",
                "keywords",
                "overview",
                "production_companies",
                "release_date",
                "budget_adj",
                "revenue_adj",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            prune_policy: PrunePolicy::default(),
            impute_columns: vec![
                "budget".to_string(),
                "revenue".to_string(),
                "runtime".to_string(),
            ],
            sentinel: 0.0,
            multi_value_column: "genres".to_string(),
            category_column: "genre".to_string(),
            delimiter: '|',
            empty_split_policy: EmptySplitPolicy::default(),
            revenue_column: "revenue".to_string(),
            budget_column: "budget".to_string(),
            profit_column: "profit".to_string(),
            profit_scale: 1_000_000.0,
        }
    }
}

impl PipelineConfig {
    /// Create a new configuration builder.
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.multi_value_column.is_empty() {
            return Err(ConfigValidationError::EmptyColumnName(
                "multi_value_column".to_string(),
            ));
        }

        if self.category_column.is_empty() {
            return Err(ConfigValidationError::EmptyColumnName(
                "category_column".to_string(),
            ));
        }

        if self.profit_scale == 0.0 || !self.profit_scale.is_finite() {
            return Err(ConfigValidationError::InvalidScale(self.profit_scale));
        }

        if !self.sentinel.is_finite() {
            return Err(ConfigValidationError::InvalidSentinel(self.sentinel));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Column name for '{0}' must not be empty")]
    EmptyColumnName(String),

    #[error("Invalid profit scale: {0} (must be finite and non-zero)")]
    InvalidScale(f64),

    #[error("Invalid sentinel: {0} (must be finite)")]
    InvalidSentinel(f64),
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    drop_columns: Option<Vec<String>>,
    prune_policy: Option<PrunePolicy>,
    impute_columns: Option<Vec<String>>,
    sentinel: Option<f64>,
    multi_value_column: Option<String>,
    category_column: Option<String>,
    delimiter: Option<char>,
    empty_split_policy: Option<EmptySplitPolicy>,
    revenue_column: Option<String>,
    budget_column: Option<String>,
    profit_column: Option<String>,
    profit_scale: Option<f64>,
}

impl PipelineConfigBuilder {
    /// Set the columns removed by the pruner.
    pub fn drop_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the pruner policy for absent columns.
    pub fn prune_policy(mut self, policy: PrunePolicy) -> Self {
        self.prune_policy = Some(policy);
        self
    }

    /// Set the numeric columns targeted by sentinel imputation.
    pub fn impute_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.impute_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the sentinel value that stands in for "missing".
    pub fn sentinel(mut self, sentinel: f64) -> Self {
        self.sentinel = Some(sentinel);
        self
    }

    /// Set the multi-valued column to explode.
    pub fn multi_value_column(mut self, column: impl Into<String>) -> Self {
        self.multi_value_column = Some(column.into());
        self
    }

    /// Set the name of the exploded category column.
    pub fn category_column(mut self, column: impl Into<String>) -> Self {
        self.category_column = Some(column.into());
        self
    }

    /// Set the token delimiter of the multi-valued column.
    pub fn delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Set the policy for null/empty multi-valued fields.
    pub fn empty_split_policy(mut self, policy: EmptySplitPolicy) -> Self {
        self.empty_split_policy = Some(policy);
        self
    }

    /// Set the minuend column of the derived profit.
    pub fn revenue_column(mut self, column: impl Into<String>) -> Self {
        self.revenue_column = Some(column.into());
        self
    }

    /// Set the subtrahend column of the derived profit.
    pub fn budget_column(mut self, column: impl Into<String>) -> Self {
        self.budget_column = Some(column.into());
        self
    }

    /// Set the name of the derived profit column.
    pub fn profit_column(mut self, column: impl Into<String>) -> Self {
        self.profit_column = Some(column.into());
        self
    }

    /// Set the divisor applied to the raw profit.
    pub fn profit_scale(mut self, scale: f64) -> Self {
        self.profit_scale = Some(scale);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `PipelineConfig` or an error if validation fails.
    pub fn build(self) -> Result<PipelineConfig, ConfigValidationError> {
        let defaults = PipelineConfig::default();

        let config = PipelineConfig {
            drop_columns: self.drop_columns.unwrap_or(defaults.drop_columns),
            prune_policy: self.prune_policy.unwrap_or_default(),
            impute_columns: self.impute_columns.unwrap_or(defaults.impute_columns),
            sentinel: self.sentinel.unwrap_or(defaults.sentinel),
            multi_value_column: self
                .multi_value_column
                .unwrap_or(defaults.multi_value_column),
            category_column: self.category_column.unwrap_or(defaults.category_column),
            delimiter: self.delimiter.unwrap_or(defaults.delimiter),
            empty_split_policy: self.empty_split_policy.unwrap_or_default(),
            revenue_column: self.revenue_column.unwrap_or(defaults.revenue_column),
            budget_column: self.budget_column.unwrap_or(defaults.budget_column),
            profit_column: self.profit_column.unwrap_or(defaults.profit_column),
            profit_scale: self.profit_scale.unwrap_or(defaults.profit_scale),
        };

        config.validate()?;
        Ok(config)
    }
}
