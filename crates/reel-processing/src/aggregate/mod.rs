//! Grouped aggregate queries over a cleaned table.
//!
//! The aggregator answers questions of the shape "per genre / per year,
//! what is the mean or count of X", optionally filtered by a numeric
//! threshold and sorted. Results keep first-encountered group order unless
//! a sort directive says otherwise, and ties are broken by that same
//! first-encountered order (stable sort).

pub mod queries;

use crate::error::{PipelineError, Result};
use crate::utils::{is_numeric_dtype, series_to_f64, series_to_strings};
use polars::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// A grouping key: either a category string or an integer such as a year.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GroupKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::Int(v) => write!(f, "{}", v),
            GroupKey::Str(v) => write!(f, "{}", v),
        }
    }
}

/// The summary statistic computed per group.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregation {
    /// Arithmetic mean of a numeric column (nulls skipped).
    Mean { value_column: String },
    /// Number of rows in the group.
    Count,
    /// Number of distinct non-null values of another column in the group.
    CountDistinct { column: String },
}

/// Comparison operator for [`RowFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Ge,
    Gt,
    Le,
    Lt,
}

impl FilterOp {
    fn matches(self, value: f64, threshold: f64) -> bool {
        match self {
            FilterOp::Ge => value >= threshold,
            FilterOp::Gt => value > threshold,
            FilterOp::Le => value <= threshold,
            FilterOp::Lt => value < threshold,
        }
    }
}

/// A numeric threshold filter applied before grouping.
#[derive(Debug, Clone, PartialEq)]
pub struct RowFilter {
    pub column: String,
    pub op: FilterOp,
    pub threshold: f64,
}

impl RowFilter {
    /// Keep rows where `column >= threshold`.
    pub fn at_least(column: impl Into<String>, threshold: f64) -> Self {
        Self {
            column: column.into(),
            op: FilterOp::Ge,
            threshold,
        }
    }
}

/// What to order the aggregate rows by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Key,
    Value,
}

/// Ordering directive for aggregate output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortDirective {
    pub by: SortBy,
    pub descending: bool,
}

/// A complete aggregate query.
#[derive(Debug, Clone)]
pub struct AggregateQuery {
    pub group_by: String,
    pub aggregation: Aggregation,
    pub filter: Option<RowFilter>,
    pub sort: Option<SortDirective>,
}

impl AggregateQuery {
    /// Mean of `value_column` per `group_by` value.
    pub fn mean(group_by: impl Into<String>, value_column: impl Into<String>) -> Self {
        Self {
            group_by: group_by.into(),
            aggregation: Aggregation::Mean {
                value_column: value_column.into(),
            },
            filter: None,
            sort: None,
        }
    }

    /// Row count per `group_by` value.
    pub fn count(group_by: impl Into<String>) -> Self {
        Self {
            group_by: group_by.into(),
            aggregation: Aggregation::Count,
            filter: None,
            sort: None,
        }
    }

    /// Distinct values of `column` per `group_by` value.
    pub fn count_distinct(group_by: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            group_by: group_by.into(),
            aggregation: Aggregation::CountDistinct {
                column: column.into(),
            },
            filter: None,
            sort: None,
        }
    }

    /// Restrict the query to rows passing `filter`.
    pub fn filter(mut self, filter: RowFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Order the output.
    pub fn sort(mut self, by: SortBy, descending: bool) -> Self {
        self.sort = Some(SortDirective { by, descending });
        self
    }
}

/// One (group key, aggregate value) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    pub key: GroupKey,
    pub value: f64,
}

/// Tracks groups in first-encountered order.
#[derive(Default)]
struct GroupIndex {
    order: Vec<GroupKey>,
    slots: HashMap<GroupKey, usize>,
}

impl GroupIndex {
    fn slot_of(&mut self, key: &GroupKey) -> usize {
        if let Some(&slot) = self.slots.get(key) {
            return slot;
        }
        let slot = self.order.len();
        self.order.push(key.clone());
        self.slots.insert(key.clone(), slot);
        slot
    }
}

/// Computes grouped summary statistics.
pub struct Aggregator;

impl Aggregator {
    /// Run `query` against `df`, returning ordered aggregate rows.
    ///
    /// Rows with a null group key are excluded, as are null values from a
    /// mean. Fails with [`PipelineError::Aggregation`] if the grouping,
    /// value, or filter column is absent or has the wrong type.
    pub fn aggregate(df: &DataFrame, query: &AggregateQuery) -> Result<Vec<AggregateRow>> {
        let filtered;
        let df = match &query.filter {
            Some(filter) => {
                filtered = Self::apply_filter(df, filter)?;
                &filtered
            }
            None => df,
        };

        let keys = Self::group_keys(df, &query.group_by)?;

        let mut groups: GroupIndex = GroupIndex::default();

        let mut rows = match &query.aggregation {
            Aggregation::Mean { value_column } => {
                let values = Self::numeric_column(df, value_column)?;
                let mut acc: Vec<(f64, usize)> = Vec::new();
                for (key, value) in keys.iter().zip(values) {
                    let (Some(key), Some(value)) = (key, value) else {
                        continue;
                    };
                    let slot = groups.slot_of(key);
                    if slot == acc.len() {
                        acc.push((0.0, 0));
                    }
                    acc[slot].0 += value;
                    acc[slot].1 += 1;
                }
                groups
                    .order
                    .iter()
                    .zip(acc)
                    .map(|(key, (sum, count))| AggregateRow {
                        key: key.clone(),
                        value: sum / count as f64,
                    })
                    .collect::<Vec<_>>()
            }
            Aggregation::Count => {
                let mut acc: Vec<usize> = Vec::new();
                for key in keys.iter().flatten() {
                    let slot = groups.slot_of(key);
                    if slot == acc.len() {
                        acc.push(0);
                    }
                    acc[slot] += 1;
                }
                groups
                    .order
                    .iter()
                    .zip(acc)
                    .map(|(key, count)| AggregateRow {
                        key: key.clone(),
                        value: count as f64,
                    })
                    .collect()
            }
            Aggregation::CountDistinct { column } => {
                let values = Self::string_column(df, column)?;
                let mut acc: Vec<HashSet<String>> = Vec::new();
                for (key, value) in keys.iter().zip(values) {
                    let (Some(key), Some(value)) = (key, value) else {
                        continue;
                    };
                    let slot = groups.slot_of(key);
                    if slot == acc.len() {
                        acc.push(HashSet::new());
                    }
                    acc[slot].insert(value);
                }
                groups
                    .order
                    .iter()
                    .zip(acc)
                    .map(|(key, distinct)| AggregateRow {
                        key: key.clone(),
                        value: distinct.len() as f64,
                    })
                    .collect()
            }
        };

        if let Some(directive) = query.sort {
            // `sort_by` is stable, so ties keep first-encountered order.
            // Descending flips the comparator rather than reversing after,
            // which would also reverse tied entries.
            match (directive.by, directive.descending) {
                (SortBy::Key, false) => rows.sort_by(|a, b| a.key.cmp(&b.key)),
                (SortBy::Key, true) => rows.sort_by(|a, b| b.key.cmp(&a.key)),
                (SortBy::Value, false) => rows.sort_by(|a, b| {
                    a.value.partial_cmp(&b.value).unwrap_or(Ordering::Equal)
                }),
                (SortBy::Value, true) => rows.sort_by(|a, b| {
                    b.value.partial_cmp(&a.value).unwrap_or(Ordering::Equal)
                }),
            }
        }

        debug!(
            "Aggregated '{}' into {} groups",
            query.group_by,
            rows.len()
        );
        Ok(rows)
    }

    fn apply_filter(df: &DataFrame, filter: &RowFilter) -> Result<DataFrame> {
        let values = Self::numeric_column(df, &filter.column)?;
        let keep: Vec<bool> = values
            .into_iter()
            .map(|v| v.is_some_and(|v| filter.op.matches(v, filter.threshold)))
            .collect();
        let mask = BooleanChunked::from_slice("keep".into(), &keep);
        Ok(df.filter(&mask)?)
    }

    fn group_keys(df: &DataFrame, column: &str) -> Result<Vec<Option<GroupKey>>> {
        let series = df
            .column(column)
            .map_err(|_| PipelineError::Aggregation {
                column: column.to_string(),
                reason: "grouping column not found".to_string(),
            })?
            .as_materialized_series();

        if is_numeric_dtype(series.dtype()) {
            let casted = series.cast(&DataType::Int64)?;
            let ca = casted.i64()?;
            Ok(ca.into_iter().map(|v| v.map(GroupKey::Int)).collect())
        } else {
            let values = series_to_strings(series)?;
            Ok(values
                .into_iter()
                .map(|v| v.map(GroupKey::Str))
                .collect())
        }
    }

    fn numeric_column(df: &DataFrame, column: &str) -> Result<Vec<Option<f64>>> {
        let series = df
            .column(column)
            .map_err(|_| PipelineError::Aggregation {
                column: column.to_string(),
                reason: "value column not found".to_string(),
            })?
            .as_materialized_series();

        if !is_numeric_dtype(series.dtype()) {
            return Err(PipelineError::Aggregation {
                column: column.to_string(),
                reason: format!("column is not numeric (dtype: {})", series.dtype()),
            });
        }

        Ok(series_to_f64(series)?)
    }

    fn string_column(df: &DataFrame, column: &str) -> Result<Vec<Option<String>>> {
        let series = df
            .column(column)
            .map_err(|_| PipelineError::Aggregation {
                column: column.to_string(),
                reason: "distinct-count column not found".to_string(),
            })?
            .as_materialized_series();

        Ok(series_to_strings(series)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> DataFrame {
        df![
            "genre" => ["Action", "Drama", "Action", "Comedy", "Drama"],
            "title" => ["A", "B", "C", "D", "B2"],
            "profit" => [10.0, 20.0, 30.0, 5.0, 40.0],
            "rating" => [7.5, 6.0, 8.0, 7.0, 9.0],
        ]
        .unwrap()
    }

    #[test]
    fn test_mean_by_group_first_encounter_order() {
        let rows =
            Aggregator::aggregate(&sample(), &AggregateQuery::mean("genre", "profit")).unwrap();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].key, GroupKey::Str("Action".to_string()));
        assert_eq!(rows[0].value, 20.0);
        assert_eq!(rows[1].key, GroupKey::Str("Drama".to_string()));
        assert_eq!(rows[1].value, 30.0);
        assert_eq!(rows[2].key, GroupKey::Str("Comedy".to_string()));
        assert_eq!(rows[2].value, 5.0);
    }

    #[test]
    fn test_count_by_group() {
        let rows = Aggregator::aggregate(&sample(), &AggregateQuery::count("genre")).unwrap();
        assert_eq!(rows[0].value, 2.0); // Action
        assert_eq!(rows[1].value, 2.0); // Drama
        assert_eq!(rows[2].value, 1.0); // Comedy
    }

    #[test]
    fn test_count_distinct_with_filter() {
        let query = AggregateQuery::count_distinct("genre", "title")
            .filter(RowFilter::at_least("rating", 7.0));
        let rows = Aggregator::aggregate(&sample(), &query).unwrap();

        // rating >= 7 keeps Action(A), Action(C), Comedy(D), Drama(B2)
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].key, GroupKey::Str("Action".to_string()));
        assert_eq!(rows[0].value, 2.0);
    }

    #[test]
    fn test_sort_by_value_descending() {
        let query = AggregateQuery::mean("genre", "profit").sort(SortBy::Value, true);
        let rows = Aggregator::aggregate(&sample(), &query).unwrap();

        assert_eq!(rows[0].key, GroupKey::Str("Drama".to_string()));
        assert_eq!(rows[1].key, GroupKey::Str("Action".to_string()));
        assert_eq!(rows[2].key, GroupKey::Str("Comedy".to_string()));
    }

    #[test]
    fn test_sort_by_value_ties_keep_first_encountered_order() {
        // Action and Drama tie at 5.0; Comedy stands alone at 9.0.
        let df = df![
            "genre" => ["Action", "Drama", "Comedy", "Action", "Drama"],
            "profit" => [5.0, 5.0, 9.0, 5.0, 5.0],
        ]
        .unwrap();

        let query = AggregateQuery::mean("genre", "profit").sort(SortBy::Value, true);
        let rows = Aggregator::aggregate(&df, &query).unwrap();
        assert_eq!(rows[0].key, GroupKey::Str("Comedy".to_string()));
        assert_eq!(rows[1].key, GroupKey::Str("Action".to_string()));
        assert_eq!(rows[2].key, GroupKey::Str("Drama".to_string()));

        let query = AggregateQuery::mean("genre", "profit").sort(SortBy::Value, false);
        let rows = Aggregator::aggregate(&df, &query).unwrap();
        assert_eq!(rows[0].key, GroupKey::Str("Action".to_string()));
        assert_eq!(rows[1].key, GroupKey::Str("Drama".to_string()));
        assert_eq!(rows[2].key, GroupKey::Str("Comedy".to_string()));
    }

    #[test]
    fn test_count_ties_keep_first_encountered_order_descending() {
        // Every genre counts 1; descending output must match encounter order.
        let df = df![
            "genre" => ["Horror", "Action", "Drama"],
            "profit" => [1.0, 2.0, 3.0],
        ]
        .unwrap();

        let query = AggregateQuery::count("genre").sort(SortBy::Value, true);
        let rows = Aggregator::aggregate(&df, &query).unwrap();
        let keys: Vec<&GroupKey> = rows.iter().map(|r| &r.key).collect();
        assert_eq!(
            keys,
            vec![
                &GroupKey::Str("Horror".to_string()),
                &GroupKey::Str("Action".to_string()),
                &GroupKey::Str("Drama".to_string())
            ]
        );
    }

    #[test]
    fn test_sort_by_integer_key() {
        let df = df![
            "release_year" => [1999i64, 1965, 1999, 2010],
            "profit" => [1.0, 2.0, 3.0, 4.0],
        ]
        .unwrap();

        let query = AggregateQuery::mean("release_year", "profit").sort(SortBy::Key, false);
        let rows = Aggregator::aggregate(&df, &query).unwrap();

        assert_eq!(rows[0].key, GroupKey::Int(1965));
        assert_eq!(rows[1].key, GroupKey::Int(1999));
        assert_eq!(rows[1].value, 2.0);
        assert_eq!(rows[2].key, GroupKey::Int(2010));
    }

    #[test]
    fn test_null_group_keys_excluded() {
        let df = df![
            "genre" => [Some("Action"), None, Some("Action")],
            "profit" => [10.0, 99.0, 30.0],
        ]
        .unwrap();

        let rows =
            Aggregator::aggregate(&df, &AggregateQuery::mean("genre", "profit")).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value, 20.0);
    }

    #[test]
    fn test_deterministic_output() {
        let query = AggregateQuery::mean("genre", "profit").sort(SortBy::Value, true);
        let first = Aggregator::aggregate(&sample(), &query).unwrap();
        let second = Aggregator::aggregate(&sample(), &query).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_group_column() {
        let err = Aggregator::aggregate(&sample(), &AggregateQuery::mean("studio", "profit"))
            .unwrap_err();
        assert_eq!(err.error_code(), "AGGREGATION_ERROR");
    }

    #[test]
    fn test_missing_value_column() {
        let err = Aggregator::aggregate(&sample(), &AggregateQuery::mean("genre", "losses"))
            .unwrap_err();
        assert_eq!(err.error_code(), "AGGREGATION_ERROR");
    }

    #[test]
    fn test_non_numeric_value_column() {
        let err = Aggregator::aggregate(&sample(), &AggregateQuery::mean("genre", "title"))
            .unwrap_err();
        assert_eq!(err.error_code(), "AGGREGATION_ERROR");
    }
}
