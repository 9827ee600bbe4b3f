//! Null-dropping stage.

use crate::error::Result;
use polars::prelude::*;
use tracing::debug;

/// Removes every row that still contains a null in any column.
pub struct NullDropper;

impl NullDropper {
    /// Order-preserving filter keeping only fully populated rows.
    pub fn drop_null_rows(df: &DataFrame, processing_steps: &mut Vec<String>) -> Result<DataFrame> {
        let mut mask = BooleanChunked::full("keep".into(), true, df.height());
        for column in df.get_columns() {
            mask = &mask & &column.as_materialized_series().is_not_null();
        }

        let filtered = df.filter(&mask)?;
        let removed = df.height() - filtered.height();

        if removed > 0 {
            processing_steps.push(format!("Dropped {} rows containing nulls", removed));
        }
        debug!("Null dropper removed {} rows", removed);

        Ok(filtered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_null_rows() {
        let df = df![
            "title" => [Some("A"), Some("B"), None],
            "budget" => [Some(1.0), None, Some(3.0)],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let out = NullDropper::drop_null_rows(&df, &mut steps).unwrap();

        assert_eq!(out.height(), 1);
        for column in out.get_columns() {
            assert_eq!(column.null_count(), 0);
        }
        assert!(steps[0].contains("2 rows"));
    }

    #[test]
    fn test_drop_null_rows_preserves_order() {
        let df = df![
            "title" => [Some("A"), None, Some("C"), Some("D")],
            "budget" => [1.0, 2.0, 3.0, 4.0],
        ]
        .unwrap();
        let mut steps = Vec::new();

        let out = NullDropper::drop_null_rows(&df, &mut steps).unwrap();

        let titles: Vec<Option<String>> = crate::utils::series_to_strings(
            out.column("title").unwrap().as_materialized_series(),
        )
        .unwrap();
        assert_eq!(
            titles,
            vec![
                Some("A".to_string()),
                Some("C".to_string()),
                Some("D".to_string())
            ]
        );
    }

    #[test]
    fn test_no_nulls_is_a_no_op() {
        let df = df!["title" => ["A", "B"]].unwrap();
        let mut steps = Vec::new();

        let out = NullDropper::drop_null_rows(&df, &mut steps).unwrap();
        assert_eq!(out.height(), 2);
        assert!(steps.is_empty());
    }
}
