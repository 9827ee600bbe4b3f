//! Preset queries for the movie-genre investigation.
//!
//! These are the three analytical questions the pipeline was built to
//! answer, expressed against the default TMDB column names.

use super::{AggregateQuery, RowFilter, SortBy};

/// Question 1: which genre is the most (and least) profitable?
///
/// Mean profit per genre, most profitable first.
pub fn mean_profit_by_genre() -> AggregateQuery {
    AggregateQuery::mean("genre", "profit").sort(SortBy::Value, true)
}

/// Question 2: how many movies in each genre were rated at least
/// `min_rating`?
///
/// Distinct titles per genre among sufficiently rated rows, largest first.
/// The notebook uses 7.0 as the threshold.
pub fn highly_rated_titles_by_genre(min_rating: f64) -> AggregateQuery {
    AggregateQuery::count_distinct("genre", "original_title")
        .filter(RowFilter::at_least("vote_average", min_rating))
        .sort(SortBy::Value, true)
}

/// Question 3: how has profit developed over the years?
///
/// Mean profit per release year in chronological order.
pub fn mean_profit_by_year() -> AggregateQuery {
    AggregateQuery::mean("release_year", "profit").sort(SortBy::Key, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Aggregation, SortDirective};

    #[test]
    fn test_presets_shape() {
        let q1 = mean_profit_by_genre();
        assert_eq!(q1.group_by, "genre");
        assert!(matches!(q1.aggregation, Aggregation::Mean { .. }));
        assert_eq!(
            q1.sort,
            Some(SortDirective {
                by: SortBy::Value,
                descending: true
            })
        );

        let q2 = highly_rated_titles_by_genre(7.0);
        assert!(matches!(q2.aggregation, Aggregation::CountDistinct { .. }));
        assert_eq!(q2.filter.as_ref().unwrap().threshold, 7.0);

        let q3 = mean_profit_by_year();
        assert_eq!(q3.group_by, "release_year");
        assert_eq!(
            q3.sort,
            Some(SortDirective {
                by: SortBy::Key,
                descending: false
            })
        );
    }
}
