//! CLI entry point for the movie metadata cleaning pipeline.

use anyhow::{Result, anyhow};
use clap::{Parser, ValueEnum};
use reel_processing::{
    AggregateQuery, AggregateRow, Aggregator, EmptySplitPolicy, Pipeline, PipelineConfig,
    PipelineResult, PrunePolicy, RowFilter, SortBy, queries,
};
use serde::Serialize;
use tracing::info;

/// CLI-compatible aggregation kind enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliAggregation {
    /// Mean of the value column per group
    Mean,
    /// Row count per group
    Count,
    /// Distinct values of the value column per group
    CountDistinct,
}

/// CLI-compatible sort key enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSortBy {
    /// Sort by group key
    Key,
    /// Sort by aggregate value
    Value,
}

impl From<CliSortBy> for SortBy {
    fn from(cli: CliSortBy) -> Self {
        match cli {
            CliSortBy::Key => SortBy::Key,
            CliSortBy::Value => SortBy::Value,
        }
    }
}

/// CLI-compatible prune policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliPrunePolicy {
    /// Error when a pruned column is absent
    Strict,
    /// Skip absent columns silently
    Lenient,
}

impl From<CliPrunePolicy> for PrunePolicy {
    fn from(cli: CliPrunePolicy) -> Self {
        match cli {
            CliPrunePolicy::Strict => PrunePolicy::Strict,
            CliPrunePolicy::Lenient => PrunePolicy::Lenient,
        }
    }
}

/// CLI-compatible empty-split policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEmptySplitPolicy {
    /// Keep one null-category row (removed by the null dropper)
    NullRow,
    /// Emit no row for empty multi-valued fields
    Skip,
}

impl From<CliEmptySplitPolicy> for EmptySplitPolicy {
    fn from(cli: CliEmptySplitPolicy) -> Self {
        match cli {
            CliEmptySplitPolicy::NullRow => EmptySplitPolicy::NullRow,
            CliEmptySplitPolicy::Skip => EmptySplitPolicy::Skip,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Movie metadata cleaning and aggregation pipeline",
    long_about = "Cleans a TMDB-style movie CSV and prints grouped aggregates.\n\n\
                  EXAMPLES:\n  \
                  # The three standard genre questions\n  \
                  reel-processing -i tmdb-movies.csv\n\n  \
                  # A custom aggregation\n  \
                  reel-processing -i tmdb-movies.csv --group-by genre --value runtime --agg mean\n\n  \
                  # Machine-readable output\n  \
                  reel-processing -i tmdb-movies.csv --json"
)]
struct Args {
    /// Path to the CSV file to process
    #[arg(short, long)]
    input: String,

    /// Grouping column for a custom aggregation
    ///
    /// When omitted, the three preset genre reports are printed instead
    #[arg(long)]
    group_by: Option<String>,

    /// Value column for a custom aggregation
    #[arg(long, default_value = "profit")]
    value: String,

    /// Aggregation kind for a custom aggregation
    #[arg(long, value_enum, default_value = "mean")]
    agg: CliAggregation,

    /// Keep only rows where this column meets --min
    #[arg(long)]
    filter_column: Option<String>,

    /// Threshold for --filter-column (kept rows satisfy column >= min)
    #[arg(long, default_value = "0.0")]
    min: f64,

    /// Sort the aggregate output
    #[arg(long, value_enum)]
    sort: Option<CliSortBy>,

    /// Sort descending instead of ascending
    #[arg(long)]
    descending: bool,

    /// Rating threshold for the preset "highly rated" report
    #[arg(long, default_value = "7.0")]
    min_rating: f64,

    /// Pruner behavior for absent columns
    #[arg(long, value_enum, default_value = "strict")]
    prune_policy: CliPrunePolicy,

    /// Expander behavior for null/empty multi-valued fields
    #[arg(long, value_enum, default_value = "null-row")]
    empty_split: CliEmptySplitPolicy,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and results)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of human-readable tables
    ///
    /// Disables all progress logs; only outputs the final JSON document.
    #[arg(long)]
    json: bool,
}

/// One named report in the output document.
#[derive(Debug, Serialize)]
struct Report {
    title: String,
    rows: Vec<AggregateRow>,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = PipelineConfig::builder()
        .prune_policy(args.prune_policy.into())
        .empty_split_policy(args.empty_split.into())
        .build()?;

    let pipeline = Pipeline::builder().config(config).build()?;
    let result = pipeline.run(&args.input)?;

    for step in &result.steps {
        info!("{}", step);
    }

    let reports = build_reports(&args, &result)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
        return Ok(());
    }

    print_reports(&reports, &result);
    Ok(())
}

/// Run either the custom aggregation or the three preset reports.
fn build_reports(args: &Args, result: &PipelineResult) -> Result<Vec<Report>> {
    if let Some(ref group_by) = args.group_by {
        let mut query = match args.agg {
            CliAggregation::Mean => AggregateQuery::mean(group_by, &args.value),
            CliAggregation::Count => AggregateQuery::count(group_by),
            CliAggregation::CountDistinct => AggregateQuery::count_distinct(group_by, &args.value),
        };

        if let Some(ref column) = args.filter_column {
            query = query.filter(RowFilter::at_least(column, args.min));
        }

        if let Some(sort) = args.sort {
            query = query.sort(sort.into(), args.descending);
        }

        let rows = Aggregator::aggregate(&result.data, &query)
            .map_err(|e| anyhow!("Aggregation failed: {}", e))?;

        return Ok(vec![Report {
            title: format!("{:?} of '{}' by '{}'", args.agg, args.value, group_by),
            rows,
        }]);
    }

    Ok(vec![
        Report {
            title: "Mean profit by genre (US$ million)".to_string(),
            rows: Aggregator::aggregate(&result.data, &queries::mean_profit_by_genre())?,
        },
        Report {
            title: format!("Movies rated {} or higher by genre", args.min_rating),
            rows: Aggregator::aggregate(
                &result.data,
                &queries::highly_rated_titles_by_genre(args.min_rating),
            )?,
        },
        Report {
            title: "Mean profit by release year (US$ million)".to_string(),
            rows: Aggregator::aggregate(&result.data, &queries::mean_profit_by_year())?,
        },
    ])
}

/// Print human-readable report tables.
///
/// Note: this uses `println!` intentionally for user-facing CLI output;
/// it should be visible regardless of log level settings.
fn print_reports(reports: &[Report], result: &PipelineResult) {
    let summary = &result.summary;

    println!();
    println!("{}", "=".repeat(60));
    println!("CLEANING COMPLETE");
    println!("{}", "=".repeat(60));
    println!(
        "Rows: {} -> {}   Columns: {} -> {}   ({}ms)",
        summary.rows_before,
        summary.rows_after,
        summary.columns_before,
        summary.columns_after,
        summary.duration_ms
    );

    for report in reports {
        println!();
        println!("{}", report.title);
        println!("{}", "-".repeat(40));
        for row in &report.rows {
            println!("  {:<25} {:>12.4}", row.key.to_string(), row.value);
        }
    }
    println!();
}
