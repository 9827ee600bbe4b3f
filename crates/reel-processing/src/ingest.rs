//! Loading delimited text files into in-memory tables.
//!
//! The loader reads a comma-delimited file with a header row into a Polars
//! `DataFrame`, inferring column types from a sample of rows. Real-world
//! movie exports are frequently sloppy about quoting, so loading tries a
//! few strategies before giving up.

use crate::error::{PipelineError, Result};
use polars::io::csv::read::{CsvParseOptions, CsvReadOptions};
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Number of rows sampled for schema inference.
const INFER_SCHEMA_ROWS: usize = 100;

/// Loads delimited text files into DataFrames.
pub struct DatasetLoader;

impl DatasetLoader {
    /// Load a CSV file, trying multiple parse strategies.
    ///
    /// Fails with [`PipelineError::Ingest`] if the file is absent, unreadable,
    /// or cannot be parsed into a table with a consistent column count.
    pub fn load(path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(PipelineError::Ingest {
                path: path.display().to_string(),
                reason: "file not found".to_string(),
            });
        }

        Self::load_with_fallbacks(path).map_err(|e| PipelineError::Ingest {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Load CSV with multiple fallback strategies.
    fn load_with_fallbacks(path: &Path) -> PolarsResult<DataFrame> {
        // Strategy 1: Standard loading with quote handling
        match CsvReadOptions::default()
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_has_header(true)
            .with_parse_options(CsvParseOptions::default().with_quote_char(Some(b'"')))
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
            .finish()
        {
            Ok(df) => return Ok(df),
            Err(e) => {
                debug!("Standard loading failed: {}", e);
            }
        }

        // Strategy 2: Without quote handling
        match CsvReadOptions::default()
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_has_header(true)
            .try_into_reader_with_file_path(Some(PathBuf::from(path)))?
            .finish()
        {
            Ok(df) => return Ok(df),
            Err(e) => {
                debug!("Loading without quotes failed: {}", e);
            }
        }

        // Strategy 3: Pre-clean content and parse from memory
        let content = std::fs::read_to_string(path)
            .map_err(|e| PolarsError::ComputeError(e.to_string().into()))?;
        let cleaned = Self::clean_csv_content(&content);
        let cursor = Cursor::new(cleaned);

        CsvReadOptions::default()
            .with_infer_schema_length(Some(INFER_SCHEMA_ROWS))
            .with_has_header(true)
            .into_reader_with_file_handle(cursor)
            .finish()
    }

    /// Strip doubled quotes and blank lines before a last-resort parse.
    fn clean_csv_content(content: &str) -> String {
        content
            .replace("\"\"\"", "\"")
            .replace("\"\"", "\"")
            .lines()
            .filter(|line| !line.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
