//! File ingestion: CSV and single-sheet Excel readers.
//!
//! Every reader enforces a row limit and hands back a normalized table:
//! snake_case column names, trimmed strings and textual missing markers
//! replaced with nulls.

mod csv;
mod excel;
mod normalize;

use polars::prelude::*;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};

use crate::error::{InsightError, Result};

pub use normalize::{
    clean_string_columns, normalize, normalize_column_names, restore_column_dtypes,
    to_snake_case,
};

/// Default maximum number of data rows accepted from a file.
pub const DEFAULT_MAX_ROWS: usize = 100_000;

/// Worksheet to read from an Excel workbook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl FromStr for SheetSelector {
    type Err = std::convert::Infallible;

    /// Digits select by position, anything else by name.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.parse::<usize>() {
            Ok(idx) => SheetSelector::Index(idx),
            Err(_) => SheetSelector::Name(s.to_string()),
        })
    }
}

/// Options for reading a table from a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOptions {
    /// Files with more data rows than this are rejected.
    pub max_rows: usize,
    pub sheet: SheetSelector,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            max_rows: DEFAULT_MAX_ROWS,
            sheet: SheetSelector::default(),
        }
    }
}

impl IngestOptions {
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = max_rows;
        self
    }

    pub fn with_sheet(mut self, sheet: SheetSelector) -> Self {
        self.sheet = sheet;
        self
    }
}

/// Supported input formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Excel,
}

impl FileFormat {
    /// Pick the format from a file name's extension.
    ///
    /// A name without an extension is read as CSV.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = Path::new(file_name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase());

        match extension.as_deref() {
            None | Some("csv") => Ok(FileFormat::Csv),
            Some("xls") | Some("xlsx") => Ok(FileFormat::Excel),
            Some(other) => Err(InsightError::UnsupportedFormat(format!(".{other}"))),
        }
    }
}

fn check_row_limit(file_name: &str, rows: usize, limit: usize) -> Result<()> {
    if rows > limit {
        return Err(InsightError::MaxRowsExceeded {
            file: file_name.to_string(),
            rows,
            limit,
        });
    }
    Ok(())
}

/// Read a CSV or Excel file from disk and normalize it.
///
/// # Example
///
/// ```rust,ignore
/// use insightlens::ingestion::{read_table, IngestOptions};
///
/// let df = read_table("data/sales.csv", &IngestOptions::default())?;
/// ```
pub fn read_table(path: impl AsRef<Path>, options: &IngestOptions) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(InsightError::FileNotFound(path.display().to_string()));
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    // Reject unknown extensions before reading the file.
    FileFormat::from_file_name(&file_name)?;

    let bytes = fs::read(path)?;
    read_table_from_bytes(&bytes, &file_name, options)
}

/// Read an in-memory upload and normalize it.
///
/// `file_name` decides the format and is used in error messages.
pub fn read_table_from_bytes(
    bytes: &[u8],
    file_name: &str,
    options: &IngestOptions,
) -> Result<DataFrame> {
    let format = FileFormat::from_file_name(file_name)?;
    debug!(file = %file_name, ?format, bytes = bytes.len(), "Reading table");

    let df = match format {
        FileFormat::Csv => {
            let df = csv::read_csv_bytes(bytes, file_name, options.max_rows.saturating_add(1))?;
            check_row_limit(file_name, df.height(), options.max_rows)?;
            df
        }
        FileFormat::Excel => {
            let sheet = excel::read_sheet(bytes, file_name, &options.sheet)?;
            check_row_limit(file_name, sheet.n_rows(), options.max_rows)?;
            sheet.into_dataframe()?
        }
    };

    let df = normalize(df)?;
    info!(
        file = %file_name,
        rows = df.height(),
        columns = df.width(),
        "Loaded table"
    );
    Ok(df)
}
