use polars::prelude::*;
use std::io::Cursor;

use crate::error::{InsightError, Result};

/// Read CSV bytes with a header row.
///
/// Reads at most `row_cap` data rows. Every column is read as String so a
/// stray token late in a numeric column cannot fail the read; normalization
/// restores numeric and boolean dtypes afterwards.
pub(crate) fn read_csv_bytes(bytes: &[u8], file_name: &str, row_cap: usize) -> Result<DataFrame> {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_n_rows(Some(row_cap))
        .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
        .finish()
        .map_err(|e| InsightError::Parse {
            file: file_name.to_string(),
            reason: e.to_string(),
        })
}
