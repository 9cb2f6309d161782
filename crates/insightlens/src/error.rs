//! Custom error types for the analysis engine.
//!
//! This module provides the error hierarchy using `thiserror`. Variants fall
//! into three groups:
//!
//! - ingestion faults, raised before the engine ever sees a table
//! - per-column computation faults, which the analyzer catches and records
//!   as omissions instead of aborting the whole report
//! - configuration faults, raised before any computation starts
//!
//! Errors are serializable so the HTTP layer can hand them to clients as
//! `{code, message}` objects.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for ingestion, analysis and reporting.
#[derive(Error, Debug)]
pub enum InsightError {
    /// Input file does not exist.
    #[error("File does not exist: {0}")]
    FileNotFound(String),

    /// File extension is not CSV or Excel.
    #[error("Unsupported file extension: {0}")]
    UnsupportedFormat(String),

    /// The reader failed to parse the file.
    #[error("Failed to parse {file}: {reason}")]
    Parse { file: String, reason: String },

    /// The file holds more data rows than the configured limit.
    #[error("File {file} has {rows} rows which exceeds limit {limit}")]
    MaxRowsExceeded {
        file: String,
        rows: usize,
        limit: usize,
    },

    /// Requested worksheet does not exist in the workbook.
    #[error("Sheet '{0}' not found in workbook")]
    SheetNotFound(String),

    /// Column has a dtype that cannot be read as numbers.
    #[error("Column '{0}' is not numeric")]
    NotNumeric(String),

    /// A cell in a numeric column could not be read as a number.
    #[error("Column '{column}' holds non-numeric value '{value}'")]
    NonNumericValue { column: String, value: String },

    /// A statistic that must be finite came out as NaN or infinity.
    #[error("Column '{column}' produced a non-finite {statistic}")]
    NonFiniteStatistic { column: String, statistic: String },

    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Report generation failed.
    #[error("Failed to generate report: {0}")]
    ReportGenerationFailed(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Excel reader error.
    #[error("Excel error: {0}")]
    Excel(#[from] calamine::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<InsightError>,
    },
}

impl InsightError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        InsightError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get error code for client handling.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::Parse { .. } => "PARSE_ERROR",
            Self::MaxRowsExceeded { .. } => "MAX_ROWS_EXCEEDED",
            Self::SheetNotFound(_) => "SHEET_NOT_FOUND",
            Self::NotNumeric(_) => "NOT_NUMERIC",
            Self::NonNumericValue { .. } => "NON_NUMERIC_VALUE",
            Self::NonFiniteStatistic { .. } => "NON_FINITE_STATISTIC",
            Self::InvalidConfig(_) => "INVALID_CONFIG",
            Self::ReportGenerationFailed(_) => "REPORT_GENERATION_FAILED",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::Excel(_) => "EXCEL_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error was raised while reading the input file.
    pub fn is_ingestion_error(&self) -> bool {
        match self {
            Self::FileNotFound(_)
            | Self::UnsupportedFormat(_)
            | Self::Parse { .. }
            | Self::MaxRowsExceeded { .. }
            | Self::SheetNotFound(_)
            | Self::Excel(_) => true,
            Self::WithContext { source, .. } => source.is_ingestion_error(),
            _ => false,
        }
    }

    /// Check if this error is a per-column computation fault.
    ///
    /// The analyzer turns these into omissions; everything else aborts.
    pub fn is_column_fault(&self) -> bool {
        match self {
            Self::NotNumeric(_)
            | Self::NonNumericValue { .. }
            | Self::NonFiniteStatistic { .. }
            | Self::Polars(_) => true,
            Self::WithContext { source, .. } => source.is_column_fault(),
            _ => false,
        }
    }
}

/// Errors are serialized as a struct with `code` and `message` fields.
impl Serialize for InsightError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("InsightError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, InsightError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| InsightError::Polars(e).with_context(context))
    }
}
