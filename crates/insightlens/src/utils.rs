//! Shared utilities for the analysis engine.
//!
//! This module contains dtype helpers and value-level classification used by
//! the profiler, the validators and ingestion.

use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Category of a polars data type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DtypeCategory {
    /// Integer or floating point numbers
    Numeric,
    /// Date, datetime, time or duration types
    Datetime,
    /// Boolean type
    Boolean,
    /// String/text type
    String,
    /// Other/unknown types (null, nested, binary)
    Other,
}

/// Check if a DataType is an integer type.
#[inline]
pub fn is_integer_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
    )
}

/// Check if a DataType is a floating point type.
#[inline]
pub fn is_float_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Float32 | DataType::Float64)
}

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    is_integer_dtype(dtype) || is_float_dtype(dtype)
}

/// Check if a DataType is a temporal type.
#[inline]
pub fn is_datetime_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Datetime(_, _) | DataType::Date | DataType::Time | DataType::Duration(_)
    )
}

/// Check if a DataType is boolean.
#[inline]
pub fn is_boolean_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Boolean)
}

/// Get the category of a DataType.
pub fn get_dtype_category(dtype: &DataType) -> DtypeCategory {
    if is_numeric_dtype(dtype) {
        DtypeCategory::Numeric
    } else if is_datetime_dtype(dtype) {
        DtypeCategory::Datetime
    } else if is_boolean_dtype(dtype) {
        DtypeCategory::Boolean
    } else if matches!(dtype, DataType::String | DataType::Categorical(_, _)) {
        DtypeCategory::String
    } else {
        DtypeCategory::Other
    }
}

// =============================================================================
// Cell Classification
// =============================================================================

/// Semantic kind of a single non-missing cell.
///
/// Serialized with the short labels used in type-consistency reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CellKind {
    #[serde(rename = "int")]
    Integer,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "bool")]
    Boolean,
    #[serde(rename = "str")]
    Text,
    #[serde(rename = "datetime")]
    Temporal,
    #[serde(rename = "other")]
    Other,
}

impl CellKind {
    /// Label used as a map key in reports.
    pub fn label(self) -> &'static str {
        match self {
            CellKind::Integer => "int",
            CellKind::Float => "float",
            CellKind::Boolean => "bool",
            CellKind::Text => "str",
            CellKind::Temporal => "datetime",
            CellKind::Other => "other",
        }
    }

    /// Whether the kind is an integer or a float.
    pub fn is_number(self) -> bool {
        matches!(self, CellKind::Integer | CellKind::Float)
    }

    /// Kind shared by every non-missing cell of a typed column.
    ///
    /// Returns `None` for string columns, whose cells must be classified
    /// one by one with [`classify_text`].
    pub fn for_dtype(dtype: &DataType) -> Option<CellKind> {
        match get_dtype_category(dtype) {
            DtypeCategory::Numeric if is_integer_dtype(dtype) => Some(CellKind::Integer),
            DtypeCategory::Numeric => Some(CellKind::Float),
            DtypeCategory::Boolean => Some(CellKind::Boolean),
            DtypeCategory::Datetime => Some(CellKind::Temporal),
            DtypeCategory::String => None,
            DtypeCategory::Other => Some(CellKind::Other),
        }
    }
}

/// Classify a textual cell by inspecting its content.
///
/// # Example
///
/// ```rust,ignore
/// use insightlens::utils::{classify_text, CellKind};
///
/// assert_eq!(classify_text("42"), CellKind::Integer);
/// assert_eq!(classify_text("4.2"), CellKind::Float);
/// assert_eq!(classify_text("TRUE"), CellKind::Boolean);
/// assert_eq!(classify_text("x"), CellKind::Text);
/// ```
pub fn classify_text(value: &str) -> CellKind {
    let trimmed = value.trim();
    if trimmed.parse::<i64>().is_ok() {
        CellKind::Integer
    } else if parse_number(trimmed).is_some() {
        CellKind::Float
    } else if is_boolean_token(trimmed) {
        CellKind::Boolean
    } else {
        CellKind::Text
    }
}

/// Parse a textual cell as a finite number.
///
/// Rust's float parser accepts words like `inf` and `NaN`; those are treated
/// as text here, so a token must contain at least one digit.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    if !trimmed.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

// =============================================================================
// Token Detection
// =============================================================================

/// Textual boolean representations (compared case-insensitively).
pub const BOOLEAN_TOKENS: [&str; 2] = ["true", "false"];

/// Textual missing-value encodings replaced with nulls during ingestion.
pub const MISSING_MARKERS: [&str; 6] = ["na", "n/a", "none", "null", "\\n", ""];

/// Check if a string is a boolean token.
pub fn is_boolean_token(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    BOOLEAN_TOKENS.iter().any(|&token| token == lower)
}

/// Check if a string is a textual missing-value marker.
pub fn is_missing_marker(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    MISSING_MARKERS.iter().any(|&marker| marker == lower)
}

// Date pattern regexes - compiled once at startup
static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        Regex::new(r"^\d{4}[-/]\d{1,2}[-/]\d{1,2}$").expect("Invalid regex: YYYY-MM-DD"),
        Regex::new(r"^\d{1,2}[-/]\d{1,2}[-/]\d{4}$").expect("Invalid regex: MM-DD-YYYY"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}\s\d{2}:\d{2}(:\d{2})?").expect("Invalid regex: datetime"),
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}(:\d{2})?").expect("Invalid regex: ISO"),
    ]
});

/// Check if a string looks like a date or datetime.
pub fn looks_like_date(s: &str) -> bool {
    let trimmed = s.trim();
    DATE_PATTERNS.iter().any(|re| re.is_match(trimmed))
}

// =============================================================================
// Tests
// =============================================================================
