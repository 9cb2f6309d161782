//! InsightLens data-quality analysis library
//!
//! Descriptive statistics and data-quality checks over tabular data, built on
//! Polars.
//!
//! # Overview
//!
//! - **Ingestion**: CSV and single-sheet Excel readers with column-name,
//!   whitespace and missing-marker normalization plus a row limit
//! - **Profiling**: table shape and per-column type labels
//! - **Validation**: missingness, type consistency, duplicate rows, IQR
//!   outliers and descriptive statistics, each callable on its own
//! - **Reporting**: JSON and self-contained HTML reports
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use insightlens::{AnalysisConfig, DataQualityAnalyzer, IngestOptions, ReportGenerator};
//!
//! let df = insightlens::ingestion::read_table("data.csv", &IngestOptions::default())?;
//!
//! let config = AnalysisConfig::builder()
//!     .missingness_threshold(0.3)
//!     .outlier_multiplier(3.0)
//!     .build()?;
//!
//! let summary = DataQualityAnalyzer::analyze(&df, &config)?;
//! println!("{} duplicate rows", summary.duplicate_count);
//!
//! let html = ReportGenerator::render_html_report(&summary);
//! ```
//!
//! # Single rules
//!
//! Every check implements [`quality::Validator`] and produces a report
//! tagged with its rule name:
//!
//! ```rust,ignore
//! use insightlens::quality::{IqrOutlierDetector, Validator};
//!
//! let report = IqrOutlierDetector::new(1.5)?.validate(&df)?;
//! for (column, stats) in &report.columns {
//!     println!("{column}: {} outliers", stats.outlier_count);
//! }
//! ```
//!
//! # Errors
//!
//! Ingestion problems and invalid configuration are returned as
//! [`InsightError`]. A column that cannot be computed (for example a numeric
//! column whose quartiles are infinite) does not abort the analysis: it is
//! left out of that section and listed in `column_faults`.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod profiler;
pub mod quality;
pub mod reporting;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use config::{AnalysisConfig, AnalysisConfigBuilder, ConfigValidationError};
pub use error::{InsightError, Result as InsightResult, ResultExt};
pub use ingestion::{IngestOptions, SheetSelector, read_table, read_table_from_bytes};
pub use profiler::TableProfiler;
pub use quality::{DataQualityAnalyzer, Rule, Validator};
pub use reporting::{JsonReport, ReportFormat, ReportGenerator};
pub use types::{
    AnalysisSummary, ColumnFault, ColumnSummary, DescriptiveStats, OutlierStats, TableShape,
    TypeIssue, TypeLabel,
};
pub use utils::{CellKind, DtypeCategory, get_dtype_category};
