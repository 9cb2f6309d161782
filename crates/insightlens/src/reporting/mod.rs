//! Report generation module.
//!
//! Turns an [`AnalysisSummary`](crate::types::AnalysisSummary) into a JSON
//! report or a self-contained HTML page, and writes either to disk.
//!
//! # Example
//!
//! ```rust,ignore
//! use insightlens::reporting::{ReportFormat, ReportGenerator};
//!
//! let html = ReportGenerator::render_html_report(&summary);
//!
//! let generator = ReportGenerator::new(PathBuf::from("output"));
//! generator.write_report(&summary, "sales", ReportFormat::Json)?;
//! ```

mod generator;
mod html;

pub use generator::{JsonReport, ReportFormat, ReportGenerator};
pub use html::{escape_html, render_html_report};
