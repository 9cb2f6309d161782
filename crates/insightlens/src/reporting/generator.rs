use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

use crate::error::{InsightError, Result};
use crate::types::AnalysisSummary;

use super::html::render_html_report;

/// Output format of a rendered report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    #[default]
    Html,
}

impl ReportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "html" => Ok(ReportFormat::Html),
            other => Err(InsightError::InvalidConfig(format!(
                "Unknown report format: {other} (expected html or json)"
            ))),
        }
    }
}

/// JSON report: the summary wrapped with a generation timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct JsonReport<'a> {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub report: &'a AnalysisSummary,
}

/// Renders summaries and writes report files.
pub struct ReportGenerator {
    output_dir: PathBuf,
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./outputs"),
        }
    }
}

impl ReportGenerator {
    pub fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    pub fn build_json_report(summary: &AnalysisSummary) -> JsonReport<'_> {
        JsonReport {
            generated_at: Local::now().to_rfc3339(),
            report: summary,
        }
    }

    pub fn render_html_report(summary: &AnalysisSummary) -> String {
        render_html_report(summary)
    }

    /// Render the summary in the requested format.
    pub fn render(summary: &AnalysisSummary, format: ReportFormat) -> Result<String> {
        match format {
            ReportFormat::Json => {
                let report = Self::build_json_report(summary);
                serde_json::to_string_pretty(&report)
                    .map_err(|e| InsightError::ReportGenerationFailed(e.to_string()))
            }
            ReportFormat::Html => Ok(render_html_report(summary)),
        }
    }

    /// Write `<name>_report.<ext>` into the output directory.
    pub fn write_report(
        &self,
        summary: &AnalysisSummary,
        report_base_name: &str,
        format: ReportFormat,
    ) -> Result<PathBuf> {
        let content = Self::render(summary, format)?;
        fs::create_dir_all(&self.output_dir)?;

        let report_path = self
            .output_dir
            .join(format!("{}_report.{}", report_base_name, format.extension()));
        let mut file = File::create(&report_path)?;
        file.write_all(content.as_bytes())?;

        info!("Report saved: {}", report_path.display());

        Ok(report_path)
    }
}
