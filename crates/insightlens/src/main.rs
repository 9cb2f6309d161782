//! CLI entry point for InsightLens analysis.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use dotenv::dotenv;
use insightlens::{
    AnalysisConfig, DataQualityAnalyzer, IngestOptions, ReportFormat, ReportGenerator, Rule,
    SheetSelector, read_table,
};
use std::path::{Path, PathBuf};
use tracing::info;

/// CLI-compatible report format enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFormat {
    /// Self-contained HTML page
    Html,
    /// JSON summary with a generation timestamp
    Json,
}

impl From<CliFormat> for ReportFormat {
    fn from(cli: CliFormat) -> Self {
        match cli {
            CliFormat::Html => ReportFormat::Html,
            CliFormat::Json => ReportFormat::Json,
        }
    }
}

/// CLI-compatible rule enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliRule {
    /// Missing counts and flagged columns
    Missingness,
    /// Columns holding more than one kind of value
    TypeConsistency,
    /// Exact duplicate rows
    Duplicates,
    /// IQR outlier counts and bounds
    IqrOutliers,
    /// Count, mean, std, min, quartiles, max
    DescriptiveStats,
}

impl From<CliRule> for Rule {
    fn from(cli: CliRule) -> Self {
        match cli {
            CliRule::Missingness => Rule::Missingness,
            CliRule::TypeConsistency => Rule::TypeConsistency,
            CliRule::Duplicates => Rule::Duplicates,
            CliRule::IqrOutliers => Rule::IqrOutliers,
            CliRule::DescriptiveStats => Rule::DescriptiveStats,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Data-quality analysis for CSV and Excel files",
    long_about = "Runs descriptive statistics and data-quality checks on a table and \
                  renders the results as HTML or JSON.\n\n\
                  EXAMPLES:\n  \
                  # HTML report on stdout\n  \
                  insightlens -i data.csv > report.html\n\n  \
                  # JSON report written to a directory\n  \
                  insightlens -i data.xlsx --format json -o reports/\n\n  \
                  # A single rule\n  \
                  insightlens -i data.csv --rule duplicates"
)]
struct Args {
    /// Path to the CSV or Excel file to analyze
    #[arg(short, long)]
    input: PathBuf,

    /// Report format
    #[arg(short, long, value_enum, default_value = "html")]
    format: CliFormat,

    /// Directory to write `<input>_report.<ext>` into
    ///
    /// If not specified, the report is printed to stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Run a single rule and print its JSON report
    #[arg(long, value_enum)]
    rule: Option<CliRule>,

    /// JSON file with analysis thresholds
    ///
    /// Command-line thresholds override values from the file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Missing fraction (0.0 - 1.0) at or above which a column is flagged
    #[arg(long)]
    missingness_threshold: Option<f64>,

    /// IQR multiplier for outlier fences
    #[arg(long)]
    outlier_multiplier: Option<f64>,

    /// Number of duplicate row indices to report
    #[arg(long)]
    max_duplicate_samples: Option<usize>,

    /// Reject files with more data rows than this
    #[arg(long, default_value_t = insightlens::ingestion::DEFAULT_MAX_ROWS)]
    max_rows: usize,

    /// Excel worksheet, by position or by name
    #[arg(long, default_value = "0")]
    sheet: SheetSelector,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    /// Whether the JSON report goes to stdout, where logs would corrupt it.
    fn json_on_stdout(&self) -> bool {
        self.output.is_none() && (self.rule.is_some() || matches!(self.format, CliFormat::Json))
    }

    fn analysis_config(&self) -> Result<AnalysisConfig> {
        let base = match &self.config {
            Some(path) => AnalysisConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => AnalysisConfig::default(),
        };

        let config = AnalysisConfig::builder()
            .missingness_threshold(
                self.missingness_threshold
                    .unwrap_or(base.missingness_threshold),
            )
            .outlier_multiplier(self.outlier_multiplier.unwrap_or(base.outlier_multiplier))
            .max_duplicate_samples(
                self.max_duplicate_samples
                    .unwrap_or(base.max_duplicate_samples),
            )
            .build()?;
        Ok(config)
    }
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
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json_on_stdout());

    dotenv().ok();

    let config = args.analysis_config()?;
    let options = IngestOptions::default()
        .with_max_rows(args.max_rows)
        .with_sheet(args.sheet.clone());

    info!("Loading dataset from: {}", args.input.display());
    let df = read_table(&args.input, &options)?;

    let input_stem = extract_file_stem(&args.input);

    if let Some(rule) = args.rule {
        let rule = Rule::from(rule);
        let report = serde_json::to_string_pretty(&rule.run(&df, &config)?)?;
        match &args.output {
            Some(dir) => {
                std::fs::create_dir_all(dir)?;
                let path = dir.join(format!("{}_{}.json", input_stem, rule.as_str()));
                std::fs::write(&path, report)?;
                info!("Rule report written to: {}", path.display());
            }
            None => println!("{report}"),
        }
        return Ok(());
    }

    let summary = DataQualityAnalyzer::analyze(&df, &config)?;
    let format = ReportFormat::from(args.format);

    match &args.output {
        Some(dir) => {
            let generator = ReportGenerator::new(dir.clone());
            let path = generator.write_report(&summary, &input_stem, format)?;
            info!("Report written to: {}", path.display());
        }
        None => println!("{}", ReportGenerator::render(&summary, format)?),
    }

    Ok(())
}

/// Extract the file stem (name without extension) from a path.
fn extract_file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output")
        .to_string()
}
