//! Integration tests for ingestion, analysis and reporting.
//!
//! These tests run the library end to end on the CSV fixtures.

use insightlens::quality::{DuplicateDetector, MissingnessValidator, Validator};
use insightlens::{
    AnalysisConfig, DataQualityAnalyzer, IngestOptions, InsightError, ReportFormat,
    ReportGenerator, Rule, TypeLabel, read_table,
};
use polars::prelude::*;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::PathBuf;

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load_sample() -> DataFrame {
    read_table(fixtures_path().join("sample.csv"), &IngestOptions::default())
        .expect("Failed to read sample.csv")
}

/// Write `content` to a uniquely named temp file and return its path.
fn temp_file(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("insightlens_{}_{}", std::process::id(), name));
    fs::write(&path, content).expect("Failed to write temp file");
    path
}

fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect()
}

// ============================================================================
// Ingestion
// ============================================================================

#[test]
fn test_sample_is_normalized() {
    let df = load_sample();

    assert_eq!(df.shape(), (8, 7));
    assert_eq!(
        column_names(&df),
        vec![
            "order_id",
            "customer_name",
            "unit_price",
            "quantity",
            "order_date",
            "status",
            "notes"
        ]
    );
    // "NA" in a numeric column becomes a null and the column stays numeric
    assert_eq!(df.column("quantity").unwrap().dtype(), &DataType::Int64);
    assert_eq!(df.column("quantity").unwrap().null_count(), 1);
    assert_eq!(df.column("notes").unwrap().null_count(), 4);
}

#[test]
fn test_csv_with_trailing_missing_cell() {
    let path = temp_file("trailing.csv", "id,value\n1,10\n2,20\n3,\n");
    let df = read_table(&path, &IngestOptions::default()).unwrap();
    fs::remove_file(&path).ok();

    assert_eq!(df.shape(), (3, 2));
    assert_eq!(df.column("value").unwrap().null_count(), 1);
}

#[test]
fn test_row_limit_is_inclusive() {
    let path = temp_file("limit.csv", "a\n1\n2\n3\n");

    let exact = read_table(&path, &IngestOptions::default().with_max_rows(3));
    let over = read_table(&path, &IngestOptions::default().with_max_rows(2));
    fs::remove_file(&path).ok();

    assert!(exact.is_ok());
    match over {
        Err(InsightError::MaxRowsExceeded { rows, limit, .. }) => {
            assert_eq!(limit, 2);
            assert!(rows > limit);
        }
        other => panic!("expected MaxRowsExceeded, got {:?}", other.map(|df| df.shape())),
    }
}

#[test]
fn test_unsupported_extension() {
    let path = temp_file("data.json", "{}");
    let result = read_table(&path, &IngestOptions::default());
    fs::remove_file(&path).ok();

    let err = result.unwrap_err();
    assert_eq!(err.error_code(), "UNSUPPORTED_FORMAT");
    assert!(err.is_ingestion_error());
}

// ============================================================================
// Analysis
// ============================================================================

#[test]
fn test_analyze_sample() {
    let df = load_sample();
    let summary = DataQualityAnalyzer::analyze(&df, &AnalysisConfig::default()).unwrap();

    assert_eq!(summary.n_rows, 8);
    assert_eq!(summary.n_columns, 7);

    assert_eq!(summary.dtypes["order_id"], TypeLabel::Numeric);
    assert_eq!(summary.dtypes["customer_name"], TypeLabel::Text);
    assert_eq!(summary.dtypes["unit_price"], TypeLabel::Numeric);
    assert_eq!(summary.dtypes["quantity"], TypeLabel::Numeric);
    assert_eq!(summary.dtypes["order_date"], TypeLabel::Temporal);
    assert_eq!(summary.dtypes["notes"], TypeLabel::Mixed);

    assert_eq!(summary.missingness["quantity"], 1);
    assert_eq!(summary.missingness["notes"], 4);
    assert_eq!(
        summary.missing_flags.keys().collect::<Vec<_>>(),
        vec!["notes"]
    );

    assert_eq!(summary.duplicate_count, 2);
    assert_eq!(summary.duplicate_sample_indices, vec![2, 3]);

    assert_eq!(summary.outliers["unit_price"].outlier_count, 1);
    assert_eq!(summary.outliers["order_id"].outlier_count, 0);
    assert!(!summary.outliers.contains_key("status"));

    assert_eq!(summary.descriptive_stats["unit_price"].count, 8);
    assert_eq!(summary.descriptive_stats["quantity"].count, 7);
    assert_eq!(summary.type_issues.keys().collect::<Vec<_>>(), vec!["notes"]);
    assert!(summary.column_faults.is_empty());
}

#[test]
fn test_rules_agree_with_summary() {
    let df = load_sample();
    let config = AnalysisConfig::default();
    let summary = DataQualityAnalyzer::analyze(&df, &config).unwrap();

    let missingness = MissingnessValidator::new(config.missingness_threshold)
        .unwrap()
        .validate(&df)
        .unwrap();
    assert_eq!(missingness.flags, summary.missing_flags);
    assert_eq!(missingness.counts, summary.missingness);

    let duplicates = DuplicateDetector::new(config.max_duplicate_samples)
        .validate(&df)
        .unwrap();
    assert_eq!(duplicates.duplicate_count, summary.duplicate_count);

    let outliers = Rule::IqrOutliers.run(&df, &config).unwrap();
    assert_eq!(outliers["rule"], "iqr_outliers");
    assert_eq!(outliers["multiplier"], 1.5);
    assert_eq!(outliers["columns"]["unit_price"]["outlier_count"], 1);
}

#[test]
fn test_type_consistency_case() {
    let df = df![
        "a" => [1i64, 2, 3],
        "b" => ["1", "x", "3"],
    ]
    .unwrap();

    let report = Rule::TypeConsistency
        .run(&df, &AnalysisConfig::default())
        .unwrap();
    assert_eq!(report["rule"], "type_consistency");
    assert!(report["issues"].get("b").is_some());
    assert!(report["issues"].get("a").is_none());
    assert_eq!(report["issues"]["b"]["types"]["int"], 2);
    assert_eq!(report["issues"]["b"]["types"]["str"], 1);
}

#[test]
fn test_late_text_token_reported_as_type_issue() {
    let mut content = String::from("amount\n");
    for i in 0..1500 {
        content.push_str(&format!("{i}\n"));
    }
    content.push_str("oops\n");
    let path = temp_file("late_token.csv", &content);
    let df = read_table(&path, &IngestOptions::default());
    fs::remove_file(&path).ok();
    let df = df.unwrap();

    let summary = DataQualityAnalyzer::analyze(&df, &AnalysisConfig::default()).unwrap();
    assert_eq!(summary.n_rows, 1501);
    assert_eq!(summary.dtypes["amount"], TypeLabel::Mixed);

    let issue = serde_json::to_value(&summary.type_issues["amount"]).unwrap();
    assert_eq!(issue["types"]["int"], 1500);
    assert_eq!(issue["types"]["str"], 1);
    assert!(summary.column_faults.is_empty());
}

#[test]
fn test_invalid_config_file() {
    let path = temp_file("bad_config.json", r#"{ "missingness_threshold": 2.0 }"#);
    let result = AnalysisConfig::from_json_file(&path);
    fs::remove_file(&path).ok();

    assert!(matches!(result, Err(InsightError::InvalidConfig(_))));
}

// ============================================================================
// Reporting
// ============================================================================

#[test]
fn test_json_summary_keys() {
    let df = load_sample();
    let summary = DataQualityAnalyzer::analyze(&df, &AnalysisConfig::default()).unwrap();
    let value = serde_json::to_value(&summary).unwrap();

    let keys: Vec<&str> = value
        .as_object()
        .unwrap()
        .keys()
        .map(|k| k.as_str())
        .collect();
    for expected in [
        "n_rows",
        "n_columns",
        "dtypes",
        "missingness",
        "missing_flags",
        "duplicate_count",
        "duplicate_sample_indices",
        "outliers",
        "descriptive_stats",
        "type_issues",
    ] {
        assert!(keys.contains(&expected), "missing key {expected}");
    }
    // No faults, so the key is left out
    assert!(!keys.contains(&"column_faults"));
    assert_eq!(value["descriptive_stats"]["unit_price"]["min"], 9.5);
}

#[test]
fn test_serialization_is_byte_identical() {
    let df = load_sample();
    let config = AnalysisConfig::default();

    let first = ReportGenerator::render(
        &DataQualityAnalyzer::analyze(&df, &config).unwrap(),
        ReportFormat::Html,
    )
    .unwrap();
    let second = ReportGenerator::render(
        &DataQualityAnalyzer::analyze(&df, &config).unwrap(),
        ReportFormat::Html,
    )
    .unwrap();
    assert_eq!(first, second);

    let a = serde_json::to_string(&DataQualityAnalyzer::analyze(&df, &config).unwrap()).unwrap();
    let b = serde_json::to_string(&DataQualityAnalyzer::analyze(&df, &config).unwrap()).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_html_report_for_sample() {
    let df = load_sample();
    let summary = DataQualityAnalyzer::analyze(&df, &AnalysisConfig::default()).unwrap();
    let html = ReportGenerator::render_html_report(&summary);

    for section in [
        "<h2>Summary</h2>",
        "<h2>Column types</h2>",
        "<h2>Missingness</h2>",
        "<h2>Duplicates</h2>",
        "<h2>Outliers (IQR rule)</h2>",
        "<h2>Descriptive statistics</h2>",
        "<h2>Type consistency</h2>",
    ] {
        assert!(html.contains(section), "missing section {section}");
    }
    assert!(html.contains("Rows: 8 | Columns: 7"));
    assert!(html.contains("unit_price: 1 outliers"));
}
