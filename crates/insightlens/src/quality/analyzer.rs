use polars::prelude::*;
use tracing::info;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::profiler::TableProfiler;
use crate::types::AnalysisSummary;

use super::validators::{
    DescriptiveStatsValidator, DuplicateDetector, IqrOutlierDetector, MissingnessValidator,
    TypeConsistencyValidator, Validator,
};

/// Runs the full battery of checks over one table.
pub struct DataQualityAnalyzer;

impl DataQualityAnalyzer {
    /// Analyze a table and build its summary.
    ///
    /// The configuration is validated before any computation. Columns that
    /// fault in one section are left out of that section and listed in
    /// `column_faults`; the rest of the analysis carries on.
    pub fn analyze(df: &DataFrame, config: &AnalysisConfig) -> Result<AnalysisSummary> {
        config.validate()?;

        let shape = TableProfiler::inspect(df);

        let missingness =
            MissingnessValidator::new(config.missingness_threshold)?.validate(df)?;
        let type_consistency = TypeConsistencyValidator.validate(df)?;
        let duplicates = DuplicateDetector::new(config.max_duplicate_samples).validate(df)?;
        let outliers = IqrOutlierDetector::new(config.outlier_multiplier)?.validate(df)?;
        let descriptive = DescriptiveStatsValidator.validate(df)?;

        let mut column_faults = type_consistency.faults;
        column_faults.extend(outliers.faults);
        column_faults.extend(descriptive.faults);

        info!(
            rows = shape.n_rows,
            columns = shape.n_columns,
            flagged = missingness.flags.len(),
            duplicates = duplicates.duplicate_count,
            faults = column_faults.len(),
            "Analysis complete"
        );

        Ok(AnalysisSummary {
            n_rows: shape.n_rows,
            n_columns: shape.n_columns,
            dtypes: shape.dtypes,
            missingness: missingness.counts,
            missing_flags: missingness.flags,
            duplicate_count: duplicates.duplicate_count,
            duplicate_sample_indices: duplicates.sample_indices,
            outliers: outliers.columns,
            descriptive_stats: descriptive.columns,
            type_issues: type_consistency.issues,
            column_faults,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::InsightError;
    use crate::types::TypeLabel;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_analyze_basic_table() {
        let df = df![
            "a" => [1i64, 2, 3, 4],
            "b" => [Some(1.0), None, Some(3.0), Some(4.0)],
        ]
        .unwrap();

        let summary = DataQualityAnalyzer::analyze(&df, &AnalysisConfig::default()).unwrap();
        assert_eq!(summary.n_rows, 4);
        assert_eq!(summary.n_columns, 2);
        assert_eq!(summary.missingness["a"], 0);
        assert_eq!(summary.missingness["b"], 1);
        assert!(summary.missing_flags.is_empty());
        assert_eq!(summary.descriptive_stats["b"].count, 3);
        assert!(summary.column_faults.is_empty());
    }

    #[test]
    fn test_analyze_flags_high_missingness() {
        let df = df![
            "a" => [Some(1i64), None, Some(3)],
            "b" => [None::<i64>, None, None],
        ]
        .unwrap();
        let config = AnalysisConfig::builder()
            .missingness_threshold(0.66)
            .build()
            .unwrap();

        let summary = DataQualityAnalyzer::analyze(&df, &config).unwrap();
        assert_eq!(summary.missing_flags.get("b"), Some(&1.0));
        assert!(!summary.missing_flags.contains_key("a"));
        // All-missing numeric columns get no bounds or stats.
        assert!(!summary.outliers.contains_key("b"));
        assert!(!summary.descriptive_stats.contains_key("b"));
    }

    #[test]
    fn test_analyze_zero_rows() {
        let df = DataFrame::new(vec![
            Series::new_empty("a".into(), &DataType::Int64).into(),
            Series::new_empty("b".into(), &DataType::String).into(),
        ])
        .unwrap();

        let summary = DataQualityAnalyzer::analyze(&df, &AnalysisConfig::default()).unwrap();
        assert_eq!(summary.n_rows, 0);
        assert_eq!(summary.n_columns, 2);
        assert!(summary.missing_flags.is_empty());
        assert_eq!(summary.missingness.len(), 2);
        assert_eq!(summary.duplicate_count, 0);
        assert!(summary.outliers.is_empty());
    }

    #[test]
    fn test_analyze_reports_every_column() {
        let df = df![
            "id" => [1i64, 2, 3],
            "name" => ["x", "y", "z"],
            "flag" => [true, false, true],
        ]
        .unwrap();

        let summary = DataQualityAnalyzer::analyze(&df, &AnalysisConfig::default()).unwrap();
        for name in ["id", "name", "flag"] {
            assert!(summary.dtypes.contains_key(name));
            assert!(summary.missingness.contains_key(name));
        }
        assert_eq!(summary.dtypes["flag"], TypeLabel::Boolean);
    }

    #[test]
    fn test_analyze_records_column_faults() {
        let df = df![
            "ok" => [1.0, 2.0, 3.0, 4.0],
            "bad" => [1.0, 2.0, f64::INFINITY, f64::INFINITY],
        ]
        .unwrap();

        let summary = DataQualityAnalyzer::analyze(&df, &AnalysisConfig::default()).unwrap();
        assert!(summary.outliers.contains_key("ok"));
        assert!(!summary.outliers.contains_key("bad"));
        assert!(
            summary
                .column_faults
                .iter()
                .any(|f| f.column == "bad" && f.rule == "iqr_outliers")
        );
    }

    #[test]
    fn test_analyze_rejects_invalid_config() {
        let df = df!["a" => [1i64]].unwrap();
        let config = AnalysisConfig {
            outlier_multiplier: -1.0,
            ..AnalysisConfig::default()
        };

        let result = DataQualityAnalyzer::analyze(&df, &config);
        assert!(matches!(result, Err(InsightError::InvalidConfig(_))));
    }

    #[test]
    fn test_analyze_is_deterministic() {
        let df = df![
            "x" => [1i64, 1, 2, 90],
            "y" => ["a", "a", "b", "2"],
        ]
        .unwrap();
        let config = AnalysisConfig::default();

        let first = serde_json::to_string(&DataQualityAnalyzer::analyze(&df, &config).unwrap());
        let second = serde_json::to_string(&DataQualityAnalyzer::analyze(&df, &config).unwrap());
        assert_eq!(first.unwrap(), second.unwrap());
    }
}
