//! Rule-based validators.
//!
//! Each validator is a small, stateless transformation over a table that
//! returns a serializable report tagged with its rule name. Validators never
//! alter the table.

use polars::prelude::*;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::config::{AnalysisConfig, validate_multiplier, validate_threshold};
use crate::error::{InsightError, Result};
use crate::profiler::{
    IqrFences, TableProfiler, cell_kind_counts, describe_sorted, missing_count, numeric_values,
    sorted,
};
use crate::types::{ColumnFault, DescriptiveStats, OutlierStats, TypeIssue, TypeLabel};
use crate::utils::is_float_dtype;

/// A rule that inspects a table and produces a report.
pub trait Validator {
    type Report: Serialize;

    /// Rule name carried in the report's `rule` field.
    fn rule(&self) -> Rule;

    fn validate(&self, df: &DataFrame) -> Result<Self::Report>;

    /// Run the rule and return its report as JSON.
    fn validate_json(&self, df: &DataFrame) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self.validate(df)?)?)
    }
}

/// The fixed set of validation rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    Missingness,
    TypeConsistency,
    Duplicates,
    IqrOutliers,
    DescriptiveStats,
}

impl Rule {
    pub const ALL: [Rule; 5] = [
        Rule::Missingness,
        Rule::TypeConsistency,
        Rule::Duplicates,
        Rule::IqrOutliers,
        Rule::DescriptiveStats,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Rule::Missingness => "missingness",
            Rule::TypeConsistency => "type_consistency",
            Rule::Duplicates => "duplicates",
            Rule::IqrOutliers => "iqr_outliers",
            Rule::DescriptiveStats => "descriptive_stats",
        }
    }

    /// Run this rule alone with thresholds taken from `config`.
    pub fn run(self, df: &DataFrame, config: &AnalysisConfig) -> Result<serde_json::Value> {
        config.validate()?;
        match self {
            Rule::Missingness => {
                MissingnessValidator::new(config.missingness_threshold)?.validate_json(df)
            }
            Rule::TypeConsistency => TypeConsistencyValidator.validate_json(df),
            Rule::Duplicates => {
                DuplicateDetector::new(config.max_duplicate_samples).validate_json(df)
            }
            Rule::IqrOutliers => {
                IqrOutlierDetector::new(config.outlier_multiplier)?.validate_json(df)
            }
            Rule::DescriptiveStats => DescriptiveStatsValidator.validate_json(df),
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Rule {
    type Err = InsightError;

    fn from_str(s: &str) -> Result<Self> {
        Rule::ALL
            .into_iter()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| InsightError::InvalidConfig(format!("Unknown rule: {s}")))
    }
}

impl ColumnFault {
    fn new(rule: Rule, column: &str, err: &InsightError) -> Self {
        Self {
            rule: rule.as_str().to_string(),
            column: column.to_string(),
            code: err.error_code().to_string(),
            message: err.to_string(),
        }
    }
}

/// Apply `f` to every column, collecting the entries it produces.
///
/// Column faults are logged and returned separately; any other error
/// aborts the run.
fn collect_per_column<T>(
    rule: Rule,
    df: &DataFrame,
    mut f: impl FnMut(&Series) -> Result<Option<T>>,
) -> Result<(BTreeMap<String, T>, Vec<ColumnFault>)> {
    let mut entries = BTreeMap::new();
    let mut faults = Vec::new();

    for col in df.get_columns() {
        let series = col.as_materialized_series();
        let name = series.name().as_str();
        match f(series) {
            Ok(Some(entry)) => {
                entries.insert(name.to_string(), entry);
            }
            Ok(None) => {}
            Err(e) if e.is_column_fault() => {
                warn!(rule = %rule, column = %name, error = %e, "Column skipped");
                faults.push(ColumnFault::new(rule, name, &e));
            }
            Err(e) => return Err(e),
        }
    }

    Ok((entries, faults))
}

// =============================================================================
// Missingness
// =============================================================================

/// Flags columns whose missing fraction meets or exceeds a threshold.
#[derive(Debug, Clone, Copy)]
pub struct MissingnessValidator {
    threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingnessReport {
    pub rule: Rule,
    pub threshold: f64,
    /// Missing count for every column, including unflagged ones.
    pub counts: BTreeMap<String, usize>,
    pub flags: BTreeMap<String, f64>,
}

impl MissingnessValidator {
    pub fn new(threshold: f64) -> Result<Self> {
        validate_threshold("missingness_threshold", threshold)?;
        Ok(Self { threshold })
    }

    /// Missing count per column.
    pub fn missing_counts(df: &DataFrame) -> Result<BTreeMap<String, usize>> {
        df.get_columns()
            .iter()
            .map(|col| {
                let series = col.as_materialized_series();
                Ok((series.name().to_string(), missing_count(series)?))
            })
            .collect()
    }
}

impl Default for MissingnessValidator {
    fn default() -> Self {
        Self {
            threshold: crate::config::DEFAULT_MISSINGNESS_THRESHOLD,
        }
    }
}

impl Validator for MissingnessValidator {
    type Report = MissingnessReport;

    fn rule(&self) -> Rule {
        Rule::Missingness
    }

    fn validate(&self, df: &DataFrame) -> Result<MissingnessReport> {
        let counts = Self::missing_counts(df)?;
        let n_rows = df.height();

        // No fraction exists for an empty table.
        let flags = if n_rows == 0 {
            BTreeMap::new()
        } else {
            counts
                .iter()
                .map(|(name, count)| (name, *count as f64 / n_rows as f64))
                .filter(|(_, fraction)| *fraction >= self.threshold)
                .map(|(name, fraction)| (name.clone(), fraction))
                .collect()
        };

        Ok(MissingnessReport {
            rule: self.rule(),
            threshold: self.threshold,
            counts,
            flags,
        })
    }
}

// =============================================================================
// Type consistency
// =============================================================================

/// Reports columns whose non-missing cells are of more than one kind.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeConsistencyValidator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeConsistencyReport {
    pub rule: Rule,
    pub issues: BTreeMap<String, TypeIssue>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<ColumnFault>,
}

impl TypeConsistencyValidator {
    /// Kind histogram of one column, when it holds more than one kind.
    ///
    /// Integer and float tokens together count as one numeric kind, matching
    /// the `numeric` label such a column gets.
    pub fn check_column(series: &Series) -> Result<Option<TypeIssue>> {
        let types = cell_kind_counts(series)?;
        let all_numbers = types.keys().all(|kind| kind.is_number());
        Ok((types.len() > 1 && !all_numbers).then_some(TypeIssue { types }))
    }
}

impl Validator for TypeConsistencyValidator {
    type Report = TypeConsistencyReport;

    fn rule(&self) -> Rule {
        Rule::TypeConsistency
    }

    fn validate(&self, df: &DataFrame) -> Result<TypeConsistencyReport> {
        let (issues, faults) = collect_per_column(self.rule(), df, Self::check_column)?;
        Ok(TypeConsistencyReport {
            rule: self.rule(),
            issues,
            faults,
        })
    }
}

// =============================================================================
// Duplicates
// =============================================================================

/// Counts rows that are exact duplicates of another row.
///
/// Every member of a duplicate group is counted, so two identical rows give
/// a count of 2. Missing cells compare equal to each other.
#[derive(Debug, Clone, Copy)]
pub struct DuplicateDetector {
    max_samples: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateReport {
    pub rule: Rule,
    pub duplicate_count: usize,
    pub sample_indices: Vec<usize>,
}

impl DuplicateDetector {
    pub fn new(max_samples: usize) -> Self {
        Self { max_samples }
    }

    /// Copy of the table in which NaN cells of float columns are nulls, so
    /// that NaN and null compare equal when grouping rows.
    fn nan_as_null(df: &DataFrame) -> Result<DataFrame> {
        let columns = df
            .get_columns()
            .iter()
            .map(|col| -> Result<Column> {
                if col.dtype() == &DataType::Null {
                    return Ok(col.cast(&DataType::Boolean)?);
                }
                if !is_float_dtype(col.dtype()) {
                    return Ok(col.clone());
                }
                let floats = col.as_materialized_series().cast(&DataType::Float64)?;
                // `+ 0.0` folds negative zero into zero.
                let cleaned: Float64Chunked = floats
                    .f64()?
                    .into_iter()
                    .map(|v| v.filter(|x| !x.is_nan()).map(|x| x + 0.0))
                    .collect();
                Ok(Column::from(cleaned.with_name(col.name().clone()).into_series()))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(DataFrame::new(columns)?)
    }

    /// Flag every row that belongs to a group of identical rows.
    pub fn duplicated_mask(df: &DataFrame) -> Result<Vec<bool>> {
        if df.width() == 0 {
            return Ok(vec![false; df.height()]);
        }

        let mask = Self::nan_as_null(df)?.is_duplicated()?;
        Ok(mask.into_iter().map(|d| d.unwrap_or(false)).collect())
    }
}

impl Default for DuplicateDetector {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_DUPLICATE_SAMPLES)
    }
}

impl Validator for DuplicateDetector {
    type Report = DuplicateReport;

    fn rule(&self) -> Rule {
        Rule::Duplicates
    }

    fn validate(&self, df: &DataFrame) -> Result<DuplicateReport> {
        let mask = Self::duplicated_mask(df)?;
        let duplicate_count = mask.iter().filter(|d| **d).count();
        let sample_indices = mask
            .iter()
            .enumerate()
            .filter(|(_, d)| **d)
            .map(|(i, _)| i)
            .take(self.max_samples)
            .collect();

        debug!(duplicate_count, "Duplicate detection finished");

        Ok(DuplicateReport {
            rule: self.rule(),
            duplicate_count,
            sample_indices,
        })
    }
}

// =============================================================================
// IQR outliers
// =============================================================================

/// Counts values outside the Tukey fences `[Q1 - k*IQR, Q3 + k*IQR]`.
#[derive(Debug, Clone, Copy)]
pub struct IqrOutlierDetector {
    multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutlierReport {
    pub rule: Rule,
    pub multiplier: f64,
    pub columns: BTreeMap<String, OutlierStats>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<ColumnFault>,
}

impl IqrOutlierDetector {
    pub fn new(multiplier: f64) -> Result<Self> {
        validate_multiplier(multiplier)?;
        Ok(Self { multiplier })
    }

    /// Outlier stats of one column.
    ///
    /// `Ok(None)` when the column has no non-missing values.
    pub fn column_stats(&self, series: &Series) -> Result<Option<OutlierStats>> {
        let values = sorted(numeric_values(series)?);
        let Some(fences) = IqrFences::from_sorted(&values, self.multiplier) else {
            return Ok(None);
        };
        if !fences.is_finite() {
            return Err(InsightError::NonFiniteStatistic {
                column: series.name().to_string(),
                statistic: "IQR bounds".to_string(),
            });
        }
        Ok(Some(OutlierStats {
            outlier_count: fences.count_outliers(&values),
            lower: fences.lower,
            upper: fences.upper,
        }))
    }
}

impl Default for IqrOutlierDetector {
    fn default() -> Self {
        Self {
            multiplier: crate::config::DEFAULT_OUTLIER_MULTIPLIER,
        }
    }
}

impl Validator for IqrOutlierDetector {
    type Report = OutlierReport;

    fn rule(&self) -> Rule {
        Rule::IqrOutliers
    }

    fn validate(&self, df: &DataFrame) -> Result<OutlierReport> {
        let (columns, faults) = collect_per_column(self.rule(), df, |series| {
            if TableProfiler::label_column(series) != TypeLabel::Numeric {
                return Ok(None);
            }
            self.column_stats(series)
        })?;

        Ok(OutlierReport {
            rule: self.rule(),
            multiplier: self.multiplier,
            columns,
            faults,
        })
    }
}

// =============================================================================
// Descriptive statistics
// =============================================================================

/// Count, mean, sample std, min, quartiles and max of numeric columns.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptiveStatsValidator;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DescriptiveStatsReport {
    pub rule: Rule,
    pub columns: BTreeMap<String, DescriptiveStats>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub faults: Vec<ColumnFault>,
}

impl DescriptiveStatsValidator {
    /// Statistics of one column; `Ok(None)` when it has no values.
    pub fn column_stats(series: &Series) -> Result<Option<DescriptiveStats>> {
        let values = sorted(numeric_values(series)?);
        if values.is_empty() {
            return Ok(None);
        }
        Ok(Some(describe_sorted(&values)))
    }
}

impl Validator for DescriptiveStatsValidator {
    type Report = DescriptiveStatsReport;

    fn rule(&self) -> Rule {
        Rule::DescriptiveStats
    }

    fn validate(&self, df: &DataFrame) -> Result<DescriptiveStatsReport> {
        let (columns, faults) = collect_per_column(self.rule(), df, |series| {
            if TableProfiler::label_column(series) != TypeLabel::Numeric {
                return Ok(None);
            }
            Self::column_stats(series)
        })?;

        Ok(DescriptiveStatsReport {
            rule: self.rule(),
            columns,
            faults,
        })
    }
}
