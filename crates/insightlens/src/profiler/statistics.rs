//! Statistical functions for numeric columns.
//!
//! Everything here works on plain `f64` slices once values have been pulled
//! out of a polars `Series` with [`numeric_values`]. Quantiles use linear
//! interpolation between order statistics (position `(n - 1) * p`).

use polars::prelude::*;

use crate::error::{InsightError, Result};
use crate::types::DescriptiveStats;
use crate::utils::{DtypeCategory, get_dtype_category, is_float_dtype, parse_number};

/// Count missing cells: nulls, plus `NaN` for float columns.
pub(crate) fn missing_count(series: &Series) -> Result<usize> {
    if !is_float_dtype(series.dtype()) {
        return Ok(series.null_count());
    }
    let floats = series.cast(&DataType::Float64)?;
    let missing = floats
        .f64()?
        .into_iter()
        .filter(|v| v.is_none_or(f64::is_nan))
        .count();
    Ok(missing)
}

/// Extract the non-missing values of a numeric column as `f64`.
///
/// String columns are accepted when every non-missing cell parses as a
/// number; the first cell that does not is reported as a fault.
pub(crate) fn numeric_values(series: &Series) -> Result<Vec<f64>> {
    match get_dtype_category(series.dtype()) {
        DtypeCategory::Numeric => {
            let floats = series.cast(&DataType::Float64)?;
            let values = floats
                .f64()?
                .into_iter()
                .flatten()
                .filter(|v| !v.is_nan())
                .collect();
            Ok(values)
        }
        DtypeCategory::String => {
            let text = series.cast(&DataType::String)?;
            text.str()?
                .into_iter()
                .flatten()
                .map(|raw| {
                    parse_number(raw).ok_or_else(|| InsightError::NonNumericValue {
                        column: series.name().to_string(),
                        value: raw.to_string(),
                    })
                })
                .collect()
        }
        _ => Err(InsightError::NotNumeric(series.name().to_string())),
    }
}

/// Sort values ascending. Infinities sort to the ends.
pub(crate) fn sorted(mut values: Vec<f64>) -> Vec<f64> {
    values.sort_by(f64::total_cmp);
    values
}

/// Linear-interpolation quantile of already sorted values.
///
/// Returns `None` for an empty slice.
pub fn quantile_linear(sorted: &[f64], p: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let p = p.clamp(0.0, 1.0);
    let position = (sorted.len() - 1) as f64 * p;
    let lower_idx = position.floor() as usize;
    let upper_idx = position.ceil() as usize;
    let lower = sorted[lower_idx];
    let upper = sorted[upper_idx];
    if lower_idx == upper_idx {
        return Some(lower);
    }
    Some(lower + (upper - lower) * (position - lower_idx as f64))
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
///
/// Undefined for fewer than two values.
pub fn sample_std(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = mean(values)?;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64;
    Some(variance.sqrt())
}

/// Quartiles and Tukey fences of sorted values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IqrFences {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

impl IqrFences {
    /// Compute fences with multiplier `k`. `None` for an empty slice.
    pub fn from_sorted(sorted: &[f64], k: f64) -> Option<Self> {
        let q1 = quantile_linear(sorted, 0.25)?;
        let q3 = quantile_linear(sorted, 0.75)?;
        let iqr = q3 - q1;
        Some(Self {
            q1,
            q3,
            lower: q1 - k * iqr,
            upper: q3 + k * iqr,
        })
    }

    pub fn is_finite(&self) -> bool {
        self.lower.is_finite() && self.upper.is_finite()
    }

    pub fn is_outlier(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }

    /// Number of values strictly outside the fences.
    pub fn count_outliers(&self, values: &[f64]) -> usize {
        values.iter().filter(|v| self.is_outlier(**v)).count()
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Summarize sorted values. Non-finite statistics are left out.
pub fn describe_sorted(sorted: &[f64]) -> DescriptiveStats {
    DescriptiveStats {
        count: sorted.len(),
        mean: finite(mean(sorted)),
        std: finite(sample_std(sorted)),
        min: finite(sorted.first().copied()),
        q25: finite(quantile_linear(sorted, 0.25)),
        q50: finite(quantile_linear(sorted, 0.5)),
        q75: finite(quantile_linear(sorted, 0.75)),
        max: finite(sorted.last().copied()),
    }
}
