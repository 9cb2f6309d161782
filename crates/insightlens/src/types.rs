use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::utils::CellKind;

/// Inferred semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeLabel {
    Numeric,
    Text,
    Boolean,
    Temporal,
    /// Non-missing cells of more than one kind.
    Mixed,
    /// All-missing columns and dtypes without a semantic kind.
    Other,
}

impl TypeLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            TypeLabel::Numeric => "numeric",
            TypeLabel::Text => "text",
            TypeLabel::Boolean => "boolean",
            TypeLabel::Temporal => "temporal",
            TypeLabel::Mixed => "mixed",
            TypeLabel::Other => "other",
        }
    }
}

impl std::fmt::Display for TypeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-column type label and missing count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSummary {
    pub name: String,
    pub inferred_type: TypeLabel,
    pub missing_count: usize,
}

/// Shape and per-column type labels of a table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableShape {
    pub n_rows: usize,
    pub n_columns: usize,
    pub dtypes: BTreeMap<String, TypeLabel>,
}

/// IQR fence diagnostics for one numeric column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierStats {
    pub outlier_count: usize,
    pub lower: f64,
    pub upper: f64,
}

/// Descriptive statistics for one numeric column.
///
/// Every statistic but `count` is dropped from the serialized entry when it
/// is not finite (for example `std` of a single value).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DescriptiveStats {
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub std: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(rename = "25%", default, skip_serializing_if = "Option::is_none")]
    pub q25: Option<f64>,
    #[serde(rename = "50%", default, skip_serializing_if = "Option::is_none")]
    pub q50: Option<f64>,
    #[serde(rename = "75%", default, skip_serializing_if = "Option::is_none")]
    pub q75: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

/// Observed cell kinds of a column holding more than one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeIssue {
    pub types: BTreeMap<CellKind, usize>,
}

/// A computation fault that caused a column to be left out of one section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnFault {
    pub rule: String,
    pub column: String,
    pub code: String,
    pub message: String,
}

/// Result of one analysis run.
///
/// Built once by [`crate::quality::DataQualityAnalyzer::analyze`] and never
/// mutated afterwards. Maps are ordered so that serializing the same summary
/// twice yields identical bytes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub n_rows: usize,
    pub n_columns: usize,
    pub dtypes: BTreeMap<String, TypeLabel>,
    pub missingness: BTreeMap<String, usize>,
    pub missing_flags: BTreeMap<String, f64>,
    pub duplicate_count: usize,
    pub duplicate_sample_indices: Vec<usize>,
    pub outliers: BTreeMap<String, OutlierStats>,
    pub descriptive_stats: BTreeMap<String, DescriptiveStats>,
    pub type_issues: BTreeMap<String, TypeIssue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub column_faults: Vec<ColumnFault>,
}

impl AnalysisSummary {
    /// Per-column view combining type labels and missing counts.
    pub fn column_summaries(&self) -> Vec<ColumnSummary> {
        self.dtypes
            .iter()
            .map(|(name, label)| ColumnSummary {
                name: name.clone(),
                inferred_type: *label,
                missing_count: self.missingness.get(name).copied().unwrap_or(0),
            })
            .collect()
    }

    /// Fraction of all cells that are missing (0.0 for an empty table).
    pub fn overall_missing_fraction(&self) -> f64 {
        let cells = self.n_rows * self.n_columns;
        if cells == 0 {
            return 0.0;
        }
        self.missingness.values().sum::<usize>() as f64 / cells as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptive_stats_omits_missing_values() {
        let stats = DescriptiveStats {
            count: 1,
            mean: Some(5.0),
            std: None,
            min: Some(5.0),
            q25: Some(5.0),
            q50: Some(5.0),
            q75: Some(5.0),
            max: Some(5.0),
        };
        let json = serde_json::to_value(stats).unwrap();
        assert!(json.get("std").is_none());
        assert_eq!(json["25%"], 5.0);
        assert_eq!(json["count"], 1);
    }

    #[test]
    fn test_type_label_serialization() {
        assert_eq!(
            serde_json::to_string(&TypeLabel::Numeric).unwrap(),
            "\"numeric\""
        );
        assert_eq!(TypeLabel::Mixed.to_string(), "mixed");
    }

    #[test]
    fn test_type_issue_uses_kind_labels_as_keys() {
        let mut types = BTreeMap::new();
        types.insert(CellKind::Integer, 2);
        types.insert(CellKind::Text, 1);
        let json = serde_json::to_string(&TypeIssue { types }).unwrap();
        assert_eq!(json, r#"{"types":{"int":2,"str":1}}"#);
    }
}
