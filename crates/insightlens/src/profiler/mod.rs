//! Table profiling: shape and per-column type labels.
//!
//! The profiler never fails: a column whose type cannot be determined is
//! labelled `other` and a warning is logged.

mod statistics;
mod type_inference;

use polars::prelude::*;
use std::collections::BTreeMap;
use tracing::{debug, warn};

use crate::types::{TableShape, TypeLabel};

pub use statistics::{IqrFences, describe_sorted, mean, quantile_linear, sample_std};
pub(crate) use statistics::{missing_count, numeric_values, sorted};
pub(crate) use type_inference::{cell_kind_counts, infer_type_label};

/// Inspector for table shape and column types.
pub struct TableProfiler;

impl TableProfiler {
    /// Return row count, column count and the type label of every column.
    ///
    /// Works on zero-row and zero-column tables.
    pub fn inspect(df: &DataFrame) -> TableShape {
        let dtypes: BTreeMap<String, TypeLabel> = df
            .get_columns()
            .iter()
            .map(|col| {
                let series = col.as_materialized_series();
                (series.name().to_string(), Self::label_column(series))
            })
            .collect();

        debug!(
            rows = df.height(),
            columns = df.width(),
            "Inspected table shape"
        );

        TableShape {
            n_rows: df.height(),
            n_columns: df.width(),
            dtypes,
        }
    }

    /// Type label for a single column.
    pub fn label_column(series: &Series) -> TypeLabel {
        infer_type_label(series).unwrap_or_else(|e| {
            warn!(column = %series.name(), error = %e, "Type inference failed");
            TypeLabel::Other
        })
    }

    /// Names of the columns labelled `numeric`, in table order.
    pub fn numeric_columns(df: &DataFrame) -> Vec<String> {
        df.get_columns()
            .iter()
            .map(|col| col.as_materialized_series())
            .filter(|series| Self::label_column(series) == TypeLabel::Numeric)
            .map(|series| series.name().to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_inspect_shape_and_types() {
        let df = df![
            "a" => [1i64, 2, 3, 4],
            "b" => [Some(1.0), None, Some(3.0), Some(4.0)],
            "name" => ["x", "y", "z", "w"],
        ]
        .unwrap();

        let shape = TableProfiler::inspect(&df);
        assert_eq!(shape.n_rows, 4);
        assert_eq!(shape.n_columns, 3);
        assert_eq!(shape.dtypes["a"], TypeLabel::Numeric);
        assert_eq!(shape.dtypes["b"], TypeLabel::Numeric);
        assert_eq!(shape.dtypes["name"], TypeLabel::Text);
    }

    #[test]
    fn test_inspect_zero_rows() {
        let df = DataFrame::new(vec![
            Series::new_empty("a".into(), &DataType::Int64).into(),
            Series::new_empty("s".into(), &DataType::String).into(),
        ])
        .unwrap();

        let shape = TableProfiler::inspect(&df);
        assert_eq!(shape.n_rows, 0);
        assert_eq!(shape.n_columns, 2);
        assert_eq!(shape.dtypes["a"], TypeLabel::Numeric);
        assert_eq!(shape.dtypes["s"], TypeLabel::Other);
    }

    #[test]
    fn test_inspect_zero_columns() {
        let shape = TableProfiler::inspect(&DataFrame::empty());
        assert_eq!(shape.n_rows, 0);
        assert_eq!(shape.n_columns, 0);
        assert!(shape.dtypes.is_empty());
    }

    #[test]
    fn test_numeric_columns_in_table_order() {
        let df = df![
            "z" => [1i64, 2],
            "label" => ["a", "b"],
            "a" => ["1.5", "2"],
        ]
        .unwrap();

        assert_eq!(TableProfiler::numeric_columns(&df), vec!["z", "a"]);
    }
}
