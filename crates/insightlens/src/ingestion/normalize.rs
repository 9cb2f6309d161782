//! Normalization applied to every ingested table.

use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

use crate::error::{Result, ResultExt};
use crate::utils::{CellKind, classify_text, is_missing_marker, parse_number};

static NON_ALPHANUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^0-9a-zA-Z]+").expect("Invalid regex: non-alphanumeric"));
static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("Invalid regex: camel case"));
static REPEATED_UNDERSCORES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__+").expect("Invalid regex: underscores"));

/// Convert a column name to snake_case.
///
/// `"Start Date"` and `"StartDate"` both become `"start_date"`. Names with
/// no ASCII letters or digits come out empty.
pub fn to_snake_case(name: &str) -> String {
    let s = NON_ALPHANUMERIC.replace_all(name, "_");
    let s = CAMEL_BOUNDARY.replace_all(&s, "${1}_${2}");
    let s = s.trim_matches('_');
    REPEATED_UNDERSCORES.replace_all(s, "_").to_lowercase()
}

/// Snake-case every column name, keeping names unique.
///
/// Empty results become `column_{index}`; repeats get `_1`, `_2`, ...
pub fn normalize_column_names(df: DataFrame) -> Result<DataFrame> {
    let mut seen = HashSet::new();
    let columns = df
        .get_columns()
        .iter()
        .enumerate()
        .map(|(idx, col)| {
            let mut base = to_snake_case(col.name());
            if base.is_empty() {
                base = format!("column_{idx}");
            }
            let mut name = base.clone();
            let mut counter = 1;
            while !seen.insert(name.clone()) {
                name = format!("{base}_{counter}");
                counter += 1;
            }
            col.clone().with_name(name.into())
        })
        .collect::<Vec<_>>();

    Ok(DataFrame::new(columns)?)
}

/// Trim string cells and turn textual missing markers into nulls.
pub fn clean_string_columns(mut df: DataFrame) -> Result<DataFrame> {
    let column_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    let mut replaced = 0usize;
    for col_name in &column_names {
        let series = df.column(col_name)?.as_materialized_series();
        if series.dtype() != &DataType::String {
            continue;
        }

        let cleaned: Vec<Option<&str>> = series
            .str()?
            .into_iter()
            .map(|value| {
                let trimmed = value?.trim();
                if is_missing_marker(trimmed) {
                    replaced += 1;
                    None
                } else {
                    Some(trimmed)
                }
            })
            .collect();

        let cleaned_series = Series::new(col_name.as_str().into(), cleaned);
        df.replace(col_name, cleaned_series)
            .context(format!("Cleaning column '{col_name}'"))?;
    }

    if replaced > 0 {
        debug!(replaced, "Standardized missing markers to null");
    }
    Ok(df)
}

/// Cast string columns whose values are all numbers to Int64 or Float64,
/// and columns holding only `true`/`false` tokens to Boolean.
///
/// CSV columns are read as text and a missing marker such as `NA` keeps a
/// column textual; once the markers are nulls the column gets its dtype back.
pub fn restore_column_dtypes(mut df: DataFrame) -> Result<DataFrame> {
    let column_names: Vec<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for col_name in &column_names {
        let series = df.column(col_name)?.as_materialized_series();
        if series.dtype() != &DataType::String {
            continue;
        }

        let ca = series.str()?;
        let mut kinds = ca.into_iter().flatten().map(classify_text);
        let Some(first) = kinds.next() else {
            continue;
        };
        let mut all_integers = first == CellKind::Integer;
        let mut all_numbers = first.is_number();
        let mut all_booleans = first == CellKind::Boolean;
        for kind in kinds {
            all_integers &= kind == CellKind::Integer;
            all_numbers &= kind.is_number();
            all_booleans &= kind == CellKind::Boolean;
        }

        let name: PlSmallStr = col_name.as_str().into();
        let restored = if all_integers {
            let values: Vec<Option<i64>> = ca
                .into_iter()
                .map(|v| v.and_then(|s| s.trim().parse().ok()))
                .collect();
            Series::new(name, values)
        } else if all_numbers {
            let values: Vec<Option<f64>> =
                ca.into_iter().map(|v| v.and_then(parse_number)).collect();
            Series::new(name, values)
        } else if all_booleans {
            let values: Vec<Option<bool>> = ca
                .into_iter()
                .map(|v| v.map(|s| s.trim().eq_ignore_ascii_case("true")))
                .collect();
            Series::new(name, values)
        } else {
            continue;
        };

        debug!(column = %col_name, dtype = %restored.dtype(), "Restored column dtype");
        df.replace(col_name, restored)
            .context(format!("Restoring dtype of column '{col_name}'"))?;
    }

    Ok(df)
}

/// Apply every normalization step in order.
pub fn normalize(df: DataFrame) -> Result<DataFrame> {
    let df = normalize_column_names(df).context("Normalizing column names")?;
    let df = clean_string_columns(df)?;
    restore_column_dtypes(df)
}
