//! Type inference logic for column analysis.

use polars::prelude::*;
use std::collections::BTreeMap;

use crate::error::Result;
use crate::types::TypeLabel;
use crate::utils::{CellKind, DtypeCategory, classify_text, get_dtype_category, looks_like_date};

use super::statistics::missing_count;

/// Count the cell kinds of a column's non-missing values.
///
/// Typed columns yield at most one kind; string columns are classified
/// value by value.
pub(crate) fn cell_kind_counts(series: &Series) -> Result<BTreeMap<CellKind, usize>> {
    let mut counts = BTreeMap::new();

    let Some(kind) = CellKind::for_dtype(series.dtype()) else {
        let text = series.cast(&DataType::String)?;
        for value in text.str()?.into_iter().flatten() {
            *counts.entry(classify_text(value)).or_insert(0) += 1;
        }
        return Ok(counts);
    };

    let present = series.len() - missing_count(series)?;
    if present > 0 {
        counts.insert(kind, present);
    }
    Ok(counts)
}

/// Infer the semantic type label of a column.
pub(crate) fn infer_type_label(series: &Series) -> Result<TypeLabel> {
    let label = match get_dtype_category(series.dtype()) {
        DtypeCategory::Numeric => TypeLabel::Numeric,
        DtypeCategory::Boolean => TypeLabel::Boolean,
        DtypeCategory::Datetime => TypeLabel::Temporal,
        DtypeCategory::Other => TypeLabel::Other,
        DtypeCategory::String => infer_text_label(series)?,
    };
    Ok(label)
}

fn infer_text_label(series: &Series) -> Result<TypeLabel> {
    let counts = cell_kind_counts(series)?;
    if counts.is_empty() {
        return Ok(TypeLabel::Other);
    }

    if counts.keys().all(|kind| kind.is_number()) {
        return Ok(TypeLabel::Numeric);
    }

    let only = |kind: CellKind| counts.len() == 1 && counts.contains_key(&kind);

    if only(CellKind::Boolean) {
        return Ok(TypeLabel::Boolean);
    }

    if only(CellKind::Text) {
        let text = series.cast(&DataType::String)?;
        let all_dates = text.str()?.into_iter().flatten().all(looks_like_date);
        return Ok(if all_dates {
            TypeLabel::Temporal
        } else {
            TypeLabel::Text
        });
    }

    Ok(TypeLabel::Mixed)
}
