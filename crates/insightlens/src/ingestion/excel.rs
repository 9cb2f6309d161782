use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use chrono::NaiveTime;
use polars::prelude::*;
use std::io::Cursor;
use tracing::debug;

use crate::error::{InsightError, Result};

use super::SheetSelector;

static EMPTY_CELL: Data = Data::Empty;

/// Worksheet read from a workbook: header names plus data rows.
pub(crate) struct SheetData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Data>>,
}

impl SheetData {
    fn from_range(range: &Range<Data>) -> Self {
        let mut rows = range.rows();
        let headers = rows
            .next()
            .map(|row| {
                row.iter()
                    .enumerate()
                    .map(|(idx, cell)| match cell {
                        Data::Empty => format!("column_{idx}"),
                        other => other.to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let rows = rows.map(|row| row.to_vec()).collect();
        Self { headers, rows }
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    /// Build a DataFrame, choosing one dtype per column.
    pub fn into_dataframe(self) -> Result<DataFrame> {
        let columns = self
            .headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let cells: Vec<&Data> = self
                    .rows
                    .iter()
                    .map(|row| row.get(idx).unwrap_or(&EMPTY_CELL))
                    .collect();
                column_from_cells(header, &cells).into()
            })
            .collect::<Vec<Column>>();

        Ok(DataFrame::new(columns)?)
    }
}

/// Open a workbook from memory and read one worksheet.
pub(crate) fn read_sheet(bytes: &[u8], file_name: &str, sheet: &SheetSelector) -> Result<SheetData> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes.to_vec())).map_err(|e| InsightError::Parse {
            file: file_name.to_string(),
            reason: e.to_string(),
        })?;

    let sheet_names = workbook.sheet_names().to_vec();
    let sheet_name = match sheet {
        SheetSelector::Index(idx) => sheet_names
            .get(*idx)
            .cloned()
            .ok_or_else(|| InsightError::SheetNotFound(idx.to_string()))?,
        SheetSelector::Name(name) => sheet_names
            .iter()
            .find(|candidate| *candidate == name)
            .cloned()
            .ok_or_else(|| InsightError::SheetNotFound(name.clone()))?,
    };

    debug!(sheet = %sheet_name, "Reading worksheet");
    let range = workbook.worksheet_range(&sheet_name)?;
    Ok(SheetData::from_range(&range))
}

fn is_missing(cell: &Data) -> bool {
    matches!(cell, Data::Empty | Data::Error(_))
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::DateTime(dt) => Some(match dt.as_datetime() {
            Some(value) if value.time() == NaiveTime::MIN => value.format("%Y-%m-%d").to_string(),
            Some(value) => value.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => dt.as_f64().to_string(),
        }),
        other => Some(other.to_string()),
    }
}

fn column_from_cells(header: &str, cells: &[&Data]) -> Series {
    let name: PlSmallStr = header.into();
    let present: Vec<&Data> = cells.iter().copied().filter(|c| !is_missing(c)).collect();

    if present.is_empty() {
        return Series::new_null(name, cells.len());
    }

    if present.iter().all(|c| matches!(c, Data::Int(_))) {
        let values: Vec<Option<i64>> = cells
            .iter()
            .map(|c| match c {
                Data::Int(i) => Some(*i),
                _ => None,
            })
            .collect();
        return Series::new(name, values);
    }

    if present.iter().all(|c| matches!(c, Data::Int(_) | Data::Float(_))) {
        let values: Vec<Option<f64>> = cells
            .iter()
            .map(|c| match c {
                Data::Int(i) => Some(*i as f64),
                Data::Float(f) => Some(*f),
                _ => None,
            })
            .collect();
        return Series::new(name, values);
    }

    if present.iter().all(|c| matches!(c, Data::Bool(_))) {
        let values: Vec<Option<bool>> = cells
            .iter()
            .map(|c| match c {
                Data::Bool(b) => Some(*b),
                _ => None,
            })
            .collect();
        return Series::new(name, values);
    }

    let values: Vec<Option<String>> = cells.iter().map(|c| cell_text(c)).collect();
    Series::new(name, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(headers: &[&str], rows: Vec<Vec<Data>>) -> SheetData {
        SheetData {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn test_column_dtypes_from_cells() {
        let data = sheet(
            &["id", "price", "active", "note", "blank"],
            vec![
                vec![
                    Data::Int(1),
                    Data::Float(2.5),
                    Data::Bool(true),
                    Data::String("a".into()),
                    Data::Empty,
                ],
                vec![
                    Data::Int(2),
                    Data::Int(3),
                    Data::Empty,
                    Data::Int(7),
                    Data::Empty,
                ],
            ],
        );

        let df = data.into_dataframe().unwrap();
        assert_eq!(df.shape(), (2, 5));
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("price").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("active").unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.column("note").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("blank").unwrap().null_count(), 2);
    }

    #[test]
    fn test_short_rows_are_padded_with_nulls() {
        let data = sheet(
            &["a", "b"],
            vec![vec![Data::Int(1), Data::Int(2)], vec![Data::Int(3)]],
        );

        let df = data.into_dataframe().unwrap();
        assert_eq!(df.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn test_invalid_workbook_is_parse_error() {
        let err = read_sheet(b"not a workbook", "bad.xlsx", &SheetSelector::Index(0))
            .err()
            .unwrap();
        assert_eq!(err.error_code(), "PARSE_ERROR");
    }
}
