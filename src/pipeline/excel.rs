//! Excel workbook reader
//!
//! The first worksheet becomes a DataFrame: its first row names the columns
//! and each column takes the narrowest type every non-empty cell fits.
//! Numbers become `Int64` when all of them are whole and `Float64`
//! otherwise, date cells become millisecond `Datetime`, and anything mixed
//! falls back to text so that row validation can report the bad cell.

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Range, Reader};
use chrono::NaiveDateTime;
use polars::prelude::{Column, DataFrame, DataType, TimeUnit};

/// Layout used when a date cell sits in a text column
const TEXT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CellKind {
    Int,
    Float,
    DateTime,
    Text,
}

fn first_sheet(path: &Path) -> Result<Range<Data>> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open Excel workbook: {}", path.display()))?;

    workbook
        .worksheet_range_at(0)
        .with_context(|| format!("Workbook has no worksheets: {}", path.display()))?
        .with_context(|| format!("Failed to read first worksheet: {}", path.display()))
}

/// Read the first worksheet of a workbook into a DataFrame
pub fn read_excel(path: &Path) -> Result<DataFrame> {
    let range = first_sheet(path)?;
    let rows: Vec<&[Data]> = range.rows().collect();
    let df = cells_to_dataframe(&rows)
        .with_context(|| format!("Failed to convert worksheet: {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Read first worksheet"
    );
    Ok(df)
}

/// Header row of the first worksheet
pub fn excel_column_names(path: &Path) -> Result<Vec<String>> {
    let range = first_sheet(path)?;
    Ok(range.rows().next().map(header_names).unwrap_or_default())
}

fn header_names(header: &[Data]) -> Vec<String> {
    header
        .iter()
        .enumerate()
        .map(|(i, cell)| cell_text(cell).unwrap_or_else(|| format!("column_{}", i + 1)))
        .collect()
}

/// Build a DataFrame from worksheet rows, the first of which is the header
pub(crate) fn cells_to_dataframe(rows: &[&[Data]]) -> Result<DataFrame> {
    let Some((header, body)) = rows.split_first() else {
        return Ok(DataFrame::empty());
    };

    let columns = header_names(header)
        .into_iter()
        .enumerate()
        .map(|(i, name)| {
            let cells: Vec<&Data> = body
                .iter()
                .map(|row| row.get(i).unwrap_or(&Data::Empty))
                .collect();
            build_column(&name, &cells)
        })
        .collect::<Result<Vec<Column>>>()?;

    Ok(DataFrame::new(columns)?)
}

fn build_column(name: &str, cells: &[&Data]) -> Result<Column> {
    let column = match column_kind(cells) {
        CellKind::Int => {
            let values: Vec<Option<i64>> = cells.iter().map(|c| cell_int(c)).collect();
            Column::new(name.into(), values)
        }
        CellKind::Float => {
            let values: Vec<Option<f64>> = cells.iter().map(|c| cell_float(c)).collect();
            Column::new(name.into(), values)
        }
        CellKind::DateTime => {
            let ticks: Vec<Option<i64>> = cells
                .iter()
                .map(|c| cell_datetime(c).map(|dt| dt.and_utc().timestamp_millis()))
                .collect();
            Column::new(name.into(), ticks)
                .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?
        }
        CellKind::Text => {
            let values: Vec<Option<String>> = cells.iter().map(|c| cell_text(c)).collect();
            Column::new(name.into(), values)
        }
    };
    Ok(column)
}

/// Narrowest kind shared by every non-empty cell; all-empty columns are text
fn column_kind(cells: &[&Data]) -> CellKind {
    let mut kind: Option<CellKind> = None;

    for &cell in cells {
        let cell_kind = match cell {
            Data::Empty => continue,
            Data::Int(_) => CellKind::Int,
            Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => CellKind::Int,
            Data::Float(_) => CellKind::Float,
            Data::DateTime(_) | Data::DateTimeIso(_) if cell_datetime(cell).is_some() => {
                CellKind::DateTime
            }
            _ => return CellKind::Text,
        };

        kind = match (kind, cell_kind) {
            (None, k) => Some(k),
            (Some(a), b) if a == b => Some(a),
            (Some(CellKind::Int), CellKind::Float) | (Some(CellKind::Float), CellKind::Int) => {
                Some(CellKind::Float)
            }
            _ => return CellKind::Text,
        };
    }

    kind.unwrap_or(CellKind::Text)
}

fn cell_int(cell: &Data) -> Option<i64> {
    match cell {
        Data::Int(i) => Some(*i),
        Data::Float(f) => Some(*f as i64),
        _ => None,
    }
}

fn cell_float(cell: &Data) -> Option<f64> {
    match cell {
        Data::Int(i) => Some(*i as f64),
        Data::Float(f) => Some(*f),
        _ => None,
    }
}

fn cell_datetime(cell: &Data) -> Option<NaiveDateTime> {
    match cell {
        Data::DateTime(dt) => dt.as_datetime(),
        Data::DateTimeIso(raw) => raw.parse::<NaiveDateTime>().ok(),
        _ => None,
    }
}

fn cell_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty => None,
        Data::String(s) => Some(s.clone()),
        Data::Int(i) => Some(i.to_string()),
        // Whole numbers keep the identifier look they have in the sheet
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            Some((*f as i64).to_string())
        }
        Data::Float(f) => Some(f.to_string()),
        Data::Bool(b) => Some(b.to_string()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(parsed) => Some(parsed.format(TEXT_DATETIME_FORMAT).to_string()),
            None => Some(dt.as_f64().to_string()),
        },
        Data::DateTimeIso(raw) | Data::DurationIso(raw) => Some(raw.clone()),
        Data::Error(e) => Some(e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};
    use chrono::NaiveDate;

    fn text(s: &str) -> Data {
        Data::String(s.to_string())
    }

    fn excel_date(serial: f64) -> Data {
        Data::DateTime(ExcelDateTime::new(serial, ExcelDateTimeType::DateTime, false))
    }

    #[test]
    fn test_order_sheet_columns_get_typed() {
        let header = [
            text("CustomerID"),
            text("OrderNumber"),
            text("DateOfOrder"),
            text("ValueOfOrder"),
        ];
        let first = [text("A"), Data::Float(1.0), excel_date(45292.0), Data::Float(100.5)];
        let second = [Data::Float(17.0), Data::Float(2.0), excel_date(45296.5), Data::Int(50)];
        let rows: Vec<&[Data]> = vec![&header, &first, &second];

        let df = cells_to_dataframe(&rows).unwrap();

        assert_eq!(df.shape(), (2, 4));
        assert_eq!(df.column("CustomerID").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("OrderNumber").unwrap().dtype(), &DataType::Int64);
        assert_eq!(
            df.column("DateOfOrder").unwrap().dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );
        assert_eq!(df.column("ValueOfOrder").unwrap().dtype(), &DataType::Float64);

        let ids: Vec<Option<&str>> =
            df.column("CustomerID").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(ids, vec![Some("A"), Some("17")]);
    }

    #[test]
    fn test_excel_serial_dates() {
        let midnight = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let noon = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap().and_hms_opt(12, 0, 0).unwrap();

        assert_eq!(cell_datetime(&excel_date(45292.0)), Some(midnight));
        assert_eq!(cell_datetime(&excel_date(45296.5)), Some(noon));
        assert_eq!(cell_text(&excel_date(45292.0)).as_deref(), Some("2024-01-01 00:00:00"));
    }

    #[test]
    fn test_mixed_column_falls_back_to_text() {
        let cells = [Data::Float(10.0), text("n/a"), Data::Empty];
        let refs: Vec<&Data> = cells.iter().collect();
        assert_eq!(column_kind(&refs), CellKind::Text);

        let cells = [Data::Float(10.0), Data::Float(2.5), Data::Empty];
        let refs: Vec<&Data> = cells.iter().collect();
        assert_eq!(column_kind(&refs), CellKind::Float);

        let cells = [Data::Empty, Data::Empty];
        let refs: Vec<&Data> = cells.iter().collect();
        assert_eq!(column_kind(&refs), CellKind::Text);
    }

    #[test]
    fn test_blank_header_and_empty_cells() {
        let header = [text("CustomerID"), Data::Empty];
        let first = [text("A"), Data::Empty];
        let second = [Data::Empty, Data::Float(3.0)];
        let rows: Vec<&[Data]> = vec![&header, &first, &second];

        let df = cells_to_dataframe(&rows).unwrap();

        assert_eq!(df.get_column_names_str(), vec!["CustomerID", "column_2"]);
        assert_eq!(df.column("CustomerID").unwrap().null_count(), 1);
        assert_eq!(df.column("column_2").unwrap().null_count(), 1);
    }

    #[test]
    fn test_header_only_sheet() {
        let header = [text("CustomerID")];
        let rows: Vec<&[Data]> = vec![&header];

        let df = cells_to_dataframe(&rows).unwrap();
        assert_eq!(df.shape(), (0, 1));
    }
}
