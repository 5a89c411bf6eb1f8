//! Order records and validation of the uploaded table
//!
//! The loader hands over an untyped polars `DataFrame`. This module checks
//! that the four required columns exist and coerces every row into an
//! [`OrderRecord`], so the rest of the pipeline never touches columns by name.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use polars::prelude::*;

use super::error::ValidationError;

pub const CUSTOMER_ID_COLUMN: &str = "CustomerID";
pub const ORDER_NUMBER_COLUMN: &str = "OrderNumber";
pub const ORDER_DATE_COLUMN: &str = "DateOfOrder";
pub const ORDER_VALUE_COLUMN: &str = "ValueOfOrder";

/// Columns every uploaded dataset must provide.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    CUSTOMER_ID_COLUMN,
    ORDER_NUMBER_COLUMN,
    ORDER_DATE_COLUMN,
    ORDER_VALUE_COLUMN,
];

/// Date-time layouts tried, in order, for text dates
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Date-only layouts tried, in order, for text dates
const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y"];

/// A single order row.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub customer_id: String,
    pub order_number: String,
    pub order_date: NaiveDateTime,
    pub order_value: f64,
}

impl OrderRecord {
    pub fn new(
        customer_id: impl Into<String>,
        order_number: impl Into<String>,
        order_date: NaiveDateTime,
        order_value: f64,
    ) -> Self {
        Self {
            customer_id: customer_id.into(),
            order_number: order_number.into(),
            order_date,
            order_value,
        }
    }
}

/// Check a list of column names against [`REQUIRED_COLUMNS`].
///
/// Works on names alone, so a file schema can be checked before the data
/// is read.
pub fn check_required_columns(available: &[String]) -> Result<(), ValidationError> {
    match REQUIRED_COLUMNS
        .iter()
        .find(|required| !available.iter().any(|name| name == *required))
    {
        Some(missing) => Err(ValidationError::MissingColumn {
            column: missing.to_string(),
            available: available.to_vec(),
        }),
        None => Ok(()),
    }
}

/// Check that every required column is present.
///
/// Extra columns (such as `Name`) are allowed and ignored.
pub fn validate_required_columns(df: &DataFrame) -> Result<(), ValidationError> {
    let available: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .collect();

    check_required_columns(&available)?;

    let ignored: Vec<&String> = available
        .iter()
        .filter(|name| !REQUIRED_COLUMNS.contains(&name.as_str()))
        .collect();
    if !ignored.is_empty() {
        tracing::debug!(columns = ?ignored, "Ignoring columns not used by the pipeline");
    }

    Ok(())
}

/// Convert a loaded table into typed order records.
///
/// # Arguments
/// * `df` - The uploaded dataset
/// * `date_format` - Optional chrono format tried before the built-in layouts
///   for text dates
///
/// # Errors
/// Returns a [`ValidationError`] naming the column (and row, where relevant)
/// of the first value that cannot be coerced.
pub fn parse_orders(
    df: &DataFrame,
    date_format: Option<&str>,
) -> Result<Vec<OrderRecord>, ValidationError> {
    validate_required_columns(df)?;

    if df.height() == 0 {
        return Err(ValidationError::EmptyDataset);
    }

    let customer_ids = read_identifiers(df, CUSTOMER_ID_COLUMN)?;
    let order_numbers = read_identifiers(df, ORDER_NUMBER_COLUMN)?;
    let order_dates = read_order_dates(df, date_format)?;
    let order_values = read_order_values(df)?;

    let records: Vec<OrderRecord> = customer_ids
        .into_iter()
        .zip(order_numbers)
        .zip(order_dates)
        .zip(order_values)
        .map(|(((customer_id, order_number), order_date), order_value)| OrderRecord {
            customer_id,
            order_number,
            order_date,
            order_value,
        })
        .collect();

    tracing::info!(orders = records.len(), "Parsed order records");

    Ok(records)
}

fn frame_error(column: &str) -> impl Fn(PolarsError) -> ValidationError + '_ {
    move |e| ValidationError::DataFrame {
        column: column.to_string(),
        message: e.to_string(),
    }
}

fn get_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, ValidationError> {
    df.column(name).map_err(frame_error(name))
}

/// Read an identifier column of any type as text
fn read_identifiers(df: &DataFrame, name: &str) -> Result<Vec<String>, ValidationError> {
    let column = get_column(df, name)?
        .cast(&DataType::String)
        .map_err(frame_error(name))?;
    let values = column.str().map_err(frame_error(name))?;

    values
        .into_iter()
        .enumerate()
        .map(|(idx, value)| match value {
            Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
            _ => Err(ValidationError::NullValue {
                column: name.to_string(),
                row: idx + 1,
            }),
        })
        .collect()
}

fn read_order_dates(
    df: &DataFrame,
    date_format: Option<&str>,
) -> Result<Vec<NaiveDateTime>, ValidationError> {
    let name = ORDER_DATE_COLUMN;
    let column = get_column(df, name)?;
    let null_error = |row: usize| ValidationError::NullValue {
        column: name.to_string(),
        row,
    };

    match column.dtype() {
        DataType::String => {
            let values = column.str().map_err(frame_error(name))?;
            values
                .into_iter()
                .enumerate()
                .map(|(idx, value)| {
                    let raw = value.ok_or_else(|| null_error(idx + 1))?;
                    parse_order_date(raw, date_format).ok_or_else(|| ValidationError::InvalidDate {
                        column: name.to_string(),
                        row: idx + 1,
                        value: raw.to_string(),
                    })
                })
                .collect()
        }
        DataType::Date => {
            let days = column.cast(&DataType::Int32).map_err(frame_error(name))?;
            let values = days.i32().map_err(frame_error(name))?;
            values
                .into_iter()
                .enumerate()
                .map(|(idx, value)| {
                    let days = value.ok_or_else(|| null_error(idx + 1))?;
                    date_from_epoch_days(days).ok_or_else(|| ValidationError::InvalidDate {
                        column: name.to_string(),
                        row: idx + 1,
                        value: days.to_string(),
                    })
                })
                .collect()
        }
        DataType::Datetime(unit, _) => {
            let per_second = match unit {
                TimeUnit::Nanoseconds => 1_000_000_000,
                TimeUnit::Microseconds => 1_000_000,
                TimeUnit::Milliseconds => 1_000,
            };
            let ticks = column.cast(&DataType::Int64).map_err(frame_error(name))?;
            let values = ticks.i64().map_err(frame_error(name))?;
            values
                .into_iter()
                .enumerate()
                .map(|(idx, value)| {
                    let ticks = value.ok_or_else(|| null_error(idx + 1))?;
                    datetime_from_ticks(ticks, per_second).ok_or_else(|| {
                        ValidationError::InvalidDate {
                            column: name.to_string(),
                            row: idx + 1,
                            value: ticks.to_string(),
                        }
                    })
                })
                .collect()
        }
        other => Err(ValidationError::UnsupportedType {
            column: name.to_string(),
            dtype: other.to_string(),
        }),
    }
}

fn read_order_values(df: &DataFrame) -> Result<Vec<f64>, ValidationError> {
    let name = ORDER_VALUE_COLUMN;
    let column = get_column(df, name)?;

    let invalid = |row: usize, value: String| ValidationError::InvalidValue {
        column: name.to_string(),
        row,
        value,
    };
    let check = |row: usize, value: f64| {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(invalid(row, value.to_string()))
        }
    };

    if column.dtype() == &DataType::String {
        let values = column.str().map_err(frame_error(name))?;
        values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| {
                let raw = value.ok_or(ValidationError::NullValue {
                    column: name.to_string(),
                    row: idx + 1,
                })?;
                let parsed: f64 = raw
                    .trim()
                    .parse()
                    .map_err(|_| invalid(idx + 1, raw.to_string()))?;
                check(idx + 1, parsed)
            })
            .collect()
    } else if column.dtype().is_primitive_numeric() {
        let floats = column.cast(&DataType::Float64).map_err(frame_error(name))?;
        let values = floats.f64().map_err(frame_error(name))?;
        values
            .into_iter()
            .enumerate()
            .map(|(idx, value)| {
                let v = value.ok_or(ValidationError::NullValue {
                    column: name.to_string(),
                    row: idx + 1,
                })?;
                check(idx + 1, v)
            })
            .collect()
    } else {
        Err(ValidationError::UnsupportedType {
            column: name.to_string(),
            dtype: column.dtype().to_string(),
        })
    }
}

/// Parse a text order date.
///
/// The user-supplied format wins; otherwise RFC 3339 and a fixed list of
/// common layouts are tried. Date-only values are placed at midnight.
pub fn parse_order_date(raw: &str, date_format: Option<&str>) -> Option<NaiveDateTime> {
    let raw = raw.trim();

    if let Some(fmt) = date_format {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
        if let Ok(d) = NaiveDate::parse_from_str(raw, fmt) {
            return d.and_hms_opt(0, 0, 0);
        }
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

fn date_from_epoch_days(days: i32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(1970, 1, 1)?
        .checked_add_signed(Duration::days(days as i64))?
        .and_hms_opt(0, 0, 0)
}

fn datetime_from_ticks(ticks: i64, per_second: i64) -> Option<NaiveDateTime> {
    let secs = ticks.div_euclid(per_second);
    let nanos = ticks.rem_euclid(per_second) * (1_000_000_000 / per_second);
    DateTime::from_timestamp(secs, nanos as u32).map(|dt| dt.naive_utc())
}
