//! Dataset loader for CSV, Parquet and Excel order files

use anyhow::{Context, Result};
use polars::prelude::*;
use std::path::Path;

use super::excel::{excel_column_names, read_excel};
use crate::utils::{finish_step, spin, StepOutcome};

/// Supported input formats, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Parquet,
    /// First worksheet of an xlsx, xlsm or xls workbook
    Excel,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match extension.as_str() {
            "csv" => Ok(InputFormat::Csv),
            "parquet" => Ok(InputFormat::Parquet),
            "xlsx" | "xlsm" | "xls" => Ok(InputFormat::Excel),
            _ => anyhow::bail!(
                "Unsupported file format: '{}'. Supported formats: csv, parquet, xlsx, xlsm, xls",
                extension
            ),
        }
    }
}

fn scan(path: &Path, infer_schema_length: usize) -> Result<LazyFrame> {
    // 0 means full table scan
    let schema_length = if infer_schema_length == 0 {
        None
    } else {
        Some(infer_schema_length)
    };

    let lf = match InputFormat::from_path(path)? {
        InputFormat::Csv => LazyCsvReader::new(path)
            .with_infer_schema_length(schema_length)
            .finish()
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        InputFormat::Parquet => LazyFrame::scan_parquet(path, Default::default())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        // Workbooks have no lazy reader; the sheet is read whole
        InputFormat::Excel => read_excel(path)?.lazy(),
    };

    Ok(lf)
}

/// Load an order file into memory.
pub fn load_dataset(path: &Path, infer_schema_length: usize) -> Result<DataFrame> {
    if !path.exists() {
        anyhow::bail!("Input file not found: {}", path.display());
    }

    let df = scan(path, infer_schema_length)?
        .collect()
        .with_context(|| format!("Failed to read dataset: {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Loaded dataset"
    );

    Ok(df)
}

/// Load an order file behind a spinner.
///
/// Returns the DataFrame with its row count, column count and estimated
/// memory footprint in MB.
pub fn load_dataset_with_progress(
    path: &Path,
    infer_schema_length: usize,
) -> Result<(DataFrame, usize, usize, f64)> {
    let (spinner, df) = spin(&format!("Reading {}...", path.display()), || {
        load_dataset(path, infer_schema_length)
    })?;
    finish_step(&spinner, StepOutcome::Done, "Dataset read");

    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);

    Ok((df, rows, cols, memory_mb))
}

/// Read only the column names of an order file
pub fn get_column_names(path: &Path) -> Result<Vec<String>> {
    if InputFormat::from_path(path)? == InputFormat::Excel {
        return excel_column_names(path);
    }

    let schema = scan(path, 100)?
        .collect_schema()
        .with_context(|| format!("Failed to read schema: {}", path.display()))?;

    Ok(schema.iter_names().map(|s| s.to_string()).collect())
}
