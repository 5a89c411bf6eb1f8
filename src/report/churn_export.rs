//! Downloadable churn report (`churn_report.csv`)

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::pipeline::ChurnReport;

/// File name of the exported report
pub const CHURN_REPORT_FILE_NAME: &str = "churn_report.csv";

/// MIME type of the exported report
pub const CHURN_REPORT_MIME: &str = "text/csv";

pub const CATEGORY_HEADER: &str = "RFM_Category";
pub const CUSTOMER_IDS_HEADER: &str = "CustomerIDs";

/// Render a list of identifiers as `[id1, id2, ...]`
pub fn format_customer_ids(ids: &[String]) -> String {
    format!("[{}]", ids.join(", "))
}

/// One row per non-empty category, in report order
pub fn churn_report_frame(report: &ChurnReport) -> Result<DataFrame> {
    let (categories, ids): (Vec<&str>, Vec<String>) = report
        .iter()
        .map(|(category, ids)| (category.label(), format_customer_ids(ids)))
        .unzip();

    DataFrame::new(vec![
        Column::new(CATEGORY_HEADER.into(), categories),
        Column::new(CUSTOMER_IDS_HEADER.into(), ids),
    ])
    .context("Failed to build churn report table")
}

/// Render the report as CSV text
pub fn render_churn_report_csv(report: &ChurnReport) -> Result<String> {
    let mut df = churn_report_frame(report)?;
    let mut buffer: Vec<u8> = Vec::new();
    CsvWriter::new(&mut buffer)
        .finish(&mut df)
        .context("Failed to serialize churn report to CSV")?;

    String::from_utf8(buffer).context("Churn report CSV is not valid UTF-8")
}

/// Write `churn_report.csv` into `output_dir` and return its path
pub fn write_churn_report(report: &ChurnReport, output_dir: &Path) -> Result<PathBuf> {
    let path = output_dir.join(CHURN_REPORT_FILE_NAME);
    let csv = render_churn_report_csv(report)?;

    std::fs::write(&path, csv)
        .with_context(|| format!("Failed to write churn report to {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        mime = CHURN_REPORT_MIME,
        categories = report.len(),
        "Wrote churn report"
    );

    Ok(path)
}
