//! Command-line argument definitions using clap

use chrono::format::{Item, StrftimeItems};
use clap::{ArgAction, Parser};
use std::path::{Path, PathBuf};

/// RFM Churn - Segment customers by churn risk from their order history
#[derive(Parser, Debug)]
#[command(name = "rfm-churn")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Input order file (CSV, Parquet or Excel) with columns
    /// CustomerID, OrderNumber, DateOfOrder and ValueOfOrder
    #[arg(short, long)]
    pub input: PathBuf,

    /// Directory for churn_report.csv, charts and exports.
    /// Defaults to the directory of the input file.
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// strftime format of DateOfOrder (e.g. "%d/%m/%Y").
    /// When omitted, ISO dates and a few common layouts are recognised.
    #[arg(long, value_parser = validate_date_format)]
    pub date_format: Option<String>,

    /// Skip rendering the SVG charts
    #[arg(long, default_value = "false")]
    pub no_charts: bool,

    /// Also write the full analysis as rfm_analysis.json
    #[arg(long, default_value = "false")]
    pub json: bool,

    /// Package every written file into rfm_churn_reports.zip
    #[arg(long, default_value = "false")]
    pub bundle: bool,

    /// Replace existing reports without asking
    #[arg(long, default_value = "false")]
    pub no_confirm: bool,

    /// Number of rows to use for schema inference (CSV only).
    /// Use 0 for full table scan.
    #[arg(long, default_value = "10000")]
    pub infer_schema_length: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Output directory, falling back to the input's directory
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| {
            self.input
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."))
                .to_path_buf()
        })
    }

    /// Whether charts should be rendered
    pub fn charts(&self) -> bool {
        !self.no_charts
    }
}

/// Validator for the date format parameter
fn validate_date_format(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("date format must not be empty".to_string());
    }
    if StrftimeItems::new(s).any(|item| matches!(item, Item::Error)) {
        return Err(format!("'{}' is not a valid strftime format", s));
    }
    Ok(s.to_string())
}
