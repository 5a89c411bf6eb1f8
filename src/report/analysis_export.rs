//! Full analysis export as JSON

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{
    BinnedCustomer, CorrelationMatrix, DegenerateBinning, RfmAnalysis, RfmCategory, NUM_BINS,
};

/// File name of the JSON export
pub const ANALYSIS_FILE_NAME: &str = "rfm_analysis.json";

/// Metadata about the analysis run
#[derive(Serialize)]
pub struct AnalysisMetadata {
    /// Timestamp of the analysis (ISO 8601 format)
    pub timestamp: String,
    pub tool_version: String,
    pub input_file: String,
    pub bins_per_metric: usize,
}

/// Summary statistics of the analysis
#[derive(Serialize)]
pub struct AnalysisSummary {
    pub orders: usize,
    pub customers: usize,
    pub churn_rate: f64,
    pub category_counts: BTreeMap<RfmCategory, usize>,
}

/// Complete analysis export
#[derive(Serialize)]
pub struct RfmAnalysisExport<'a> {
    pub metadata: AnalysisMetadata,
    pub summary: AnalysisSummary,
    pub correlation: &'a CorrelationMatrix,
    pub degenerate_binning: &'a [DegenerateBinning],
    pub customers: &'a [BinnedCustomer],
}

impl<'a> RfmAnalysisExport<'a> {
    pub fn new(analysis: &'a RfmAnalysis, input_file: &str, orders: usize) -> Self {
        Self {
            metadata: AnalysisMetadata {
                timestamp: Utc::now().to_rfc3339(),
                tool_version: env!("CARGO_PKG_VERSION").to_string(),
                input_file: input_file.to_string(),
                bins_per_metric: NUM_BINS,
            },
            summary: AnalysisSummary {
                orders,
                customers: analysis.customer_count(),
                churn_rate: analysis.churn_rate,
                category_counts: analysis.category_counts.clone(),
            },
            correlation: &analysis.correlation,
            degenerate_binning: &analysis.degenerate,
            customers: &analysis.customers,
        }
    }
}

/// Write the analysis to `output_dir/rfm_analysis.json` and return its path
pub fn export_analysis_json(
    analysis: &RfmAnalysis,
    input_file: &str,
    orders: usize,
    output_dir: &Path,
) -> Result<PathBuf> {
    let export = RfmAnalysisExport::new(analysis, input_file, orders);
    let json =
        serde_json::to_string_pretty(&export).context("Failed to serialize analysis to JSON")?;

    let path = output_dir.join(ANALYSIS_FILE_NAME);
    std::fs::write(&path, json)
        .with_context(|| format!("Failed to write analysis to {}", path.display()))?;

    Ok(path)
}
