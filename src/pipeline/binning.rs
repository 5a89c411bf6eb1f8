//! Equal-frequency (quantile) binning of the RFM metrics
//!
//! Each metric is split independently into [`NUM_BINS`] bins whose edges are
//! the 0/20/40/60/80/100th percentiles of that metric over all customers.
//! Bin indices are ascending by raw value for every metric.
//!
//! Ties and small populations produce repeated percentiles. Repeated edges
//! are collapsed, which merges adjacent bins: a metric with a single
//! distinct value ends up with one bin and every customer gets index 0.

use serde::Serialize;

use super::rfm::{CustomerRfm, RfmMetric};

/// Number of quantile bins per metric
pub const NUM_BINS: usize = 5;

/// Edges closer than this to the previous kept edge are dropped
const EDGE_TOLERANCE: f64 = 1e-8;

/// Fitted quantile edges for one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuantileBins {
    edges: Vec<f64>,
}

impl QuantileBins {
    /// Compute quantile edges for `values` and collapse duplicates.
    pub fn fit(values: &[f64], n_bins: usize) -> Self {
        if values.is_empty() || n_bins == 0 {
            return Self { edges: Vec::new() };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.total_cmp(b));

        let mut edges: Vec<f64> = Vec::with_capacity(n_bins + 1);
        for i in 0..=n_bins {
            let edge = percentile(&sorted, i as f64 / n_bins as f64);
            match edges.last() {
                Some(&last) if edge - last <= EDGE_TOLERANCE => {}
                _ => edges.push(edge),
            }
        }

        Self { edges }
    }

    /// Kept edges, strictly increasing
    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Number of bins left after collapsing duplicate edges (at least 1)
    pub fn n_bins(&self) -> usize {
        self.edges.len().saturating_sub(1).max(1)
    }

    /// Bin index of `value`: the number of interior edges <= value,
    /// clamped to the last bin.
    pub fn assign(&self, value: f64) -> u8 {
        if self.edges.len() < 2 {
            return 0;
        }
        let last = self.edges.len() - 1;
        let interior = &self.edges[1..last];
        let idx = interior.partition_point(|&edge| edge <= value);
        idx.min(self.n_bins() - 1) as u8
    }
}

/// Linear-interpolated percentile of an ascending slice, `q` in [0, 1]
fn percentile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        sorted[lo]
    } else {
        sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
    }
}

/// Bin indices of one customer, one per metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RfmBins {
    pub recency: u8,
    pub frequency: u8,
    pub monetary: u8,
}

impl RfmBins {
    /// Composite RFM score, 0..=12
    pub fn score(&self) -> u8 {
        self.recency + self.frequency + self.monetary
    }

    fn set(&mut self, metric: RfmMetric, bin: u8) {
        match metric {
            RfmMetric::Recency => self.recency = bin,
            RfmMetric::Frequency => self.frequency = bin,
            RfmMetric::Monetary => self.monetary = bin,
        }
    }
}

/// A metric that could not be split into the full number of bins
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DegenerateBinning {
    pub metric: RfmMetric,
    pub distinct_values: usize,
    pub effective_bins: usize,
}

impl std::fmt::Display for DegenerateBinning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} has {} distinct value(s); binned into {} of {} bins",
            self.metric, self.distinct_values, self.effective_bins, NUM_BINS
        )
    }
}

fn count_distinct(values: &[f64]) -> usize {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}

/// Assign quantile bins for all three metrics.
///
/// Returns one [`RfmBins`] per customer (same order as `customers`) and a
/// notice for every metric that fell back to fewer bins or has fewer than
/// [`NUM_BINS`] distinct values. Degenerate metrics never abort the run.
pub fn discretize(customers: &[CustomerRfm]) -> (Vec<RfmBins>, Vec<DegenerateBinning>) {
    let mut bins = vec![RfmBins::default(); customers.len()];
    let mut degenerate = Vec::new();

    for metric in RfmMetric::ALL {
        let values: Vec<f64> = customers.iter().map(|c| c.metric(metric)).collect();
        let fitted = QuantileBins::fit(&values, NUM_BINS);

        let distinct_values = count_distinct(&values);
        let effective_bins = fitted.n_bins();
        if distinct_values < NUM_BINS || effective_bins < NUM_BINS {
            tracing::warn!(
                metric = %metric,
                distinct_values,
                effective_bins,
                "Degenerate quantile binning, adjacent bins collapsed"
            );
            degenerate.push(DegenerateBinning {
                metric,
                distinct_values,
                effective_bins,
            });
        }

        for (slot, value) in bins.iter_mut().zip(values) {
            slot.set(metric, fitted.assign(value));
        }
    }

    (bins, degenerate)
}
