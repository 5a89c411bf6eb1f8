//! Pearson correlation between the raw Recency, Frequency and Monetary values

use faer::Mat;
use serde::Serialize;

use super::rfm::{CustomerRfm, RfmMetric};

/// Square correlation matrix over the three RFM metrics.
///
/// Entries involving a constant metric are NaN, matching the usual
/// convention for an undefined Pearson coefficient.
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub labels: Vec<String>,
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    pub fn get(&self, row: RfmMetric, col: RfmMetric) -> f64 {
        self.values[metric_index(row)][metric_index(col)]
    }
}

fn metric_index(metric: RfmMetric) -> usize {
    RfmMetric::ALL
        .iter()
        .position(|m| *m == metric)
        .unwrap_or_default()
}

/// Standardize a column so that Z^T * Z yields correlations directly.
///
/// Returns None for constant or empty columns.
fn standardize(values: &[f64]) -> Option<Vec<f64>> {
    let n = values.len() as f64;
    if values.is_empty() {
        return None;
    }

    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|x| (x - mean) * (x - mean)).sum::<f64>() / n;
    let std = var.sqrt();
    if std == 0.0 {
        return None;
    }

    let scale = 1.0 / (n.sqrt() * std);
    Some(values.iter().map(|x| (x - mean) * scale).collect())
}

/// Compute the 3x3 correlation matrix of the raw RFM metrics.
///
/// Algorithm:
/// 1. Standardize each metric column: z = (x - mean) / (std * sqrt(n))
/// 2. Stack the non-constant columns into Z (n_customers x k)
/// 3. R = Z^T * Z
pub fn correlation_matrix(customers: &[CustomerRfm]) -> CorrelationMatrix {
    let labels: Vec<String> = RfmMetric::ALL.iter().map(|m| m.to_string()).collect();
    let mut values = vec![vec![f64::NAN; RfmMetric::ALL.len()]; RfmMetric::ALL.len()];

    let valid_cols: Vec<(usize, Vec<f64>)> = RfmMetric::ALL
        .iter()
        .enumerate()
        .filter_map(|(i, metric)| {
            let raw: Vec<f64> = customers.iter().map(|c| c.metric(*metric)).collect();
            standardize(&raw).map(|z| (i, z))
        })
        .collect();

    if valid_cols.is_empty() {
        return CorrelationMatrix { labels, values };
    }

    let n_rows = customers.len();
    let mut z = Mat::<f64>::zeros(n_rows, valid_cols.len());
    for (col_idx, (_, col_data)) in valid_cols.iter().enumerate() {
        for (row_idx, &val) in col_data.iter().enumerate() {
            z[(row_idx, col_idx)] = val;
        }
    }

    let corr = z.transpose() * &z;

    for (a, (i, _)) in valid_cols.iter().enumerate() {
        for (b, (j, _)) in valid_cols.iter().enumerate() {
            values[*i][*j] = corr[(a, b)].clamp(-1.0, 1.0);
        }
    }

    CorrelationMatrix { labels, values }
}
