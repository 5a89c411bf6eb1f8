//! Churn segmentation: scoring, categorisation and report assembly
//!
//! [`run_pipeline`] is the single entry point used by the CLI. It is a pure
//! function of the order records: aggregate, bin, score, categorise, group.

use std::collections::BTreeMap;

use serde::Serialize;

use super::binning::{discretize, DegenerateBinning, RfmBins};
use super::category::RfmCategory;
use super::correlation::{correlation_matrix, CorrelationMatrix};
use super::error::ValidationError;
use super::orders::OrderRecord;
use super::rfm::{compute_rfm, CustomerRfm};

/// A customer with bin indices, composite score and category
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BinnedCustomer {
    #[serde(flatten)]
    pub rfm: CustomerRfm,
    pub bins: RfmBins,
    pub score: u8,
    pub category: RfmCategory,
}

/// Customer identifiers grouped by churn category.
///
/// Categories iterate in report order (Churn, Average, Loyal, Best,
/// Uncategorized); identifiers keep the order of the binned table.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChurnReport {
    groups: BTreeMap<RfmCategory, Vec<String>>,
}

impl ChurnReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a customer to its category
    pub fn push(&mut self, category: RfmCategory, customer_id: impl Into<String>) {
        self.groups
            .entry(category)
            .or_default()
            .push(customer_id.into());
    }

    pub fn get(&self, category: RfmCategory) -> Option<&[String]> {
        self.groups.get(&category).map(|ids| ids.as_slice())
    }

    /// Non-empty categories with their customers, in report order
    pub fn iter(&self) -> impl Iterator<Item = (RfmCategory, &[String])> {
        self.groups.iter().map(|(c, ids)| (*c, ids.as_slice()))
    }

    /// Number of non-empty categories
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

impl FromIterator<(RfmCategory, Vec<String>)> for ChurnReport {
    fn from_iter<I: IntoIterator<Item = (RfmCategory, Vec<String>)>>(iter: I) -> Self {
        let mut report = ChurnReport::new();
        for (category, ids) in iter {
            for id in ids {
                report.push(category, id);
            }
        }
        report
    }
}

/// Combine RFM rows with their bins into scored, categorised customers
pub fn score_customers(customers: Vec<CustomerRfm>, bins: &[RfmBins]) -> Vec<BinnedCustomer> {
    customers
        .into_iter()
        .zip(bins.iter())
        .map(|(rfm, bins)| {
            let score = bins.score();
            let category = RfmCategory::from_score(score);
            if category == RfmCategory::Uncategorized {
                tracing::debug!(
                    customer = %rfm.customer_id,
                    score,
                    "Score outside every category interval"
                );
            }
            BinnedCustomer {
                rfm,
                bins: *bins,
                score,
                category,
            }
        })
        .collect()
}

/// Group customer identifiers by category
pub fn build_churn_report(customers: &[BinnedCustomer]) -> ChurnReport {
    let mut report = ChurnReport::new();
    for customer in customers {
        report.push(customer.category, customer.rfm.customer_id.clone());
    }
    report
}

/// Number of customers per category, zero for absent categories
pub fn category_counts(customers: &[BinnedCustomer]) -> BTreeMap<RfmCategory, usize> {
    let mut counts: BTreeMap<RfmCategory, usize> =
        RfmCategory::ALL.iter().map(|c| (*c, 0)).collect();
    for customer in customers {
        *counts.entry(customer.category).or_insert(0) += 1;
    }
    counts
}

/// Percentage of customers in the Churn category (0.0 for an empty table)
pub fn churn_rate(customers: &[BinnedCustomer]) -> f64 {
    if customers.is_empty() {
        return 0.0;
    }
    let churned = customers
        .iter()
        .filter(|c| c.category == RfmCategory::Churn)
        .count();
    churned as f64 / customers.len() as f64 * 100.0
}

/// Everything derived from one upload
#[derive(Debug, Clone, Serialize)]
pub struct RfmAnalysis {
    pub customers: Vec<BinnedCustomer>,
    pub report: ChurnReport,
    pub degenerate: Vec<DegenerateBinning>,
    pub category_counts: BTreeMap<RfmCategory, usize>,
    pub churn_rate: f64,
    pub correlation: CorrelationMatrix,
}

impl RfmAnalysis {
    pub fn customer_count(&self) -> usize {
        self.customers.len()
    }
}

/// Run the full RFM pipeline over validated order records.
///
/// # Errors
/// Returns [`ValidationError::EmptyDataset`] when there are no orders.
/// Degenerate binning and uncategorised scores are not errors; they are
/// recorded in the result.
pub fn run_pipeline(orders: &[OrderRecord]) -> Result<RfmAnalysis, ValidationError> {
    let rfm = compute_rfm(orders)?;
    let correlation = correlation_matrix(&rfm);

    let (bins, degenerate) = discretize(&rfm);
    let customers = score_customers(rfm, &bins);

    let report = build_churn_report(&customers);
    let category_counts = category_counts(&customers);
    let churn_rate = churn_rate(&customers);

    tracing::info!(
        customers = customers.len(),
        churn_rate,
        degenerate_metrics = degenerate.len(),
        "RFM pipeline complete"
    );

    Ok(RfmAnalysis {
        customers,
        report,
        degenerate,
        category_counts,
        churn_rate,
        correlation,
    })
}
