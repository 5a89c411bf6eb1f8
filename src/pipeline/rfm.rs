//! Per-customer Recency, Frequency and Monetary aggregation

use std::collections::HashMap;

use chrono::NaiveDateTime;
use serde::Serialize;

use super::error::ValidationError;
use super::orders::OrderRecord;

/// The three RFM metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RfmMetric {
    Recency,
    Frequency,
    Monetary,
}

impl RfmMetric {
    pub const ALL: [RfmMetric; 3] = [RfmMetric::Recency, RfmMetric::Frequency, RfmMetric::Monetary];

    pub fn name(&self) -> &'static str {
        match self {
            RfmMetric::Recency => "Recency",
            RfmMetric::Frequency => "Frequency",
            RfmMetric::Monetary => "Monetary",
        }
    }
}

impl std::fmt::Display for RfmMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Aggregated purchase behaviour of one customer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerRfm {
    pub customer_id: String,
    /// Whole days between the customer's last order and the latest order in the dataset
    pub recency: i64,
    /// Number of order rows
    pub frequency: u32,
    /// Sum of order values
    pub monetary: f64,
}

impl CustomerRfm {
    /// Value of the given metric as a float, for binning and correlation
    pub fn metric(&self, metric: RfmMetric) -> f64 {
        match metric {
            RfmMetric::Recency => self.recency as f64,
            RfmMetric::Frequency => self.frequency as f64,
            RfmMetric::Monetary => self.monetary,
        }
    }
}

/// Running totals for a single customer
struct Accumulator {
    last_order: NaiveDateTime,
    orders: u32,
    total_value: f64,
}

/// Aggregate order rows into one RFM row per customer.
///
/// Recency is measured against the latest order date of the whole dataset,
/// so it is never negative and the most recent customer scores 0. Every
/// order row counts towards Frequency, even when order numbers repeat.
///
/// Customers are returned in order of their first appearance in `orders`.
pub fn compute_rfm(orders: &[OrderRecord]) -> Result<Vec<CustomerRfm>, ValidationError> {
    let reference_date = orders
        .iter()
        .map(|o| o.order_date)
        .max()
        .ok_or(ValidationError::EmptyDataset)?;

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut customers: Vec<(&str, Accumulator)> = Vec::new();

    for order in orders {
        match index.get(order.customer_id.as_str()) {
            Some(&pos) => {
                let acc = &mut customers[pos].1;
                acc.last_order = acc.last_order.max(order.order_date);
                acc.orders += 1;
                acc.total_value += order.order_value;
            }
            None => {
                index.insert(order.customer_id.as_str(), customers.len());
                customers.push((
                    order.customer_id.as_str(),
                    Accumulator {
                        last_order: order.order_date,
                        orders: 1,
                        total_value: order.order_value,
                    },
                ));
            }
        }
    }

    let rfm: Vec<CustomerRfm> = customers
        .into_iter()
        .map(|(customer_id, acc)| CustomerRfm {
            customer_id: customer_id.to_string(),
            recency: (reference_date - acc.last_order).num_days(),
            frequency: acc.orders,
            monetary: acc.total_value,
        })
        .collect();

    tracing::debug!(
        customers = rfm.len(),
        reference_date = %reference_date,
        "Computed RFM metrics"
    );

    Ok(rfm)
}
