//! RFM Churn: churn-risk segmentation library
//!
//! Aggregates order history into per-customer Recency, Frequency and
//! Monetary metrics, bins each metric into quantiles, and groups customers
//! into churn categories from the summed bin indices.

pub mod cli;
pub mod pipeline;
pub mod report;
pub mod utils;
