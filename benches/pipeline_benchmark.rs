//! Benchmark of the RFM pipeline stages over growing order histories
//!
//! Run with: cargo bench --bench pipeline_benchmark

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use polars::prelude::*;
use rand::prelude::*;
use rand::SeedableRng;

use rfm_churn::pipeline::{compute_rfm, discretize, parse_orders, run_pipeline, OrderRecord};

/// Generate synthetic orders: skewed order counts and values per customer
fn generate_orders(n_customers: usize, seed: u64) -> Vec<OrderRecord> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2023, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid start date");

    let mut orders = Vec::new();
    for c in 0..n_customers {
        // Right-skewed order counts, most customers buy once or twice
        let u = rng.gen::<f64>();
        let n_orders = 1 + (u * u * u * 20.0) as usize;
        for k in 0..n_orders {
            orders.push(OrderRecord::new(
                format!("C{}", c),
                format!("{}-{}", c, k),
                start + Duration::days(rng.gen_range(0..730)),
                (rng.gen::<f64>().powi(2) * 1000.0 * 100.0).round() / 100.0,
            ));
        }
    }
    orders
}

/// Render orders as the uploaded table with text dates
fn orders_frame(orders: &[OrderRecord]) -> DataFrame {
    let ids: Vec<&str> = orders.iter().map(|o| o.customer_id.as_str()).collect();
    let numbers: Vec<&str> = orders.iter().map(|o| o.order_number.as_str()).collect();
    let dates: Vec<String> = orders
        .iter()
        .map(|o| o.order_date.format("%Y-%m-%d").to_string())
        .collect();
    let values: Vec<f64> = orders.iter().map(|o| o.order_value).collect();

    DataFrame::new(vec![
        Column::new("CustomerID".into(), ids),
        Column::new("OrderNumber".into(), numbers),
        Column::new("DateOfOrder".into(), dates),
        Column::new("ValueOfOrder".into(), values),
    ])
    .expect("Failed to create DataFrame")
}

/// Benchmark each stage for varying customer counts
fn benchmark_stages(c: &mut Criterion) {
    let mut group = c.benchmark_group("rfm_stages");
    group.sample_size(20);

    for n_customers in [1_000, 10_000, 50_000] {
        let orders = generate_orders(n_customers, 42);
        let rfm = compute_rfm(&orders).expect("non-empty orders");

        group.throughput(Throughput::Elements(orders.len() as u64));

        group.bench_with_input(
            BenchmarkId::new("aggregate", n_customers),
            &orders,
            |b, orders| b.iter(|| compute_rfm(black_box(orders))),
        );

        group.bench_with_input(
            BenchmarkId::new("discretize", n_customers),
            &rfm,
            |b, rfm| b.iter(|| discretize(black_box(rfm))),
        );

        group.bench_with_input(
            BenchmarkId::new("full_pipeline", n_customers),
            &orders,
            |b, orders| b.iter(|| run_pipeline(black_box(orders))),
        );
    }

    group.finish();
}

/// Benchmark coercion of an uploaded table into order records
fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_orders");
    group.sample_size(20);

    for n_customers in [1_000, 10_000] {
        let df = orders_frame(&generate_orders(n_customers, 7));
        group.throughput(Throughput::Elements(df.height() as u64));

        group.bench_with_input(BenchmarkId::new("text_dates", n_customers), &df, |b, df| {
            b.iter(|| parse_orders(black_box(df), None))
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_stages, benchmark_parse);
criterion_main!(benches);
