//! Tests for the churn report export and the written artifacts

use polars::prelude::*;
use rfm_churn::pipeline::*;
use rfm_churn::report::*;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

use common::*;

#[test]
fn test_two_category_export() {
    let report: ChurnReport = vec![
        (RfmCategory::Churn, vec!["C1".to_string(), "C2".to_string()]),
        (RfmCategory::Best, vec!["C3".to_string()]),
    ]
    .into_iter()
    .collect();
    let temp_dir = TempDir::new().unwrap();

    let path = write_churn_report(&report, temp_dir.path()).unwrap();
    assert_eq!(path.file_name().unwrap(), CHURN_REPORT_FILE_NAME);

    let df = CsvReadOptions::default()
        .try_into_reader_with_file_path(Some(path))
        .unwrap()
        .finish()
        .unwrap();

    assert_eq!(df.height(), 2);
    assert_has_columns(&df, &[CATEGORY_HEADER, CUSTOMER_IDS_HEADER]);

    let categories: Vec<Option<&str>> =
        df.column(CATEGORY_HEADER).unwrap().str().unwrap().into_iter().collect();
    let ids: Vec<Option<&str>> =
        df.column(CUSTOMER_IDS_HEADER).unwrap().str().unwrap().into_iter().collect();
    assert_eq!(categories, vec![Some("Churn"), Some("Best")]);
    assert_eq!(ids, vec![Some("[C1, C2]"), Some("[C3]")]);
}

#[test]
fn test_export_follows_category_order() {
    let analysis = run_pipeline(&random_orders(80, 13)).unwrap();
    let csv = render_churn_report_csv(&analysis.report).unwrap();

    let labels: Vec<&str> = csv
        .lines()
        .skip(1)
        .map(|line| line.split(',').next().unwrap())
        .collect();
    let expected: Vec<&str> = analysis.report.iter().map(|(c, _)| c.label()).collect();

    assert_eq!(labels, expected);
    let mut sorted = labels.clone();
    sorted.sort_by_key(|label| label.parse::<RfmCategory>().unwrap());
    assert_eq!(labels, sorted);
}

#[test]
fn test_bundle_of_run_artifacts() {
    let analysis = run_pipeline(&random_orders(30, 1)).unwrap();
    let temp_dir = TempDir::new().unwrap();

    let mut files = vec![write_churn_report(&analysis.report, temp_dir.path()).unwrap()];
    files.push(export_analysis_json(&analysis, "orders.csv", 0, temp_dir.path()).unwrap());
    files.extend(render_charts(&analysis, temp_dir.path()).unwrap());

    let zip_path = bundle_reports(&files, temp_dir.path()).unwrap();
    let archive = ::zip::ZipArchive::new(std::fs::File::open(zip_path).unwrap()).unwrap();

    assert_eq!(archive.len(), files.len());
    assert!(archive.file_names().any(|name| name == CHURN_REPORT_FILE_NAME));
    assert!(archive.file_names().any(|name| name == ANALYSIS_FILE_NAME));
}

#[test]
fn test_high_scores_export_as_uncategorized_row() {
    // Customer Ci places i orders of 10.0 on day i, so F, M and recency
    // spread evenly over ten customers and C5..C10 score above 5
    let orders: Vec<OrderRecord> = (1..=10u32)
        .flat_map(|i| {
            (0..i).map(move |k| OrderRecord::new(format!("C{i}"), format!("{i}-{k}"), day(i), 10.0))
        })
        .collect();

    let analysis = run_pipeline(&orders).unwrap();

    assert_eq!(analysis.category_counts[&RfmCategory::Uncategorized], 6);
    assert_eq!(
        analysis.report.get(RfmCategory::Uncategorized).unwrap(),
        &["C5", "C6", "C7", "C8", "C9", "C10"].map(String::from)
    );

    let csv = render_churn_report_csv(&analysis.report).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines,
        vec![
            "RFM_Category,CustomerIDs",
            "Best,\"[C1, C2, C3, C4]\"",
            "Uncategorized,\"[C5, C6, C7, C8, C9, C10]\"",
        ]
    );
}
