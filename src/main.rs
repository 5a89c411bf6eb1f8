//! RFM Churn: churn-risk segmentation CLI
//!
//! Reads an order file, scores every customer on Recency, Frequency and
//! Monetary value, groups them into churn categories and writes
//! `churn_report.csv` together with optional charts and exports.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use console::style;

use rfm_churn::cli::{confirm_overwrite, Cli};
use rfm_churn::pipeline::{
    check_required_columns, get_column_names, load_dataset_with_progress, parse_orders,
    run_pipeline,
};
use rfm_churn::report::{
    bundle_reports, chart_file_names, export_analysis_json, render_charts, write_churn_report,
    ChurnSummary, ANALYSIS_FILE_NAME, BUNDLE_FILE_NAME, CHURN_REPORT_FILE_NAME,
};
use rfm_churn::utils::{
    finish_step, init_logging, print_banner, print_completion, print_config, print_count,
    print_info, print_step_header, print_step_time, print_success, print_warning, spin,
    ConfigCard, LogConfig, StepOutcome,
};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_verbosity(cli.verbose))?;

    let input = &cli.input;
    let output_dir = cli.output_dir();
    let date_format = cli.date_format.as_deref();

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&ConfigCard {
        input,
        output_dir: &output_dir,
        date_format,
        charts: cli.charts(),
        json: cli.json,
        bundle: cli.bundle,
    });

    // Fail fast on a wrong layout before reading the whole file
    check_required_columns(&get_column_names(input)?)?;

    // Step 1: Load
    print_step_header(1, "Load Orders");
    let step_start = Instant::now();
    let (df, rows, cols, memory_mb) = load_dataset_with_progress(input, cli.infer_schema_length)?;
    print_success("Dataset loaded");
    println!("\n    {} Dataset Statistics:", style("✧").cyan());
    println!("      Rows: {}", rows);
    println!("      Columns: {}", cols);
    println!("      Estimated memory: {:.2} MB", memory_mb);
    let load_elapsed = step_start.elapsed();
    print_step_time(load_elapsed);

    // Step 2: Validate
    print_step_header(2, "Validate Orders");
    let step_start = Instant::now();
    let (spinner, orders) = spin("Checking columns and parsing order rows...", || {
        parse_orders(&df, date_format)
    })?;
    finish_step(&spinner, StepOutcome::Done, "Order rows validated");
    print_count("order rows", orders.len(), None);
    print_step_time(step_start.elapsed());

    // Step 3: Analyse
    print_step_header(3, "RFM Analysis");
    let step_start = Instant::now();
    let (spinner, analysis) = spin("Aggregating, binning and categorising customers...", || {
        run_pipeline(&orders)
    })?;
    if analysis.degenerate.is_empty() {
        finish_step(&spinner, StepOutcome::Done, "Customers categorised");
    } else {
        finish_step(
            &spinner,
            StepOutcome::Degraded,
            "Customers categorised with collapsed bins",
        );
    }
    print_count(
        "customers",
        analysis.customer_count(),
        Some(format!("in {} categories", analysis.report.len()).as_str()),
    );
    let analysis_elapsed = step_start.elapsed();
    print_step_time(analysis_elapsed);

    // Step 4: Summary
    print_step_header(4, "Summary");
    let mut summary = ChurnSummary::new(orders.len(), &analysis);
    summary.set_load_time(load_elapsed);
    summary.set_analysis_time(analysis_elapsed);
    summary.display();

    // Step 5: Save
    print_step_header(5, "Save Reports");
    let step_start = Instant::now();
    std::fs::create_dir_all(&output_dir)?;

    let mut planned = vec![CHURN_REPORT_FILE_NAME.to_string()];
    if cli.json {
        planned.push(ANALYSIS_FILE_NAME.to_string());
    }
    if cli.charts() {
        planned.extend(chart_file_names());
    }
    if cli.bundle {
        planned.push(BUNDLE_FILE_NAME.to_string());
    }
    if !cli.no_confirm && !confirm_overwrite(&output_dir, &planned)? {
        print_warning("Existing reports kept, nothing saved");
        return Ok(());
    }

    let report_path = output_dir.join(CHURN_REPORT_FILE_NAME);

    let mut written: Vec<PathBuf> = vec![write_churn_report(&analysis.report, &output_dir)?];
    print_success(&format!("Churn report saved to {}", report_path.display()));

    if cli.json {
        let path = export_analysis_json(
            &analysis,
            &input.display().to_string(),
            orders.len(),
            &output_dir,
        )?;
        print_success(&format!("Analysis saved to {}", path.display()));
        written.push(path);
    }

    if cli.charts() {
        let (spinner, charts) = spin("Rendering charts...", || render_charts(&analysis, &output_dir))?;
        finish_step(&spinner, StepOutcome::Done, &format!("{} charts rendered", charts.len()));
        written.extend(charts);
    } else {
        print_info("Charts skipped");
    }

    if cli.bundle {
        let path = bundle_reports(&written, &output_dir)?;
        print_success(&format!("Reports bundled into {}", path.display()));
    }
    print_step_time(step_start.elapsed());

    print_completion();
    Ok(())
}
