//! Churn summary printed at the end of a run

use std::collections::BTreeMap;
use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;

use crate::pipeline::{CorrelationMatrix, DegenerateBinning, RfmAnalysis, RfmCategory};

/// Summary of one analysis run
#[derive(Debug, Clone)]
pub struct ChurnSummary {
    pub orders: usize,
    pub customers: usize,
    pub churn_rate: f64,
    pub category_counts: BTreeMap<RfmCategory, usize>,
    pub correlation: CorrelationMatrix,
    pub degenerate: Vec<DegenerateBinning>,
    load_time: Option<Duration>,
    analysis_time: Option<Duration>,
}

impl ChurnSummary {
    pub fn new(orders: usize, analysis: &RfmAnalysis) -> Self {
        Self {
            orders,
            customers: analysis.customer_count(),
            churn_rate: analysis.churn_rate,
            category_counts: analysis.category_counts.clone(),
            correlation: analysis.correlation.clone(),
            degenerate: analysis.degenerate.clone(),
            load_time: None,
            analysis_time: None,
        }
    }

    pub fn set_load_time(&mut self, elapsed: Duration) {
        self.load_time = Some(elapsed);
    }

    pub fn set_analysis_time(&mut self, elapsed: Duration) {
        self.analysis_time = Some(elapsed);
    }

    /// Churn rate as shown to the user, two decimals
    pub fn churn_rate_label(&self) -> String {
        format!("{:.2}%", self.churn_rate)
    }

    /// Category counts with their share of customers.
    ///
    /// Uncategorized is listed only when some customer landed there.
    pub fn category_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Category").add_attribute(Attribute::Bold),
            Cell::new("Customers").add_attribute(Attribute::Bold),
            Cell::new("Share").add_attribute(Attribute::Bold),
        ]);

        for (category, &count) in &self.category_counts {
            if *category == RfmCategory::Uncategorized && count == 0 {
                continue;
            }
            let share = if self.customers > 0 {
                count as f64 / self.customers as f64 * 100.0
            } else {
                0.0
            };
            table.add_row(vec![
                Cell::new(category.label()).fg(category_color(*category)),
                Cell::new(count).set_alignment(CellAlignment::Right),
                Cell::new(format!("{:.1}%", share)).set_alignment(CellAlignment::Right),
            ]);
        }

        table
    }

    /// Correlation matrix of the raw metrics, two decimals
    pub fn correlation_table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);

        let mut header = vec![Cell::new("")];
        header.extend(
            self.correlation
                .labels
                .iter()
                .map(|l| Cell::new(l).add_attribute(Attribute::Bold)),
        );
        table.set_header(header);

        for (label, row) in self.correlation.labels.iter().zip(&self.correlation.values) {
            let mut cells = vec![Cell::new(label).add_attribute(Attribute::Bold)];
            cells.extend(row.iter().map(|v| {
                let cell = Cell::new(format_coefficient(*v)).set_alignment(CellAlignment::Right);
                if v.is_nan() {
                    cell.fg(Color::DarkGrey)
                } else if v.abs() >= 0.7 {
                    cell.fg(Color::Yellow)
                } else {
                    cell
                }
            }));
            table.add_row(cells);
        }

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("CHURN SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();
        println!(
            "      Orders: {}   Customers: {}",
            style(self.orders).bold(),
            style(self.customers).bold()
        );

        let rate_style = if self.churn_rate > 30.0 {
            style(self.churn_rate_label()).red().bold()
        } else if self.churn_rate > 10.0 {
            style(self.churn_rate_label()).yellow().bold()
        } else {
            style(self.churn_rate_label()).green().bold()
        };
        println!("      Churn Rate: {}", rate_style);
        println!();

        for line in self.category_table().to_string().lines() {
            println!("    {}", line);
        }

        println!();
        println!(
            "    {} {}",
            style("🔗").cyan(),
            style("RFM CORRELATION").white().bold()
        );
        println!();
        for line in self.correlation_table().to_string().lines() {
            println!("    {}", line);
        }

        if !self.degenerate.is_empty() {
            println!();
            println!(
                "      {}:",
                style("Degenerate binning (adjacent bins collapsed)").yellow()
            );
            for notice in &self.degenerate {
                println!("        {} {}", style("•").dim(), notice);
            }
        }

        if let (Some(load), Some(analysis)) = (self.load_time, self.analysis_time) {
            println!();
            println!(
                "      {}",
                style(format!(
                    "Load {:.2}s · Analysis {:.2}s",
                    load.as_secs_f64(),
                    analysis.as_secs_f64()
                ))
                .dim()
            );
        }
    }
}

fn category_color(category: RfmCategory) -> Color {
    match category {
        RfmCategory::Churn => Color::Red,
        RfmCategory::Average => Color::Yellow,
        RfmCategory::Loyal => Color::Cyan,
        RfmCategory::Best => Color::Green,
        RfmCategory::Uncategorized => Color::DarkGrey,
    }
}

/// Format a correlation coefficient, "NaN" when undefined
pub fn format_coefficient(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        format!("{:.2}", value)
    }
}
