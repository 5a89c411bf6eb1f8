//! Descriptive charts of the RFM analysis, rendered as SVG with `plotters`

use std::ops::Range;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::pipeline::{BinnedCustomer, CorrelationMatrix, RfmAnalysis, RfmCategory, RfmMetric};

pub const SCATTER_FILE_NAME: &str = "rfm_scatter.svg";
pub const RECENCY_BOXPLOT_FILE_NAME: &str = "recency_by_category.svg";
pub const HEATMAP_FILE_NAME: &str = "rfm_correlation.svg";
pub const CATEGORY_PIE_FILE_NAME: &str = "category_distribution.svg";

/// Number of bars in each metric histogram
pub const HISTOGRAM_BINS: usize = 20;

const CHART_SIZE: (u32, u32) = (800, 600);

/// Low and high end of the Monetary colour ramp
const RAMP_LOW: RGBColor = RGBColor(68, 1, 84);
const RAMP_HIGH: RGBColor = RGBColor(253, 231, 37);

/// File name of the histogram for one metric
pub fn histogram_file_name(metric: RfmMetric) -> String {
    format!("{}_histogram.svg", metric.name().to_lowercase())
}

/// File names of every chart, in the order they are rendered
pub fn chart_file_names() -> Vec<String> {
    let mut names = vec![
        SCATTER_FILE_NAME.to_string(),
        RECENCY_BOXPLOT_FILE_NAME.to_string(),
    ];
    names.extend(RfmMetric::ALL.into_iter().map(histogram_file_name));
    names.push(HEATMAP_FILE_NAME.to_string());
    names.push(CATEGORY_PIE_FILE_NAME.to_string());
    names
}

/// Render every chart into `output_dir` and return the written paths
pub fn render_charts(analysis: &RfmAnalysis, output_dir: &Path) -> Result<Vec<PathBuf>> {
    let customers = &analysis.customers;
    let mut written = Vec::new();

    let path = output_dir.join(SCATTER_FILE_NAME);
    draw_scatter(customers, &path)?;
    written.push(path);

    let path = output_dir.join(RECENCY_BOXPLOT_FILE_NAME);
    draw_recency_boxplot(customers, &path)?;
    written.push(path);

    for metric in RfmMetric::ALL {
        let values: Vec<f64> = customers.iter().map(|c| c.rfm.metric(metric)).collect();
        let path = output_dir.join(histogram_file_name(metric));
        draw_histogram(metric, &values, &path)?;
        written.push(path);
    }

    let path = output_dir.join(HEATMAP_FILE_NAME);
    draw_correlation_heatmap(&analysis.correlation, &path)?;
    written.push(path);

    let path = output_dir.join(CATEGORY_PIE_FILE_NAME);
    draw_category_pie(analysis, &path)?;
    written.push(path);

    tracing::info!(charts = written.len(), dir = %output_dir.display(), "Rendered charts");
    Ok(written)
}

/// Recency against Frequency, each point coloured by Monetary
pub fn draw_scatter(customers: &[BinnedCustomer], path: &Path) -> Result<()> {
    let recency: Vec<f64> = customers.iter().map(|c| c.rfm.metric(RfmMetric::Recency)).collect();
    let frequency: Vec<f64> = customers
        .iter()
        .map(|c| c.rfm.metric(RfmMetric::Frequency))
        .collect();
    let monetary: Vec<f64> = customers.iter().map(|c| c.rfm.monetary).collect();

    let x_range = padded_range(&recency);
    let y_range = padded_range(&frequency);
    let (mon_min, mon_max) = min_max(&monetary);

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Recency vs Frequency (colour: Monetary)", ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_range, y_range)?;

    chart
        .configure_mesh()
        .x_desc("Recency (days)")
        .y_desc("Frequency (orders)")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(recency.iter().zip(&frequency).zip(&monetary).map(|((&r, &f), &m)| {
        let t = if mon_max > mon_min {
            (m - mon_min) / (mon_max - mon_min)
        } else {
            0.5
        };
        Circle::new((r, f), 4, ramp_color(t).mix(0.8).filled())
    }))?;

    root.present()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Distribution of Recency within each non-empty category
pub fn draw_recency_boxplot(customers: &[BinnedCustomer], path: &Path) -> Result<()> {
    let groups: Vec<(RfmCategory, Vec<f32>)> = RfmCategory::ALL
        .iter()
        .map(|category| {
            let values: Vec<f32> = customers
                .iter()
                .filter(|c| c.category == *category)
                .map(|c| c.rfm.recency as f32)
                .collect();
            (*category, values)
        })
        .filter(|(_, values)| !values.is_empty())
        .collect();

    let all: Vec<f64> = groups
        .iter()
        .flat_map(|(_, values)| values.iter().map(|v| *v as f64))
        .collect();
    let y_range = padded_range(&all);
    let y_range = y_range.start as f32..y_range.end as f32;

    let labels: Vec<&'static str> = groups.iter().map(|(c, _)| c.label()).collect();

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Recency by RFM Category", ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0u32..groups.len() as u32).into_segmented(), y_range)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc("RFM Category")
        .y_desc("Recency (days)")
        .axis_desc_style(("sans-serif", 15))
        .x_label_formatter(&|v| segment_label(v, &labels))
        .draw()?;

    chart.draw_series(groups.iter().enumerate().map(|(i, (category, values))| {
        Boxplot::new_vertical(SegmentValue::CenterOf(i as u32), &Quartiles::new(values.as_slice()))
            .width(40)
            .style(category_color(*category))
    }))?;

    root.present()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Histogram of one metric over [`HISTOGRAM_BINS`] equal-width bars
pub fn draw_histogram(metric: RfmMetric, values: &[f64], path: &Path) -> Result<()> {
    let (lo, hi) = min_max(values);
    let counts = histogram_counts(values, HISTOGRAM_BINS);
    let width = if hi > lo {
        (hi - lo) / HISTOGRAM_BINS as f64
    } else {
        1.0 / HISTOGRAM_BINS as f64
    };
    let max_count = counts.iter().copied().max().unwrap_or(0).max(1) as f64;

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(format!("{} Distribution", metric), ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(lo..lo + width * HISTOGRAM_BINS as f64, 0f64..max_count * 1.1)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_desc(metric.name())
        .y_desc("Customers")
        .axis_desc_style(("sans-serif", 15))
        .draw()?;

    chart.draw_series(counts.iter().enumerate().map(|(i, &count)| {
        let x0 = lo + width * i as f64;
        Rectangle::new([(x0, 0.0), (x0 + width, count as f64)], BLUE.mix(0.6).filled())
    }))?;

    root.present()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Annotated heatmap of the metric correlation matrix
pub fn draw_correlation_heatmap(matrix: &CorrelationMatrix, path: &Path) -> Result<()> {
    let n = matrix.labels.len() as u32;
    let labels: Vec<&str> = matrix.labels.iter().map(String::as_str).collect();

    let root = SVGBackend::new(path, (640, 560)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("RFM Correlation", ("sans-serif", 26))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(90)
        .build_cartesian_2d((0u32..n).into_segmented(), (0u32..n).into_segmented())?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_label_formatter(&|v| segment_label(v, &labels))
        .y_label_formatter(&|v| segment_label(v, &labels))
        .draw()?;

    let cells: Vec<(u32, u32, f64)> = matrix
        .values
        .iter()
        .enumerate()
        .flat_map(|(row, values)| {
            values
                .iter()
                .enumerate()
                .map(move |(col, v)| (row as u32, col as u32, *v))
        })
        .collect();

    chart.draw_series(cells.iter().map(|&(row, col, value)| {
        // Row 0 at the top
        let y = n - 1 - row;
        Rectangle::new(
            [
                (SegmentValue::Exact(col), SegmentValue::Exact(y)),
                (SegmentValue::Exact(col + 1), SegmentValue::Exact(y + 1)),
            ],
            heat_color(value).filled(),
        )
    }))?;

    let text_style = ("sans-serif", 20)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Center));
    chart.draw_series(cells.iter().map(|&(row, col, value)| {
        let y = n - 1 - row;
        Text::new(
            super::summary::format_coefficient(value),
            (SegmentValue::CenterOf(col), SegmentValue::CenterOf(y)),
            text_style.clone(),
        )
    }))?;

    root.present()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Non-empty categories with their customer counts, in report order
pub fn category_slices(analysis: &RfmAnalysis) -> Vec<(RfmCategory, usize)> {
    analysis
        .category_counts
        .iter()
        .filter(|(_, &count)| count > 0)
        .map(|(category, &count)| (*category, count))
        .collect()
}

/// Pie of customers per category, each slice labelled with its percentage
pub fn draw_category_pie(analysis: &RfmAnalysis, path: &Path) -> Result<()> {
    let slices = category_slices(analysis);
    let sizes: Vec<f64> = slices.iter().map(|(_, count)| *count as f64).collect();
    let colors: Vec<RGBColor> = slices.iter().map(|(c, _)| category_color(*c)).collect();
    let labels: Vec<&'static str> = slices.iter().map(|(c, _)| c.label()).collect();

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let area = root.titled("Distribution of RFM Categories", ("sans-serif", 26))?;

    let (width, height) = area.dim_in_pixel();
    let center = ((width / 2) as i32, (height / 2) as i32);
    let radius = width.min(height) as f64 * 0.35;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    // First slice starts at twelve o'clock
    pie.start_angle(-90.0);
    pie.label_style(("sans-serif", 18).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 16).into_font().color(&WHITE));
    area.draw(&pie)?;

    root.present()
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Count values into `n_bins` equal-width bins spanning min..max
pub fn histogram_counts(values: &[f64], n_bins: usize) -> Vec<usize> {
    let mut counts = vec![0usize; n_bins];
    if values.is_empty() || n_bins == 0 {
        return counts;
    }

    let (lo, hi) = min_max(values);
    if hi <= lo {
        counts[0] = values.len();
        return counts;
    }

    let width = (hi - lo) / n_bins as f64;
    for v in values {
        let idx = ((v - lo) / width) as usize;
        // The maximum belongs to the last bin
        counts[idx.min(n_bins - 1)] += 1;
    }
    counts
}

fn segment_label(value: &SegmentValue<u32>, labels: &[&str]) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels
            .get(*i as usize)
            .map(|s| s.to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn min_max(values: &[f64]) -> (f64, f64) {
    let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if lo.is_finite() && hi.is_finite() {
        (lo, hi)
    } else {
        (0.0, 0.0)
    }
}

/// Axis range with a margin of 5% (or 1.0 for a constant series)
fn padded_range(values: &[f64]) -> Range<f64> {
    let (lo, hi) = min_max(values);
    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad)..(hi + pad)
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

fn ramp_color(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0);
    RGBColor(
        lerp(RAMP_LOW.0, RAMP_HIGH.0, t),
        lerp(RAMP_LOW.1, RAMP_HIGH.1, t),
        lerp(RAMP_LOW.2, RAMP_HIGH.2, t),
    )
}

/// Blue for -1, white for 0, red for +1, grey when undefined
fn heat_color(value: f64) -> RGBColor {
    if value.is_nan() {
        return RGBColor(200, 200, 200);
    }
    let v = value.clamp(-1.0, 1.0);
    if v >= 0.0 {
        RGBColor(255, lerp(255, 60, v), lerp(255, 60, v))
    } else {
        RGBColor(lerp(255, 60, -v), lerp(255, 60, -v), 255)
    }
}

fn category_color(category: RfmCategory) -> RGBColor {
    match category {
        RfmCategory::Churn => RGBColor(214, 39, 40),
        RfmCategory::Average => RGBColor(255, 127, 14),
        RfmCategory::Loyal => RGBColor(31, 119, 180),
        RfmCategory::Best => RGBColor(44, 160, 44),
        RfmCategory::Uncategorized => RGBColor(127, 127, 127),
    }
}
