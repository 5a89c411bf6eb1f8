//! Terminal styling utilities for step-by-step CLI output

use console::{style, Emoji};
use std::path::Path;
use std::time::Duration;

// Emoji icons with fallbacks for terminals that don't support them
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "[*] ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "[!] ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static CHART: Emoji<'_, '_> = Emoji("📊 ", "");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static CALENDAR: Emoji<'_, '_> = Emoji("📅 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    let banner = r#"
    ╦═╗╔═╗╔╦╗   ╔═╗╦ ╦╦ ╦╦═╗╔╗╔
    ╠╦╝╠╣ ║║║───║  ╠═╣║ ║╠╦╝║║║
    ╩╚═╚  ╩ ╩   ╚═╝╩ ╩╚═╝╩╚═╝╚╝
    "#;

    println!();
    println!("{}", style(banner).cyan().bold());
    println!(
        "    {}",
        style("Churn-risk segmentation from order history").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Options shown in the configuration card
pub struct ConfigCard<'a> {
    pub input: &'a Path,
    pub output_dir: &'a Path,
    pub date_format: Option<&'a str>,
    pub charts: bool,
    pub json: bool,
    pub bundle: bool,
}

/// Print configuration card
pub fn print_config(card: &ConfigCard) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);
    let on_off = |flag: bool| if flag { "on" } else { "off" };

    println!("    ┌{}┐", line);
    println!("    │ {:<53}│", style("⚙️  Configuration").cyan().bold());
    println!("    ├{}┤", line);
    println!(
        "    │  {} Input:  {:<41}│",
        FOLDER,
        truncate_path(card.input, 40)
    );
    println!(
        "    │  {} Output: {:<41}│",
        SAVE,
        truncate_path(card.output_dir, 40)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Date format: {:<36}│",
        CALENDAR,
        style(card.date_format.unwrap_or("auto")).yellow()
    );
    println!(
        "    │  {} Charts: {:<5} JSON: {:<5} Bundle: {:<13}│",
        CHART,
        style(on_off(card.charts)).yellow(),
        style(on_off(card.json)).yellow(),
        style(on_off(card.bundle)).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print a step header with styling
pub fn print_step_header(step_num: u8, title: &str) {
    println!();
    println!(
        "    {} {} {}",
        style(format!("STEP {}", step_num)).cyan().bold(),
        style("│").dim(),
        style(title).white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("    {} {}", style("✓").green().bold(), style(message).green());
}

/// Print an info message
pub fn print_info(message: &str) {
    println!("    {} {}", INFO, message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("    {} {}", WARN, style(message).yellow());
}

/// Print how long a step took
pub fn print_step_time(elapsed: Duration) {
    println!(
        "    {}",
        style(format!("⏱  {:.2}s", elapsed.as_secs_f64())).dim()
    );
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("RFM churn analysis complete!").green().bold()
    );
    println!();
}

/// Print a styled count message
pub fn print_count(description: &str, count: usize, extra_info: Option<&str>) {
    if let Some(info) = extra_info {
        println!(
            "      Found {} {} {}",
            style(count).yellow().bold(),
            description,
            style(info).dim()
        );
    } else {
        println!("      Found {} {}", style(count).yellow().bold(), description);
    }
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= max_len {
        s.to_string()
    } else {
        let tail: String = chars[chars.len() - (max_len - 3)..].iter().collect();
        format!("...{}", tail)
    }
}
