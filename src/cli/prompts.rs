//! Overwrite confirmation for the report directory

use std::path::{Path, PathBuf};

use anyhow::Result;
use dialoguer::Confirm;

/// Files among `names` that already exist in `output_dir`
pub fn existing_reports(output_dir: &Path, names: &[String]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|name| output_dir.join(name))
        .filter(|path| path.exists())
        .collect()
}

fn overwrite_prompt(output_dir: &Path, existing: &[PathBuf]) -> String {
    let listed: Vec<String> = existing
        .iter()
        .filter_map(|p| p.file_name())
        .map(|n| n.to_string_lossy().into_owned())
        .collect();
    format!(
        "{} file(s) in {} will be replaced ({}). Continue?",
        existing.len(),
        output_dir.display(),
        listed.join(", ")
    )
}

/// Ask before a run replaces earlier reports.
///
/// Returns true without prompting when none of `names` exist yet. The
/// prompt defaults to keeping the old files.
pub fn confirm_overwrite(output_dir: &Path, names: &[String]) -> Result<bool> {
    let existing = existing_reports(output_dir, names);
    if existing.is_empty() {
        return Ok(true);
    }

    tracing::debug!(files = existing.len(), "Reports already present");
    let confirmed = Confirm::new()
        .with_prompt(overwrite_prompt(output_dir, &existing))
        .default(false)
        .interact()?;
    Ok(confirmed)
}
