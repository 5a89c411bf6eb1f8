//! Zip bundle of every artifact written by a run

use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// File name of the bundle
pub const BUNDLE_FILE_NAME: &str = "rfm_churn_reports.zip";

/// Package `files` into `output_dir/rfm_churn_reports.zip`.
///
/// Entries are stored flat under their file names. The source files are
/// left in place.
pub fn bundle_reports(files: &[PathBuf], output_dir: &Path) -> Result<PathBuf> {
    if files.is_empty() {
        bail!("Nothing to bundle");
    }

    let zip_path = output_dir.join(BUNDLE_FILE_NAME);
    let zip_file = std::fs::File::create(&zip_path)
        .with_context(|| format!("Failed to create zip file: {}", zip_path.display()))?;

    let mut zip = ZipWriter::new(zip_file);
    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Deflated)
        .unix_permissions(0o644);

    for path in files {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("Invalid file name: {}", path.display()))?;
        zip.start_file(filename, options)
            .with_context(|| format!("Failed to add {} to zip", filename))?;

        let mut content = Vec::new();
        std::fs::File::open(path)
            .with_context(|| format!("Failed to open file: {}", path.display()))?
            .read_to_end(&mut content)?;
        zip.write_all(&content)?;
    }

    zip.finish().context("Failed to finalize zip file")?;
    tracing::info!(path = %zip_path.display(), entries = files.len(), "Bundled reports");

    Ok(zip_path)
}
