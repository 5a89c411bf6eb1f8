//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! Progress and results are printed with `console`; `tracing` carries the
//! diagnostic stream (degenerate binning, ignored columns, timings) on
//! stderr so it never mixes with the report output.
//!
//! # Log Levels
//!
//! - `warn`: degenerate binning, skipped outputs (default)
//! - `info`: pipeline stage summaries (`-v`)
//! - `debug`: per-step detail, uncategorised customers (`-vv`)
//! - `trace`: everything (`-vvv`)
//!
//! `RUST_LOG` overrides the verbosity flag when set.

use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Configuration for logging behavior.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: Level,
    /// Include the module path in each line
    pub with_target: bool,
    pub with_ansi: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            with_target: false,
            with_ansi: true,
        }
    }
}

impl LogConfig {
    /// Map the number of `-v` flags to a level.
    #[must_use]
    pub fn from_verbosity(verbosity: u8) -> Self {
        let level = match verbosity {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        };
        Self {
            level,
            with_target: verbosity >= 2,
            ..Default::default()
        }
    }
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &LogConfig) -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(config.level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.with_target)
        .with_ansi(config.with_ansi)
        .without_time()
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise logging: {}", e))
}
