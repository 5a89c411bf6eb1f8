//! Step spinners
//!
//! Every pipeline step runs behind one spinner. [`spin`] starts it, clears it
//! again if the work fails and otherwise hands it back so the caller can
//! close it with [`finish_step`] once it knows how the step went.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

const SPINNER_TEMPLATE: &str = "    {spinner:.cyan} {msg} {elapsed:.dim}";
const TICK_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";
const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// How a step ended, shown as the mark in front of the final message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Done,
    /// Finished, but with something the user should look at
    Degraded,
}

impl StepOutcome {
    fn mark(self) -> &'static str {
        match self {
            StepOutcome::Done => "✅",
            StepOutcome::Degraded => "⚠️ ",
        }
    }
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(TICK_CHARS)
}

/// Start a ticking spinner
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner().with_style(spinner_style());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(TICK_INTERVAL);
    pb
}

/// Run `work` behind a spinner.
///
/// On failure the spinner is cleared and the error returned. On success the
/// spinner keeps ticking and is returned with the value.
pub fn spin<T, E>(
    message: &str,
    work: impl FnOnce() -> Result<T, E>,
) -> Result<(ProgressBar, T), E> {
    let pb = create_spinner(message);
    match work() {
        Ok(value) => Ok((pb, value)),
        Err(e) => {
            pb.finish_and_clear();
            Err(e)
        }
    }
}

/// Stop the spinner and leave `message` behind its outcome mark
pub fn finish_step(pb: &ProgressBar, outcome: StepOutcome, message: &str) {
    pb.finish_with_message(format!("{} {}", outcome.mark(), message));
}
