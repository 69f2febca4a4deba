//! Progress reporting over volume slices

use indicatif::{ProgressBar, ProgressStyle};
use log::warn;

/// Progress bar on stderr; hidden when stderr is not a terminal
pub struct ProgressTracker {
    bar: ProgressBar,
}

impl ProgressTracker {
    pub fn new(total: u64, description: &str) -> Self {
        let bar = ProgressBar::new(total);
        match ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        {
            Ok(style) => bar.set_style(style.progress_chars("#>-")),
            Err(e) => warn!("Falling back to the default progress style: {}", e),
        }
        bar.set_message(description.to_string());

        ProgressTracker { bar }
    }

    pub fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Completed");
    }

    /// Clear the bar without a completion message, e.g. after a failure
    pub fn abandon(&self) {
        self.bar.abandon();
    }
}
