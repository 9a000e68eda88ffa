//! Progress display
//!
//! Batches (backup, migrate) advance one step per finished item. Single
//! object transfers get a spinner because the SDK call reports nothing.

use std::time::Duration;

use indicatif::ProgressStyle;

use super::OutputConfig;

const BATCH_TEMPLATE: &str = "{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {wide_msg}";
const SPINNER_TEMPLATE: &str = "{spinner:.green} {msg}";
const TICK: Duration = Duration::from_millis(100);

/// A bar or spinner on stderr, absent under `--quiet`, `--json` or `--no-progress`
#[derive(Debug)]
pub struct ProgressBar {
    bar: Option<indicatif::ProgressBar>,
}

impl ProgressBar {
    fn build(config: &OutputConfig, make: impl FnOnce() -> indicatif::ProgressBar) -> Self {
        let drawn = !(config.quiet || config.json || config.no_progress);
        Self {
            bar: drawn.then(make),
        }
    }

    /// Count `total` batch items
    pub fn new(config: &OutputConfig, total: u64) -> Self {
        Self::build(config, || {
            let bar = indicatif::ProgressBar::new(total);
            if let Ok(style) = ProgressStyle::with_template(BATCH_TEMPLATE) {
                bar.set_style(style.progress_chars("#>-"));
            }
            bar
        })
    }

    /// Spin while one call of unknown length runs
    pub fn spinner(config: &OutputConfig, message: &str) -> Self {
        Self::build(config, || {
            let bar = indicatif::ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template(SPINNER_TEMPLATE) {
                bar.set_style(style);
            }
            bar.set_message(message.to_string());
            bar.enable_steady_tick(TICK);
            bar
        })
    }

    pub fn inc(&self, delta: u64) {
        self.bar.iter().for_each(|bar| bar.inc(delta));
    }

    pub fn set_message(&self, message: &str) {
        self.bar
            .iter()
            .for_each(|bar| bar.set_message(message.to_string()));
    }

    /// Print above the bar without tearing it
    pub fn println(&self, message: &str) {
        self.bar.iter().for_each(|bar| bar.println(message));
    }

    pub fn finish_and_clear(&self) {
        self.bar.iter().for_each(indicatif::ProgressBar::finish_and_clear);
    }

    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }
}
