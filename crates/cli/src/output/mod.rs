//! Terminal output
//!
//! Every command renders through a [`Formatter`], which decides between human
//! text and JSON. Batch commands also draw a [`ProgressBar`] and finish with
//! [`print_report`].

mod formatter;
mod progress;
mod summary;

pub use formatter::Formatter;
pub use progress::ProgressBar;
pub use summary::print_report;

/// The global output flags, shared by every subcommand
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// `--json`: machine-readable results, no color, no progress
    pub json: bool,
    pub no_color: bool,
    pub no_progress: bool,
    /// `--quiet`: errors only
    pub quiet: bool,
}
