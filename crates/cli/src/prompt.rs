//! Interactive y/N confirmation
//!
//! Prompts are written to stderr and read from the terminal. `--yes`
//! accepts everything; JSON mode without `--yes` declines, since nobody
//! is there to answer.

use console::Term;
use cs_core::{Confirm, ConfirmAction, ConfirmRequest};

use crate::output::OutputConfig;

#[derive(Debug, Clone)]
pub struct Prompt {
    assume_yes: bool,
    non_interactive: bool,
}

impl Prompt {
    pub fn new(assume_yes: bool, config: &OutputConfig) -> Self {
        Self {
            assume_yes,
            non_interactive: config.json,
        }
    }

    /// Ask a free-form yes/no question
    pub fn ask(&self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        if self.non_interactive {
            tracing::debug!(question, "declining prompt in non-interactive mode");
            return false;
        }

        let term = Term::stderr();
        if term.write_str(&format!("{question} [y/N] ")).is_err() {
            return false;
        }
        term.read_line().map(|answer| is_yes(&answer)).unwrap_or(false)
    }
}

impl Confirm for Prompt {
    fn confirm(&self, request: &ConfirmRequest) -> bool {
        self.ask(&question(request))
    }
}

fn question(request: &ConfirmRequest) -> String {
    let bucket = &request.bucket;
    let count = request.object_count;
    match request.action {
        ConfirmAction::Empty => {
            format!("Delete all {count} objects in '{bucket}'? This cannot be undone.")
        }
        ConfirmAction::Delete => format!("Delete bucket '{bucket}'?"),
        ConfirmAction::ForceDelete => format!(
            "Delete all {count} objects in '{bucket}' and then the bucket? This cannot be undone."
        ),
    }
}

/// Accepts "y" or "yes" in any case
pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
