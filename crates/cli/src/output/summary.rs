//! Batch summaries
//!
//! A batch never fails silently: each failed item is printed with its reason
//! on stderr, even in quiet mode, followed by the counts.

use std::fmt::Display;

use cs_core::BatchReport;

use super::Formatter;

fn summary_line<T>(what: &str, report: &BatchReport<T>) -> String {
    format!(
        "{what}: {} total, {} succeeded, {} failed",
        report.total,
        report.succeeded,
        report.failed_count()
    )
}

/// Print the human summary of a batch
///
/// JSON mode prints nothing here; commands serialize the report themselves.
pub fn print_report<T: Display>(formatter: &Formatter, what: &str, report: &BatchReport<T>) {
    if formatter.is_json() {
        return;
    }

    for failure in &report.failed {
        formatter.error(&format!("{}: {}", failure.item, failure.reason));
    }

    let line = summary_line(what, report);
    if report.is_success() {
        formatter.success(&line);
    } else {
        formatter.error(&line);
    }
}
