//! Batch reports
//!
//! Every batch (transfers, object deletions, instance starts) produces one
//! report holding the number of items attempted, how many succeeded and each
//! failed item with its reason.

use serde::Serialize;

use crate::keymap::ObjectKey;
use crate::sync::TransferTask;

/// A single item that failed within a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemFailure<T> {
    pub item: T,
    pub reason: String,
}

/// Aggregate outcome of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchReport<T> {
    pub total: usize,
    pub succeeded: usize,
    pub failed: Vec<ItemFailure<T>>,
}

impl<T> Default for BatchReport<T> {
    fn default() -> Self {
        Self {
            total: 0,
            succeeded: 0,
            failed: Vec::new(),
        }
    }
}

impl<T> BatchReport<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one item's outcome
    pub fn record<E: ToString>(&mut self, item: T, outcome: std::result::Result<(), E>) {
        self.total += 1;
        match outcome {
            Ok(()) => self.succeeded += 1,
            Err(e) => self.failed.push(ItemFailure {
                item,
                reason: e.to_string(),
            }),
        }
    }

    /// True when no item failed
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

impl<T, E: ToString> FromIterator<(T, std::result::Result<(), E>)> for BatchReport<T> {
    fn from_iter<I: IntoIterator<Item = (T, std::result::Result<(), E>)>>(iter: I) -> Self {
        let mut report = Self::new();
        for (item, outcome) in iter {
            report.record(item, outcome);
        }
        report
    }
}

/// Report of a BucketSync run
pub type SyncReport = BatchReport<TransferTask>;

/// Report of a bulk object deletion
pub type DeleteReport = BatchReport<ObjectKey>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_counts() {
        let mut report: BatchReport<&str> = BatchReport::new();
        report.record("a", Ok::<(), String>(()));
        report.record("b", Err("boom"));
        report.record("c", Ok::<(), String>(()));

        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed_count(), 1);
        assert_eq!(report.failed[0].item, "b");
        assert_eq!(report.failed[0].reason, "boom");
        assert!(!report.is_success());
    }

    #[test]
    fn test_empty_report_is_success() {
        let report: BatchReport<String> = BatchReport::default();
        assert_eq!(report.total, 0);
        assert!(report.is_success());
    }

    #[test]
    fn test_collect_from_outcomes() {
        let report: BatchReport<u32> = vec![(1, Ok(())), (2, Err("nope")), (3, Err("nope"))]
            .into_iter()
            .collect();

        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 1);
        let failed: Vec<u32> = report.failed.iter().map(|f| f.item).collect();
        assert_eq!(failed, vec![2, 3]);
    }

    #[test]
    fn test_report_json_shape() {
        let mut report: BatchReport<String> = BatchReport::new();
        report.record("x".to_string(), Err("denied"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["total"], 1);
        assert_eq!(json["succeeded"], 0);
        assert_eq!(json["failed"][0]["item"], "x");
        assert_eq!(json["failed"][0]["reason"], "denied");
    }
}
