//! Bucket lifecycle: empty and delete
//!
//! Existence and object count are always queried fresh right before a
//! destructive step. The object listing is a full snapshot taken before the
//! first deletion.

use serde::Serialize;

use crate::error::Result;
use crate::keymap::ObjectKey;
use crate::report::DeleteReport;
use crate::traits::ObjectStore;

/// What a confirmation prompt is asking about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfirmAction {
    /// Delete every object, keep the bucket
    Empty,
    /// Delete an already empty bucket
    Delete,
    /// Delete every object, then the bucket
    ForceDelete,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmRequest {
    pub bucket: String,
    pub object_count: usize,
    pub action: ConfirmAction,
}

/// Caller-supplied gate in front of every irreversible step
pub trait Confirm {
    fn confirm(&self, request: &ConfirmRequest) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&ConfirmRequest) -> bool,
{
    fn confirm(&self, request: &ConfirmRequest) -> bool {
        self(request)
    }
}

/// Result of [`BucketLifecycle::delete`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DeleteOutcome {
    /// The bucket does not exist; nothing was touched
    NotFound,
    /// The bucket holds objects and force was not given; nothing was touched
    RefusedNonEmpty { object_count: usize },
    /// The confirmation gate declined; nothing was touched
    Cancelled,
    /// The bucket is gone
    Deleted { emptied: DeleteReport },
    /// Emptying ran but the bucket itself could not be deleted
    NotDeleted { emptied: DeleteReport, reason: String },
}

/// Result of [`BucketLifecycle::empty`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EmptyOutcome {
    NotFound,
    AlreadyEmpty,
    Cancelled,
    Emptied { report: DeleteReport },
}

pub struct BucketLifecycle<'a, C> {
    store: &'a dyn ObjectStore,
    confirm: C,
}

impl<'a, C: Confirm> BucketLifecycle<'a, C> {
    pub fn new(store: &'a dyn ObjectStore, confirm: C) -> Self {
        Self { store, confirm }
    }

    /// Delete `bucket`, emptying it first when `force` is set
    ///
    /// A failed existence check or listing is returned as an error; it is
    /// never treated as "absent" or "empty".
    pub async fn delete(&self, bucket: &str, force: bool) -> Result<DeleteOutcome> {
        if !self.store.container_exists(bucket).await? {
            tracing::debug!(bucket, "bucket not found");
            return Ok(DeleteOutcome::NotFound);
        }

        let keys = self.snapshot(bucket).await?;
        if !keys.is_empty() && !force {
            return Ok(DeleteOutcome::RefusedNonEmpty {
                object_count: keys.len(),
            });
        }

        let action = if keys.is_empty() {
            ConfirmAction::Delete
        } else {
            ConfirmAction::ForceDelete
        };
        if !self.ask(bucket, keys.len(), action) {
            return Ok(DeleteOutcome::Cancelled);
        }

        let emptied = self.delete_objects(bucket, keys).await;

        match self.store.delete_container(bucket).await {
            Ok(()) => {
                tracing::info!(bucket, "bucket deleted");
                Ok(DeleteOutcome::Deleted { emptied })
            }
            Err(e) => {
                tracing::warn!(bucket, error = %e, "bucket delete failed");
                Ok(DeleteOutcome::NotDeleted {
                    emptied,
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Delete every object in `bucket`, keeping the bucket
    pub async fn empty(&self, bucket: &str) -> Result<EmptyOutcome> {
        if !self.store.container_exists(bucket).await? {
            return Ok(EmptyOutcome::NotFound);
        }

        let keys = self.snapshot(bucket).await?;
        if keys.is_empty() {
            return Ok(EmptyOutcome::AlreadyEmpty);
        }
        if !self.ask(bucket, keys.len(), ConfirmAction::Empty) {
            return Ok(EmptyOutcome::Cancelled);
        }

        let report = self.delete_objects(bucket, keys).await;
        Ok(EmptyOutcome::Emptied { report })
    }

    fn ask(&self, bucket: &str, object_count: usize, action: ConfirmAction) -> bool {
        let request = ConfirmRequest {
            bucket: bucket.to_string(),
            object_count,
            action,
        };
        let accepted = self.confirm.confirm(&request);
        if !accepted {
            tracing::info!(bucket, ?action, "declined at confirmation");
        }
        accepted
    }

    /// Every key in `bucket`, exactly as listed
    async fn snapshot(&self, bucket: &str) -> Result<Vec<ObjectKey>> {
        let objects = self.store.list_objects(bucket, "").await?;
        Ok(objects
            .into_iter()
            .map(|object| ObjectKey::from_listing(object.key))
            .collect())
    }

    async fn delete_objects(&self, bucket: &str, keys: Vec<ObjectKey>) -> DeleteReport {
        let mut report = DeleteReport::new();
        for key in keys {
            let outcome = self.store.delete_object(bucket, key.as_str()).await;
            if let Err(e) = &outcome {
                tracing::warn!(bucket, key = %key, error = %e, "object delete failed");
            }
            report.record(key, outcome);
        }
        tracing::info!(
            bucket,
            deleted = report.succeeded,
            failed = report.failed_count(),
            "bucket emptied"
        );
        report
    }
}
