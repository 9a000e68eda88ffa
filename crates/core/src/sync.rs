//! Bucket synchronization
//!
//! BucketSync enumerates local directory trees or a source bucket, maps every
//! item to a destination key and transfers each one into the destination
//! bucket. One item failing never stops the rest; every outcome ends up in the
//! [`SyncReport`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::keymap::{KeyMapper, ObjectKey, SourceItem};
use crate::report::SyncReport;
use crate::traits::ObjectStore;

/// Where a batch reads from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncSource {
    /// A local file or directory
    Local(PathBuf),
    /// Every object of a bucket in the destination's store
    Container(String),
}

/// One planned transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferTask {
    pub source: SourceItem,
    pub destination_key: ObjectKey,
}

impl fmt::Display for TransferTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.source, self.destination_key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum TransferOutcome {
    Success,
    Failure(String),
}

/// Outcome of a single transfer
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncResult {
    pub task: TransferTask,
    pub outcome: TransferOutcome,
}

impl SyncResult {
    pub fn is_success(&self) -> bool {
        self.outcome == TransferOutcome::Success
    }
}

/// Knobs for a BucketSync batch
#[derive(Debug, Clone)]
pub struct SyncOptions {
    /// Key prefix prepended to every destination key
    pub prefix: Option<String>,
    /// Exact destination key; only valid when a single item is enumerated
    pub override_key: Option<ObjectKey>,
    /// Items whose mapped key matches any pattern are skipped
    pub exclude: Vec<glob::Pattern>,
    /// Transfers kept in flight at once
    pub concurrency: usize,
    /// Stops starting new transfers once cancelled
    pub cancel: Option<CancellationToken>,
    /// Wall-clock budget for the transfer phase
    pub deadline: Option<Duration>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            prefix: None,
            override_key: None,
            exclude: Vec::new(),
            concurrency: 1,
            cancel: None,
            deadline: None,
        }
    }
}

pub struct BucketSync<'a> {
    store: &'a dyn ObjectStore,
    options: SyncOptions,
}

impl<'a> BucketSync<'a> {
    pub fn new(store: &'a dyn ObjectStore, options: SyncOptions) -> Self {
        Self { store, options }
    }

    fn mapper(&self) -> KeyMapper {
        let mapper = KeyMapper::new().with_override(self.options.override_key.clone());
        match &self.options.prefix {
            Some(prefix) => mapper.with_prefix(prefix.clone()),
            None => mapper,
        }
    }

    /// Enumerate every source and map it to a transfer task
    ///
    /// Nothing is written. The result is the exact list `run` would execute,
    /// in execution order.
    pub async fn plan(
        &self,
        sources: &[SyncSource],
        destination: &str,
    ) -> Result<Vec<TransferTask>> {
        let mapper = self.mapper();
        let mut tasks = Vec::new();

        for source in sources {
            match source {
                SyncSource::Local(root) => {
                    for item in enumerate_local(root)? {
                        let destination_key = mapper.map(&item, root)?;
                        tasks.push(TransferTask {
                            source: item,
                            destination_key,
                        });
                    }
                }
                SyncSource::Container(container) => {
                    let renames = mapper.override_key().is_some() || self.options.prefix.is_some();
                    if container == destination && !renames {
                        return Err(Error::InvalidArgument(format!(
                            "copying bucket '{container}' onto itself needs a destination prefix"
                        )));
                    }
                    let objects = self.store.list_objects(container, "").await?;
                    tracing::debug!(container, count = objects.len(), "enumerated source bucket");
                    for object in objects {
                        let item = SourceItem::RemoteObject {
                            container: container.clone(),
                            key: ObjectKey::from_listing(object.key),
                        };
                        let destination_key = mapper.map(&item, Path::new(""))?;
                        tasks.push(TransferTask {
                            source: item,
                            destination_key,
                        });
                    }
                }
            }
        }

        let before = tasks.len();
        tasks.retain(|task| !self.is_excluded(&task.destination_key));
        if tasks.len() != before {
            tracing::debug!(excluded = before - tasks.len(), "applied exclude patterns");
        }

        if mapper.override_key().is_some() && tasks.len() > 1 {
            return Err(Error::InvalidArgument(format!(
                "an explicit destination key needs exactly one source item, found {}",
                tasks.len()
            )));
        }

        Ok(tasks)
    }

    fn is_excluded(&self, key: &ObjectKey) -> bool {
        self.options
            .exclude
            .iter()
            .any(|pattern| pattern.matches(key.as_str()))
    }

    /// Plan and execute a batch
    pub async fn run(&self, sources: &[SyncSource], destination: &str) -> Result<SyncReport> {
        self.run_observed(sources, destination, |_| {}).await
    }

    /// Like [`BucketSync::run`], calling `observer` as each transfer finishes
    pub async fn run_observed<F>(
        &self,
        sources: &[SyncSource],
        destination: &str,
        observer: F,
    ) -> Result<SyncReport>
    where
        F: FnMut(&SyncResult),
    {
        let tasks = self.plan(sources, destination).await?;
        Ok(self.execute(tasks, destination, observer).await)
    }

    /// Execute planned tasks against `destination`
    ///
    /// Results are reported in task order regardless of concurrency.
    pub async fn execute<F>(
        &self,
        tasks: Vec<TransferTask>,
        destination: &str,
        mut observer: F,
    ) -> SyncReport
    where
        F: FnMut(&SyncResult),
    {
        tracing::info!(destination, tasks = tasks.len(), "starting transfer batch");
        let deadline = self.options.deadline.map(|d| Instant::now() + d);
        let concurrency = self.options.concurrency.max(1);

        let mut report = SyncReport::new();
        let mut results = std::pin::pin!(
            stream::iter(tasks)
                .map(|task| self.transfer(task, destination, deadline))
                .buffered(concurrency)
        );

        while let Some(result) = results.next().await {
            observer(&result);
            let outcome = match result.outcome {
                TransferOutcome::Success => Ok(()),
                TransferOutcome::Failure(reason) => Err(reason),
            };
            report.record(result.task, outcome);
        }

        tracing::info!(
            destination,
            total = report.total,
            succeeded = report.succeeded,
            failed = report.failed_count(),
            "transfer batch finished"
        );
        report
    }

    async fn transfer(
        &self,
        task: TransferTask,
        destination: &str,
        deadline: Option<Instant>,
    ) -> SyncResult {
        if self
            .options
            .cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return failure(task, "cancelled".to_string());
        }
        if deadline.is_some_and(|at| Instant::now() >= at) {
            return failure(task, "batch deadline exceeded".to_string());
        }

        let key = task.destination_key.as_str();
        let call = async {
            match &task.source {
                SourceItem::LocalFile { path } => self
                    .store
                    .upload_file(destination, key, path)
                    .await
                    .map(|_| ()),
                SourceItem::RemoteObject {
                    container,
                    key: src_key,
                } => {
                    self.store
                        .copy_object(container, src_key.as_str(), destination, key)
                        .await
                }
                SourceItem::Unreadable { reason, .. } => Err(Error::General(reason.clone())),
            }
        };

        let outcome = match deadline {
            Some(at) => match tokio::time::timeout_at(at, call).await {
                Ok(outcome) => outcome,
                Err(_) => Err(Error::Cancelled("batch deadline exceeded".into())),
            },
            None => call.await,
        };

        match outcome {
            Ok(()) => {
                tracing::debug!(task = %task, "transferred");
                SyncResult {
                    task,
                    outcome: TransferOutcome::Success,
                }
            }
            Err(e) => {
                tracing::warn!(task = %task, error = %e, "transfer failed");
                failure(task, e.to_string())
            }
        }
    }
}

fn failure(task: TransferTask, reason: String) -> SyncResult {
    SyncResult {
        task,
        outcome: TransferOutcome::Failure(reason),
    }
}

/// Every regular file under `root` (or `root` itself), in file-name order
///
/// An unreadable `root` fails the whole plan. Anything unreadable below it
/// becomes an [`SourceItem::Unreadable`] item, which fails on its own when
/// executed while the rest of the tree is still transferred.
fn enumerate_local(root: &Path) -> Result<Vec<SourceItem>> {
    let mut items = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() > 0 => {
                let path = e.path().unwrap_or(root).to_path_buf();
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable entry");
                items.push(SourceItem::Unreadable {
                    path,
                    reason: e.to_string(),
                });
                continue;
            }
            Err(e) => {
                let path = e.path().unwrap_or(root).to_path_buf();
                let source = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                return Err(Error::local_io(path, source));
            }
        };
        if entry.file_type().is_file() {
            items.push(SourceItem::LocalFile {
                path: entry.into_path(),
            });
        }
    }
    tracing::debug!(root = %root.display(), count = items.len(), "enumerated local source");
    Ok(items)
}
