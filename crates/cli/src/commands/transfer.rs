//! Shared plumbing for the batch transfer commands (backup, migrate)

use std::time::Duration;

use clap::Args;
use cs_core::{
    BucketSync, ObjectStore, RemotePath, SyncOptions, SyncReport, SyncSource, TransferOutcome,
    TransferTask,
};
use serde::Serialize;

use super::{default_concurrency, fail};
use crate::exit_code::ExitCode;
use crate::interrupt::CtrlCGuard;
use crate::output::{Formatter, ProgressBar, print_report};

/// Flags shared by backup and migrate
#[derive(Args, Debug, Clone, Default)]
pub struct SyncArgs {
    /// Skip items whose destination key matches this glob (repeatable)
    #[arg(long, value_name = "GLOB")]
    pub exclude: Vec<String>,

    /// Print the planned transfers without performing them
    #[arg(long)]
    pub dry_run: bool,

    /// Transfers kept in flight at once (defaults to the config value)
    #[arg(long, value_parser = parse_concurrency)]
    pub concurrency: Option<usize>,

    /// Stop starting new transfers after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

fn parse_concurrency(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("concurrency must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl SyncArgs {
    /// Build sync options writing under `prefix` in the destination bucket
    pub fn options(&self, prefix: Option<&str>) -> cs_core::Result<SyncOptions> {
        let exclude = self
            .exclude
            .iter()
            .map(|raw| {
                glob::Pattern::new(raw).map_err(|e| {
                    cs_core::Error::InvalidArgument(format!("bad exclude pattern '{raw}': {e}"))
                })
            })
            .collect::<cs_core::Result<Vec<_>>>()?;

        Ok(SyncOptions {
            prefix: prefix.map(str::to_owned),
            exclude,
            concurrency: self.concurrency.unwrap_or_else(default_concurrency),
            deadline: self.timeout.map(Duration::from_secs),
            ..Default::default()
        })
    }
}

#[derive(Debug, Serialize)]
struct PlanOutput<'a> {
    dry_run: bool,
    destination: String,
    tasks: &'a [TransferTask],
}

#[derive(Debug, Serialize)]
struct BatchOutput<'a> {
    destination: String,
    interrupted: bool,
    #[serde(flatten)]
    report: &'a SyncReport,
}

/// Plan and run a batch into `destination`, printing progress and the summary
pub async fn run_batch(
    store: &dyn ObjectStore,
    sources: &[SyncSource],
    destination: &RemotePath,
    args: &SyncArgs,
    formatter: &Formatter,
    label: &str,
) -> ExitCode {
    let mut options = match args.options(destination.prefix()) {
        Ok(options) => options,
        Err(e) => return fail(formatter, "Invalid options", &e),
    };

    let guard = CtrlCGuard::install();
    options.cancel = Some(guard.token());
    let sync = BucketSync::new(store, options);

    let tasks = match sync.plan(sources, &destination.bucket).await {
        Ok(tasks) => tasks,
        Err(e) => return fail(formatter, "Failed to enumerate sources", &e),
    };

    if args.dry_run {
        print_plan(formatter, destination, &tasks);
        return ExitCode::Success;
    }

    let progress = ProgressBar::new(formatter.config(), tasks.len() as u64);
    let report = sync
        .execute(tasks, &destination.bucket, |result| {
            if let TransferOutcome::Failure(reason) = &result.outcome {
                progress.println(&format!("failed: {} ({reason})", result.task));
            } else {
                progress.set_message(result.task.destination_key.as_str());
            }
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();

    let interrupted = guard.was_interrupted();
    if formatter.is_json() {
        formatter.json(&BatchOutput {
            destination: destination.to_full_path(),
            interrupted,
            report: &report,
        });
    }
    print_report(formatter, label, &report);

    if interrupted {
        formatter.warning("Interrupted, remaining transfers were skipped.");
        ExitCode::Interrupted
    } else if report.is_success() {
        ExitCode::Success
    } else {
        ExitCode::GeneralError
    }
}

fn print_plan(formatter: &Formatter, destination: &RemotePath, tasks: &[TransferTask]) {
    if formatter.is_json() {
        formatter.json(&PlanOutput {
            dry_run: true,
            destination: destination.to_full_path(),
            tasks,
        });
        return;
    }

    for task in tasks {
        formatter.println(&task.to_string());
    }
    formatter.println(&format!(
        "{} items would be transferred to {destination}",
        tasks.len()
    ));
}
