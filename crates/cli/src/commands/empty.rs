//! empty command - Delete every object in a bucket, keeping the bucket

use clap::Args;
use cs_core::{BucketLifecycle, EmptyOutcome, RemotePath};
use serde::Serialize;

use super::{fail, open_store};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, print_report};
use crate::prompt::Prompt;

/// Delete every object in a bucket
#[derive(Args, Debug)]
pub struct EmptyArgs {
    /// Target path (profile/bucket)
    pub target: String,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
struct EmptyOutput<'a> {
    bucket: &'a str,
    #[serde(flatten)]
    outcome: &'a EmptyOutcome,
}

/// Execute the empty command
pub async fn execute(args: EmptyArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let target = match RemotePath::parse_bucket(&args.target) {
        Ok(target) => target,
        Err(e) => return fail(&formatter, "Invalid target", &e),
    };

    let (_, store) = match open_store(&target.profile, &formatter).await {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    let lifecycle = BucketLifecycle::new(store.as_ref(), Prompt::new(args.yes, formatter.config()));
    let outcome = match lifecycle.empty(&target.bucket).await {
        Ok(outcome) => outcome,
        Err(e) => return fail(&formatter, "Failed to empty bucket", &e),
    };

    if formatter.is_json() {
        formatter.json(&EmptyOutput {
            bucket: &target.bucket,
            outcome: &outcome,
        });
    }

    match &outcome {
        EmptyOutcome::NotFound => {
            if !formatter.is_json() {
                formatter.error(&format!("Bucket '{target}' not found"));
            }
            ExitCode::NotFound
        }
        EmptyOutcome::AlreadyEmpty => {
            formatter.success(&format!("Bucket '{target}' is already empty."));
            ExitCode::Success
        }
        EmptyOutcome::Cancelled => {
            formatter.warning("Aborted, nothing was deleted.");
            ExitCode::Interrupted
        }
        EmptyOutcome::Emptied { report } => {
            print_report(&formatter, "Objects deleted", report);
            if report.is_success() {
                ExitCode::Success
            } else {
                ExitCode::GeneralError
            }
        }
    }
}
