//! rb command - Remove bucket
//!
//! A non-empty bucket is refused unless `--force` is given, in which case
//! every object is deleted first. Every mutating path asks for confirmation
//! unless `--yes` is given.

use clap::Args;
use cs_core::{BucketLifecycle, DeleteOutcome, RemotePath};
use serde::Serialize;

use super::{fail, open_store};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, print_report};
use crate::prompt::Prompt;

/// Remove a bucket
#[derive(Args, Debug)]
pub struct RbArgs {
    /// Target path (profile/bucket)
    pub target: String,

    /// Delete every object first if the bucket is not empty
    #[arg(long)]
    pub force: bool,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
struct RbOutput<'a> {
    bucket: &'a str,
    #[serde(flatten)]
    outcome: &'a DeleteOutcome,
}

/// Execute the rb command
pub async fn execute(args: RbArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let target = match RemotePath::parse_bucket(&args.target) {
        Ok(target) => target,
        Err(e) => return fail(&formatter, "Invalid target", &e),
    };

    let (_, store) = match open_store(&target.profile, &formatter).await {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    let prompt = Prompt::new(args.yes, formatter.config());
    let lifecycle = BucketLifecycle::new(store.as_ref(), prompt);

    let outcome = match lifecycle.delete(&target.bucket, args.force).await {
        Ok(outcome) => outcome,
        Err(e) => return fail(&formatter, "Failed to remove bucket", &e),
    };

    if formatter.is_json() {
        formatter.json(&RbOutput {
            bucket: &target.bucket,
            outcome: &outcome,
        });
    }
    render(&formatter, &target, &outcome)
}

fn render(formatter: &Formatter, target: &RemotePath, outcome: &DeleteOutcome) -> ExitCode {
    let json = formatter.is_json();
    match outcome {
        DeleteOutcome::NotFound => {
            if !json {
                formatter.error(&format!("Bucket '{target}' not found"));
            }
            ExitCode::NotFound
        }
        DeleteOutcome::RefusedNonEmpty { object_count } => {
            if !json {
                formatter.error(&format!(
                    "Bucket '{target}' contains {object_count} objects. Use --force to delete them first."
                ));
            }
            ExitCode::Conflict
        }
        DeleteOutcome::Cancelled => {
            if !json {
                formatter.warning("Aborted, nothing was deleted.");
            }
            ExitCode::Interrupted
        }
        DeleteOutcome::Deleted { emptied } => {
            if emptied.total > 0 {
                print_report(formatter, "Objects deleted", emptied);
            }
            formatter.success(&format!("Bucket '{target}' removed successfully."));
            if emptied.is_success() {
                ExitCode::Success
            } else {
                ExitCode::GeneralError
            }
        }
        DeleteOutcome::NotDeleted { emptied, reason } => {
            if emptied.total > 0 {
                print_report(formatter, "Objects deleted", emptied);
            }
            if !json {
                formatter.error(&format!("Bucket '{target}' was not removed: {reason}"));
            }
            ExitCode::GeneralError
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_core::DeleteReport;

    fn quiet() -> Formatter {
        Formatter::new(OutputConfig {
            json: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_outcome_exit_codes() {
        let target = RemotePath::new("aws", "logs", "");
        let formatter = quiet();

        assert_eq!(
            render(&formatter, &target, &DeleteOutcome::NotFound),
            ExitCode::NotFound
        );
        assert_eq!(
            render(
                &formatter,
                &target,
                &DeleteOutcome::RefusedNonEmpty { object_count: 2 }
            ),
            ExitCode::Conflict
        );
        assert_eq!(
            render(&formatter, &target, &DeleteOutcome::Cancelled),
            ExitCode::Interrupted
        );
        assert_eq!(
            render(
                &formatter,
                &target,
                &DeleteOutcome::Deleted {
                    emptied: DeleteReport::new()
                }
            ),
            ExitCode::Success
        );
        assert_eq!(
            render(
                &formatter,
                &target,
                &DeleteOutcome::NotDeleted {
                    emptied: DeleteReport::new(),
                    reason: "busy".into()
                }
            ),
            ExitCode::GeneralError
        );
    }

    #[test]
    fn test_json_output_shape() {
        let outcome = DeleteOutcome::RefusedNonEmpty { object_count: 4 };
        let output = RbOutput {
            bucket: "logs",
            outcome: &outcome,
        };
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["bucket"], "logs");
        assert_eq!(value["status"], "refused_non_empty");
        assert_eq!(value["object_count"], 4);
    }
}
