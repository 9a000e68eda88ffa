//! rm command - Delete one object

use clap::Args;
use cs_core::{RemotePath, object_ops};
use serde::Serialize;

use super::{fail, open_store};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use crate::prompt::Prompt;

/// Delete one object
#[derive(Args, Debug)]
pub struct RmArgs {
    /// Object to delete (profile/bucket/key)
    pub target: String,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
struct RmOutput {
    status: &'static str,
    deleted: String,
}

/// Execute the rm command
pub async fn execute(args: RmArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let target = match RemotePath::parse_object(&args.target) {
        Ok(target) => target,
        Err(e) => return fail(&formatter, "Invalid target", &e),
    };

    let prompt = Prompt::new(args.yes, formatter.config());
    if !prompt.ask(&format!("Delete '{target}'?")) {
        formatter.warning("Aborted, nothing was deleted.");
        return ExitCode::Interrupted;
    }

    let (_, store) = match open_store(&target.profile, &formatter).await {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    match object_ops::delete(store.as_ref(), &target.bucket, &target.key).await {
        Ok(()) => {
            if formatter.is_json() {
                formatter.json(&RmOutput {
                    status: "success",
                    deleted: target.to_full_path(),
                });
            } else {
                formatter.success(&format!("Removed '{target}'"));
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Delete failed", &e),
    }
}
