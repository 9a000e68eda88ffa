//! mv command - Copy one object, then delete the source
//!
//! The source is left in place when the copy fails.

use clap::Args;
use cs_core::{RemotePath, object_ops};

use super::cp::{CopyOutput, parse_copy_ends};
use super::{fail, open_store};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Move one object
#[derive(Args, Debug)]
pub struct MvArgs {
    /// Source object (profile/bucket/key)
    pub source: String,

    /// Destination (profile/bucket[/key])
    pub target: String,
}

/// Execute the mv command
pub async fn execute(args: MvArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (source, target) = match parse_copy_ends(&args.source, &args.target) {
        Ok(ends) => ends,
        Err(e) => return fail(&formatter, "Invalid arguments", &e),
    };

    let (_, store) = match open_store(&source.profile, &formatter).await {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    match object_ops::move_object(
        store.as_ref(),
        &source.bucket,
        &source.key,
        &target.bucket,
        target.prefix(),
    )
    .await
    {
        Ok(key) => {
            let written = RemotePath::new(&target.profile, &target.bucket, key.as_str());
            if formatter.is_json() {
                formatter.json(&CopyOutput {
                    status: "success",
                    source: source.to_full_path(),
                    target: written.to_full_path(),
                });
            } else {
                formatter.success(&format!("{source} -> {written}"));
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Move failed", &e),
    }
}
