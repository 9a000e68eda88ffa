//! rename command - Give an object a new key within its bucket

use clap::Args;
use cs_core::{RemotePath, object_ops};
use serde::Serialize;

use super::{fail, open_store};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Rename an object
#[derive(Args, Debug)]
pub struct RenameArgs {
    /// Object to rename (profile/bucket/key)
    pub source: String,

    /// New key in the same bucket
    pub new_key: String,
}

#[derive(Debug, Serialize)]
struct RenameOutput {
    status: &'static str,
    bucket: String,
    from: String,
    to: String,
}

/// Execute the rename command
pub async fn execute(args: RenameArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let source = match RemotePath::parse_object(&args.source) {
        Ok(source) => source,
        Err(e) => return fail(&formatter, "Invalid source", &e),
    };

    let (_, store) = match open_store(&source.profile, &formatter).await {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    match object_ops::rename(store.as_ref(), &source.bucket, &source.key, &args.new_key).await {
        Ok(key) => {
            if formatter.is_json() {
                formatter.json(&RenameOutput {
                    status: "success",
                    bucket: source.bucket.clone(),
                    from: source.key.clone(),
                    to: key.to_string(),
                });
            } else {
                formatter.success(&format!("{source} renamed to {key}"));
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Rename failed", &e),
    }
}
