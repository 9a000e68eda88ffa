//! put command - Upload one local file

use std::path::PathBuf;

use clap::Args;
use cs_core::{ObjectInfo, RemotePath, object_ops};
use serde::Serialize;

use super::{fail, open_store};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Upload one local file
#[derive(Args, Debug)]
pub struct PutArgs {
    /// Local file to upload
    pub source: PathBuf,

    /// Target (profile/bucket[/key]); a key ending in '/' is a prefix
    pub target: String,
}

#[derive(Debug, Serialize)]
struct PutOutput {
    status: &'static str,
    source: String,
    bucket: String,
    #[serde(flatten)]
    object: ObjectInfo,
}

/// Execute the put command
pub async fn execute(args: PutArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let target = match RemotePath::parse(&args.target) {
        Ok(target) => target,
        Err(e) => return fail(&formatter, "Invalid target", &e),
    };

    let (_, store) = match open_store(&target.profile, &formatter).await {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    let spinner = ProgressBar::spinner(
        formatter.config(),
        &format!("Uploading {}", args.source.display()),
    );
    let result = object_ops::upload(store.as_ref(), &args.source, &target.bucket, target.prefix()).await;
    spinner.finish_and_clear();

    match result {
        Ok(object) => {
            if formatter.is_json() {
                formatter.json(&PutOutput {
                    status: "success",
                    source: args.source.display().to_string(),
                    bucket: target.bucket,
                    object,
                });
            } else {
                formatter.success(&format!(
                    "{} -> {}/{}/{} ({})",
                    args.source.display(),
                    target.profile,
                    target.bucket,
                    object.key,
                    object.size_human
                ));
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Upload failed", &e),
    }
}
