//! get command - Download one object

use std::path::PathBuf;

use clap::Args;
use cs_core::{RemotePath, object_ops};
use serde::Serialize;

use super::{fail, open_store};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, ProgressBar};

/// Download one object
#[derive(Args, Debug)]
pub struct GetArgs {
    /// Object to download (profile/bucket/key)
    pub source: String,

    /// Local destination file or directory (defaults to the key's base name)
    pub destination: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct GetOutput {
    status: &'static str,
    source: String,
    destination: String,
    size_bytes: u64,
}

/// Execute the get command
pub async fn execute(args: GetArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let source = match RemotePath::parse_object(&args.source) {
        Ok(source) => source,
        Err(e) => return fail(&formatter, "Invalid source", &e),
    };

    let (_, store) = match open_store(&source.profile, &formatter).await {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    let spinner = ProgressBar::spinner(formatter.config(), &format!("Downloading {source}"));
    let result = object_ops::download(
        store.as_ref(),
        &source.bucket,
        &source.key,
        args.destination.as_deref(),
    )
    .await;
    spinner.finish_and_clear();

    match result {
        Ok((path, size)) => {
            if formatter.is_json() {
                formatter.json(&GetOutput {
                    status: "success",
                    source: source.to_full_path(),
                    destination: path.display().to_string(),
                    size_bytes: size,
                });
            } else {
                formatter.success(&format!(
                    "{source} -> {} ({})",
                    path.display(),
                    humansize::format_size(size, humansize::BINARY)
                ));
            }
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Download failed", &e),
    }
}
