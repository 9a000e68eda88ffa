//! info command - Show bucket metadata

use clap::Args;
use cs_core::{ContainerInfo, Error, RemotePath};
use serde::Serialize;

use super::{fail, open_store};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Show bucket metadata
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Target path (profile/bucket)
    pub target: String,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    exists: bool,
    #[serde(flatten)]
    info: Option<ContainerInfo>,
}

/// Execute the info command
pub async fn execute(args: InfoArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let target = match RemotePath::parse_bucket(&args.target) {
        Ok(target) => target,
        Err(e) => return fail(&formatter, "Invalid target", &e),
    };

    let (_, store) = match open_store(&target.profile, &formatter).await {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    match store.container_info(&target.bucket).await {
        Ok(info) => {
            if formatter.is_json() {
                formatter.json(&InfoOutput {
                    exists: true,
                    info: Some(info),
                });
            } else {
                formatter.table(&info_table(&formatter, &info));
            }
            ExitCode::Success
        }
        Err(Error::NotFound(_)) => {
            if formatter.is_json() {
                formatter.json(&InfoOutput {
                    exists: false,
                    info: None,
                });
            } else {
                formatter.error(&format!("Bucket '{target}' does not exist"));
            }
            ExitCode::NotFound
        }
        Err(e) => fail(&formatter, "Failed to get bucket info", &e),
    }
}

fn info_table(formatter: &Formatter, info: &ContainerInfo) -> comfy_table::Table {
    let mut table = formatter.new_table(["Property", "Value"]);
    table.add_row(vec!["Name", info.name.as_str()]);
    table.add_row(vec!["Location", info.location.as_deref().unwrap_or("-")]);
    table.add_row(vec![
        "Storage class",
        info.storage_class.as_deref().unwrap_or("-"),
    ]);
    let created = info
        .created
        .map(|t| t.strftime("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "-".into());
    table.add_row(vec!["Created".to_string(), created]);
    for (key, value) in &info.extra {
        table.add_row(vec![key.as_str(), value.as_str()]);
    }
    table
}
