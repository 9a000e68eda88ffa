//! ls command - List buckets and objects
//!
//! `ls profile` numbers the buckets the profile can see; `ls profile/bucket[/prefix]`
//! lists every object under the prefix.

use clap::Args;
use cs_core::{ContainerInfo, ObjectInfo, ObjectStore};
use serde::Serialize;

use super::{fail, open_store};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// List buckets or objects
#[derive(Args, Debug)]
pub struct LsArgs {
    /// Profile, or profile/bucket[/prefix]
    pub path: String,

    /// Print totals after the listing
    #[arg(long)]
    pub summarize: bool,
}

#[derive(Debug, Serialize)]
struct BucketListOutput {
    buckets: Vec<ContainerInfo>,
}

#[derive(Debug, Serialize)]
struct ObjectListOutput {
    bucket: String,
    prefix: String,
    items: Vec<ObjectInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<Summary>,
}

#[derive(Debug, Serialize)]
struct Summary {
    total_objects: usize,
    total_size_bytes: i64,
    total_size_human: String,
}

impl Summary {
    fn of(items: &[ObjectInfo]) -> Self {
        let total_size_bytes: i64 = items.iter().map(|i| i.size_bytes).sum();
        Self {
            total_objects: items.len(),
            total_size_bytes,
            total_size_human: humansize::format_size(
                total_size_bytes.max(0) as u64,
                humansize::BINARY,
            ),
        }
    }
}

/// Execute the ls command
pub async fn execute(args: LsArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (profile_name, bucket, prefix) = match parse_ls_path(&args.path) {
        Ok(parsed) => parsed,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };

    let (_, store) = match open_store(&profile_name, &formatter).await {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    match bucket {
        None => list_buckets(store.as_ref(), &formatter).await,
        Some(bucket) => {
            list_objects(store.as_ref(), &bucket, &prefix, args.summarize, &formatter).await
        }
    }
}

async fn list_buckets(store: &dyn ObjectStore, formatter: &Formatter) -> ExitCode {
    let buckets = match store.list_containers().await {
        Ok(buckets) => buckets,
        Err(e) => return fail(formatter, "Failed to list buckets", &e),
    };

    if formatter.is_json() {
        formatter.json(&BucketListOutput { buckets });
        return ExitCode::Success;
    }

    if buckets.is_empty() {
        formatter.println("No buckets found.");
        return ExitCode::Success;
    }

    let mut table = formatter.new_table(["#", "Bucket", "Location", "Created"]);
    for (index, bucket) in buckets.iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            bucket.name.clone(),
            bucket.location.clone().unwrap_or_else(|| "-".into()),
            bucket
                .created
                .map(|t| t.strftime("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".into()),
        ]);
    }
    formatter.table(&table);
    ExitCode::Success
}

async fn list_objects(
    store: &dyn ObjectStore,
    bucket: &str,
    prefix: &str,
    summarize: bool,
    formatter: &Formatter,
) -> ExitCode {
    let items = match store.list_objects(bucket, prefix).await {
        Ok(items) => items,
        Err(e) => return fail(formatter, "Failed to list objects", &e),
    };

    if formatter.is_json() {
        let summary = summarize.then(|| Summary::of(&items));
        formatter.json(&ObjectListOutput {
            bucket: bucket.to_string(),
            prefix: prefix.to_string(),
            items,
            summary,
        });
        return ExitCode::Success;
    }

    for item in &items {
        let date = item
            .last_modified
            .map(|d| d.strftime("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| " ".repeat(19));
        formatter.println(&format!("[{date}] {:>10} {}", item.size_human, item.key));
    }

    if summarize {
        let summary = Summary::of(&items);
        formatter.println(&format!(
            "\nTotal: {} objects, {}",
            summary.total_objects, summary.total_size_human
        ));
    }

    ExitCode::Success
}

/// Parse ls path into (profile, bucket, prefix)
fn parse_ls_path(path: &str) -> Result<(String, Option<String>, String), String> {
    if path.trim_end_matches('/').is_empty() {
        return Err("Path cannot be empty".to_string());
    }

    let mut parts = path.splitn(3, '/');
    let profile = parts.next().unwrap_or_default().to_string();
    let bucket = parts.next().filter(|b| !b.is_empty()).map(str::to_string);
    let prefix = parts.next().unwrap_or_default().to_string();

    if profile.is_empty() {
        return Err(format!("Invalid path format: {path}"));
    }
    if bucket.is_none() && !prefix.is_empty() {
        return Err("Bucket name cannot be empty".to_string());
    }

    Ok((profile, bucket, prefix))
}
