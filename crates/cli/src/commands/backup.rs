//! backup command - Upload local files and directory trees into a bucket
//!
//! Each file lands under its path relative to the root it was found in. A
//! root that is a single file lands under its base name.

use std::path::PathBuf;

use clap::Args;
use cs_core::{RemotePath, SyncSource};

use super::transfer::{SyncArgs, run_batch};
use super::{fail, open_store};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Upload local files and directories
#[derive(Args, Debug)]
pub struct BackupArgs {
    /// Local files or directories to upload
    #[arg(required = true)]
    pub sources: Vec<PathBuf>,

    /// Destination (profile/bucket[/prefix])
    pub destination: String,

    #[command(flatten)]
    pub sync: SyncArgs,
}

/// Execute the backup command
pub async fn execute(args: BackupArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let destination = match RemotePath::parse(&args.destination) {
        Ok(destination) => destination,
        Err(e) => return fail(&formatter, "Invalid destination", &e),
    };

    let (_, store) = match open_store(&destination.profile, &formatter).await {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    match store.container_exists(&destination.bucket).await {
        Ok(true) => {}
        Ok(false) => {
            formatter.error(&format!(
                "Bucket '{}/{}' does not exist",
                destination.profile, destination.bucket
            ));
            return ExitCode::NotFound;
        }
        Err(e) => return fail(&formatter, "Failed to check destination bucket", &e),
    }

    let sources: Vec<SyncSource> = args.sources.into_iter().map(SyncSource::Local).collect();
    run_batch(
        store.as_ref(),
        &sources,
        &destination,
        &args.sync,
        &formatter,
        "Backup",
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: BackupArgs,
    }

    #[test]
    fn test_many_sources_then_destination() {
        let harness = Harness::try_parse_from([
            "backup",
            "./docs",
            "./notes.txt",
            "aws/archive/nightly/",
            "--exclude",
            "*.tmp",
            "--concurrency",
            "4",
        ])
        .unwrap();

        assert_eq!(
            harness.args.sources,
            vec![PathBuf::from("./docs"), PathBuf::from("./notes.txt")]
        );
        assert_eq!(harness.args.destination, "aws/archive/nightly/");
        assert_eq!(harness.args.sync.exclude, vec!["*.tmp".to_string()]);
        assert_eq!(harness.args.sync.concurrency, Some(4));
    }

    #[test]
    fn test_destination_required() {
        assert!(Harness::try_parse_from(["backup", "./docs"]).is_err());
    }
}
