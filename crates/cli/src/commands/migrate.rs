//! migrate command - Copy every object of one bucket into another
//!
//! Copies are server-side, so both buckets must be reached through the same
//! profile. A missing destination bucket is created with the profile's defaults.

use clap::Args;
use cs_core::{ObjectStore, Profile, RemotePath, SyncSource};

use super::mb::create_options;
use super::transfer::{SyncArgs, run_batch};
use super::{fail, open_store};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Copy every object of a bucket into another bucket
#[derive(Args, Debug)]
pub struct MigrateArgs {
    /// Source bucket (profile/bucket)
    pub source: String,

    /// Destination (profile/bucket[/prefix])
    pub destination: String,

    #[command(flatten)]
    pub sync: SyncArgs,
}

/// Parse both ends and check they share a profile
fn parse_ends(source: &str, destination: &str) -> cs_core::Result<(RemotePath, RemotePath)> {
    let source = RemotePath::parse_bucket(source)?;
    let destination = RemotePath::parse(destination)?;
    if source.profile != destination.profile {
        return Err(cs_core::Error::InvalidArgument(format!(
            "source and destination must use the same profile ('{}' vs '{}')",
            source.profile, destination.profile
        )));
    }
    Ok((source, destination))
}

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let (source, destination) = match parse_ends(&args.source, &args.destination) {
        Ok(ends) => ends,
        Err(e) => return fail(&formatter, "Invalid arguments", &e),
    };

    let (profile, store) = match open_store(&source.profile, &formatter).await {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    match store.container_exists(&source.bucket).await {
        Ok(true) => {}
        Ok(false) => {
            formatter.error(&format!("Source bucket '{source}' does not exist"));
            return ExitCode::NotFound;
        }
        Err(e) => return fail(&formatter, "Failed to check source bucket", &e),
    }

    if !args.sync.dry_run
        && let Err(code) = ensure_destination(store.as_ref(), &profile, &destination, &formatter).await
    {
        return code;
    }

    let sources = [SyncSource::Container(source.bucket.clone())];
    run_batch(
        store.as_ref(),
        &sources,
        &destination,
        &args.sync,
        &formatter,
        "Migrate",
    )
    .await
}

async fn ensure_destination(
    store: &dyn ObjectStore,
    profile: &Profile,
    destination: &RemotePath,
    formatter: &Formatter,
) -> Result<(), ExitCode> {
    let exists = store
        .container_exists(&destination.bucket)
        .await
        .map_err(|e| fail(formatter, "Failed to check destination bucket", &e))?;
    if exists {
        return Ok(());
    }

    let options = create_options(profile, None, None);
    store
        .create_container(&destination.bucket, &options)
        .await
        .map_err(|e| fail(formatter, "Failed to create destination bucket", &e))?;

    tracing::info!(bucket = %destination.bucket, "created destination bucket");
    formatter.success(&format!(
        "Created bucket '{}/{}'",
        destination.profile, destination.bucket
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ends_same_profile() {
        let (source, destination) = parse_ends("aws/old", "aws/new/2024/").unwrap();
        assert_eq!(source.bucket, "old");
        assert_eq!(destination.bucket, "new");
        assert_eq!(destination.prefix(), Some("2024/"));
    }

    #[test]
    fn test_parse_ends_rejects_cross_profile() {
        let err = parse_ends("aws/old", "gcp/new").unwrap_err();
        assert_eq!(ExitCode::from_error(&err), ExitCode::UsageError);
    }

    #[test]
    fn test_parse_ends_source_must_be_bucket() {
        assert!(parse_ends("aws/old/key", "aws/new").is_err());
    }
}
