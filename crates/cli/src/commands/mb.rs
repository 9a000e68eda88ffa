//! mb command - Make bucket
//!
//! Creates a bucket. Region and storage class fall back to the profile's defaults.

use clap::Args;
use cs_core::{CreateContainerOptions, Error, Profile, RemotePath};
use serde::Serialize;

use super::{fail, open_store};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Create a bucket
#[derive(Args, Debug)]
pub struct MbArgs {
    /// Target path (profile/bucket)
    pub target: String,

    /// Succeed if the bucket already exists
    #[arg(short = 'p', long)]
    pub ignore_existing: bool,

    /// Region (S3) or location (GCS) for the bucket
    #[arg(long)]
    pub region: Option<String>,

    /// Default storage class for the bucket
    #[arg(long)]
    pub storage_class: Option<String>,
}

#[derive(Debug, Serialize)]
struct MbOutput {
    status: &'static str,
    bucket: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Creation options from the command line, falling back to the profile
pub(crate) fn create_options(
    profile: &Profile,
    region: Option<String>,
    storage_class: Option<String>,
) -> CreateContainerOptions {
    CreateContainerOptions {
        region: region.or_else(|| profile.default_bucket_region().map(str::to_owned)),
        storage_class: storage_class.or_else(|| profile.storage_class.clone()),
    }
}

/// Execute the mb command
pub async fn execute(args: MbArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let target = match RemotePath::parse_bucket(&args.target) {
        Ok(target) => target,
        Err(e) => return fail(&formatter, "Invalid target", &e),
    };

    let (profile, store) = match open_store(&target.profile, &formatter).await {
        Ok(opened) => opened,
        Err(code) => return code,
    };

    let options = create_options(&profile, args.region, args.storage_class);
    tracing::debug!(bucket = %target.bucket, ?options, "creating bucket");

    match store.create_container(&target.bucket, &options).await {
        Ok(()) => {
            report(&formatter, &target, None);
            ExitCode::Success
        }
        Err(Error::AlreadyExists(_)) if args.ignore_existing => {
            report(&formatter, &target, Some("Bucket already exists"));
            ExitCode::Success
        }
        Err(e) => fail(&formatter, "Failed to create bucket", &e),
    }
}

fn report(formatter: &Formatter, target: &RemotePath, message: Option<&str>) {
    if formatter.is_json() {
        formatter.json(&MbOutput {
            status: "success",
            bucket: target.bucket.clone(),
            message: message.map(str::to_owned),
        });
    } else if message.is_some() {
        formatter.success(&format!("Bucket '{target}' already exists."));
    } else {
        formatter.success(&format!("Bucket '{target}' created successfully."));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cs_core::Provider;

    #[test]
    fn test_create_options_fall_back_to_profile() {
        let mut profile = Profile::new("gcp", Provider::Gcs);
        profile.location = Some("EU".to_string());
        profile.storage_class = Some("NEARLINE".to_string());

        let options = create_options(&profile, None, None);
        assert_eq!(options.region.as_deref(), Some("EU"));
        assert_eq!(options.storage_class.as_deref(), Some("NEARLINE"));
    }

    #[test]
    fn test_create_options_flags_win() {
        let mut profile = Profile::new("aws", Provider::S3);
        profile.region = Some("us-east-1".to_string());

        let options = create_options(
            &profile,
            Some("eu-central-1".to_string()),
            Some("STANDARD_IA".to_string()),
        );
        assert_eq!(options.region.as_deref(), Some("eu-central-1"));
        assert_eq!(options.storage_class.as_deref(), Some("STANDARD_IA"));
    }
}
