//! Profile management commands
//!
//! Profiles are named references to a cloud storage account: provider,
//! region or endpoint, and bucket creation defaults. Credentials are not
//! stored; each SDK resolves them from its default chain.

use clap::Subcommand;
use cs_core::{Profile, ProfileManager, Provider};
use serde::Serialize;

use super::fail;
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

/// Profile subcommands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Add or update a profile
    Set(SetArgs),

    /// List all configured profiles
    List,

    /// Remove a profile
    Remove(RemoveArgs),
}

/// Arguments for the `profile set` command
#[derive(clap::Args, Debug)]
pub struct SetArgs {
    /// Profile name (e.g., "aws", "gcp", "minio")
    pub name: String,

    /// Cloud provider: s3 or gcs
    #[arg(long, default_value = "s3")]
    pub provider: String,

    /// Region for API calls and new buckets (S3)
    #[arg(long)]
    pub region: Option<String>,

    /// Custom endpoint URL for S3-compatible services
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Project that owns new buckets (GCS)
    #[arg(long)]
    pub project: Option<String>,

    /// Default location for new buckets (GCS), e.g. "US" or "EUROPE-WEST1"
    #[arg(long)]
    pub location: Option<String>,

    /// Default storage class for new buckets
    #[arg(long)]
    pub storage_class: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long, default_value = "false")]
    pub path_style: bool,
}

/// Arguments for the `profile remove` command
#[derive(clap::Args, Debug)]
pub struct RemoveArgs {
    /// Name of the profile to remove
    pub name: String,
}

#[derive(Serialize)]
struct ProfileListOutput {
    profiles: Vec<Profile>,
}

#[derive(Serialize)]
struct ProfileOperationOutput {
    success: bool,
    profile: String,
    message: String,
}

/// Execute a profile subcommand
pub async fn execute(cmd: ProfileCommands, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let manager = match ProfileManager::new() {
        Ok(manager) => manager,
        Err(e) => return fail(&formatter, "Failed to load configuration", &e),
    };

    match cmd {
        ProfileCommands::Set(args) => execute_set(args, &manager, &formatter),
        ProfileCommands::List => execute_list(&manager, &formatter),
        ProfileCommands::Remove(args) => execute_remove(args, &manager, &formatter),
    }
}

fn build_profile(args: SetArgs) -> cs_core::Result<Profile> {
    let provider: Provider = args.provider.parse()?;
    let mut profile = Profile::new(args.name, provider);
    profile.region = args.region;
    profile.endpoint = args.endpoint;
    profile.project = args.project;
    profile.location = args.location;
    profile.storage_class = args.storage_class;
    profile.path_style = args.path_style;
    Ok(profile)
}

fn execute_set(args: SetArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    let profile = match build_profile(args) {
        Ok(profile) => profile,
        Err(e) => return fail(formatter, "Invalid profile", &e),
    };
    let name = profile.name.clone();

    if let Err(e) = manager.set(profile) {
        return fail(formatter, "Failed to save profile", &e);
    }

    let message = format!("Profile '{name}' configured successfully");
    if formatter.is_json() {
        formatter.json(&ProfileOperationOutput {
            success: true,
            profile: name,
            message,
        });
    } else {
        formatter.success(&message);
    }
    ExitCode::Success
}

fn execute_list(manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    let profiles = match manager.list() {
        Ok(profiles) => profiles,
        Err(e) => return fail(formatter, "Failed to list profiles", &e),
    };

    if formatter.is_json() {
        formatter.json(&ProfileListOutput { profiles });
        return ExitCode::Success;
    }

    if profiles.is_empty() {
        formatter.println("No profiles configured.");
        return ExitCode::Success;
    }

    let mut table = formatter.new_table(["Name", "Provider", "Region", "Endpoint / Project"]);
    for profile in &profiles {
        let target = match profile.provider {
            Provider::S3 => profile.endpoint.clone().unwrap_or_else(|| "-".into()),
            Provider::Gcs => profile.project.clone().unwrap_or_else(|| "-".into()),
        };
        table.add_row(vec![
            profile.name.clone(),
            profile.provider.to_string(),
            profile.default_bucket_region().unwrap_or("-").to_string(),
            target,
        ]);
    }
    formatter.table(&table);
    ExitCode::Success
}

fn execute_remove(args: RemoveArgs, manager: &ProfileManager, formatter: &Formatter) -> ExitCode {
    if let Err(e) = manager.remove(&args.name) {
        return fail(formatter, "Failed to remove profile", &e);
    }

    let message = format!("Profile '{}' removed successfully", args.name);
    if formatter.is_json() {
        formatter.json(&ProfileOperationOutput {
            success: true,
            profile: args.name,
            message,
        });
    } else {
        formatter.success(&message);
    }
    ExitCode::Success
}
