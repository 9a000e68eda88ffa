//! CLI command definitions and execution
//!
//! Each command lives in its own file with an `XArgs` struct and an
//! `execute` function returning an [`ExitCode`]. Shared plumbing (profile
//! lookup, store construction, error reporting) sits at the bottom of this file.

use clap::{Parser, Subcommand};
use cs_core::config::Defaults;
use cs_core::{ConfigManager, ObjectStore, Profile, ProfileManager, Provider};

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};

mod backup;
mod completions;
mod cp;
mod empty;
mod get;
mod info;
mod instances;
mod ls;
mod mb;
mod migrate;
mod mv;
mod profile;
mod put;
mod rb;
mod rename;
mod rm;
mod transfer;

/// cstash - cloud bucket stash
///
/// Manage buckets and objects on Amazon S3, S3-compatible services and
/// Google Cloud Storage. Back up local trees, migrate buckets and start
/// stopped compute instances.
#[derive(Parser, Debug)]
#[command(name = "cstash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage storage profiles
    #[command(subcommand)]
    Profile(profile::ProfileCommands),

    /// List buckets, or objects in a bucket
    Ls(ls::LsArgs),

    /// Create a bucket
    Mb(mb::MbArgs),

    /// Remove a bucket
    Rb(rb::RbArgs),

    /// Show bucket metadata
    Info(info::InfoArgs),

    /// Delete every object in a bucket, keeping the bucket
    Empty(empty::EmptyArgs),

    /// Upload local files and directories into a bucket
    Backup(backup::BackupArgs),

    /// Copy every object of one bucket into another
    Migrate(migrate::MigrateArgs),

    /// Upload one local file
    Put(put::PutArgs),

    /// Download one object
    Get(get::GetArgs),

    /// Copy one object
    Cp(cp::CpArgs),

    /// Move one object (copy, then delete the source)
    Mv(mv::MvArgs),

    /// Rename an object within its bucket
    Rename(rename::RenameArgs),

    /// Delete one object
    Rm(rm::RmArgs),

    /// List compute instances and start stopped ones
    Instances(instances::InstancesArgs),

    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let defaults = match ConfigManager::new().and_then(|manager| manager.load()) {
        Ok(config) => config.defaults,
        Err(e) => {
            tracing::warn!(error = %e, "ignoring configuration defaults");
            Defaults::default()
        }
    };
    let output_config = output_config(&cli, &defaults);

    match cli.command {
        Commands::Profile(cmd) => profile::execute(cmd, output_config).await,
        Commands::Ls(args) => ls::execute(args, output_config).await,
        Commands::Mb(args) => mb::execute(args, output_config).await,
        Commands::Rb(args) => rb::execute(args, output_config).await,
        Commands::Info(args) => info::execute(args, output_config).await,
        Commands::Empty(args) => empty::execute(args, output_config).await,
        Commands::Backup(args) => backup::execute(args, output_config).await,
        Commands::Migrate(args) => migrate::execute(args, output_config).await,
        Commands::Put(args) => put::execute(args, output_config).await,
        Commands::Get(args) => get::execute(args, output_config).await,
        Commands::Cp(args) => cp::execute(args, output_config).await,
        Commands::Mv(args) => mv::execute(args, output_config).await,
        Commands::Rename(args) => rename::execute(args, output_config).await,
        Commands::Rm(args) => rm::execute(args, output_config).await,
        Commands::Instances(args) => instances::execute(args, output_config).await,
        Commands::Completions(args) => completions::execute(args),
    }
}

/// Merge the global flags with the `[defaults]` table; a flag always wins
fn output_config(cli: &Cli, defaults: &Defaults) -> OutputConfig {
    let config = OutputConfig {
        json: cli.json || defaults.output == "json",
        no_color: cli.no_color || defaults.color == "never",
        no_progress: cli.no_progress || !defaults.progress,
        quiet: cli.quiet,
    };
    if defaults.color == "always" && !config.no_color && !config.json {
        console::set_colors_enabled(true);
        console::set_colors_enabled_stderr(true);
    }
    config
}

/// Print `err` with some context and map it to its exit code
pub(crate) fn fail(formatter: &Formatter, context: &str, err: &cs_core::Error) -> ExitCode {
    formatter.error(&format!("{context}: {err}"));
    ExitCode::from_error(err)
}

/// Look up a profile by name
pub(crate) fn load_profile(name: &str, formatter: &Formatter) -> Result<Profile, ExitCode> {
    let manager = ProfileManager::new().map_err(|e| fail(formatter, "Failed to load profiles", &e))?;
    manager
        .get(name)
        .map_err(|e| fail(formatter, "Cannot use profile", &e))
}

/// Build the store for a profile's provider
pub(crate) async fn connect(profile: &Profile) -> cs_core::Result<Box<dyn ObjectStore>> {
    match profile.provider {
        Provider::S3 => Ok(Box::new(cs_aws::S3Client::new(profile).await?)),
        #[cfg(feature = "gcs")]
        Provider::Gcs => Ok(Box::new(cs_gcs::GcsClient::new(profile).await?)),
        #[cfg(not(feature = "gcs"))]
        Provider::Gcs => Err(cs_core::Error::UnsupportedFeature(
            "this build of cstash has no GCS support".into(),
        )),
    }
}

/// Look up a profile and connect to its store
pub(crate) async fn open_store(
    profile_name: &str,
    formatter: &Formatter,
) -> Result<(Profile, Box<dyn ObjectStore>), ExitCode> {
    let profile = load_profile(profile_name, formatter)?;
    let store = connect(&profile)
        .await
        .map_err(|e| fail(formatter, "Failed to create client", &e))?;
    Ok((profile, store))
}

/// Transfers per batch from the config file
pub(crate) fn default_concurrency() -> usize {
    ConfigManager::new()
        .and_then(|manager| manager.load())
        .map(|config| config.defaults.concurrency)
        .unwrap_or(1)
}
