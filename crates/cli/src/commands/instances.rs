//! instances command - List compute instances and start the stopped ones
//!
//! Only AWS profiles carry compute instances.

use clap::Args;
use cs_core::{BatchReport, InstanceInfo, InstanceService, Profile, Provider, start_stopped};
use serde::Serialize;

use super::{fail, load_profile};
use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig, print_report};
use crate::prompt::Prompt;

/// List compute instances
#[derive(Args, Debug)]
pub struct InstancesArgs {
    /// Profile to use (must be an s3 profile backed by AWS)
    pub profile: String,

    /// Start every instance that is stopped
    #[arg(long)]
    pub start_stopped: bool,

    /// Do not ask for confirmation
    #[arg(short = 'y', long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
struct InstancesOutput {
    instances: Vec<InstanceInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    started: Option<BatchReport<String>>,
}

fn require_aws(profile: &Profile) -> cs_core::Result<()> {
    if profile.provider != Provider::S3 || profile.endpoint.is_some() {
        return Err(cs_core::Error::UnsupportedFeature(format!(
            "profile '{}' is not an AWS profile; compute instances need AWS",
            profile.name
        )));
    }
    Ok(())
}

/// Execute the instances command
pub async fn execute(args: InstancesArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config);

    let profile = match load_profile(&args.profile, &formatter) {
        Ok(profile) => profile,
        Err(code) => return code,
    };
    if let Err(e) = require_aws(&profile) {
        return fail(&formatter, "Cannot list instances", &e);
    }

    let service = match cs_aws::Ec2Client::new(&profile).await {
        Ok(service) => service,
        Err(e) => return fail(&formatter, "Failed to create client", &e),
    };

    let instances = match service.list_instances().await {
        Ok(instances) => instances,
        Err(e) => return fail(&formatter, "Failed to list instances", &e),
    };

    if !formatter.is_json() {
        print_instances(&formatter, &instances);
    }

    let stopped = instances.iter().filter(|i| i.is_stopped()).count();
    let started = if args.start_stopped && stopped > 0 {
        let prompt = Prompt::new(args.yes, formatter.config());
        if !prompt.ask(&format!("Start {stopped} stopped instances?")) {
            formatter.warning("Aborted, no instance was started.");
            return ExitCode::Interrupted;
        }
        match start_stopped(&service).await {
            Ok(report) => Some(report),
            Err(e) => return fail(&formatter, "Failed to start instances", &e),
        }
    } else {
        if args.start_stopped {
            formatter.println("No stopped instances.");
        }
        None
    };

    if formatter.is_json() {
        formatter.json(&InstancesOutput {
            instances,
            started: started.clone(),
        });
    }

    match started {
        Some(report) => {
            print_report(&formatter, "Instances started", &report);
            if report.is_success() {
                ExitCode::Success
            } else {
                ExitCode::GeneralError
            }
        }
        None => ExitCode::Success,
    }
}

fn print_instances(formatter: &Formatter, instances: &[InstanceInfo]) {
    if instances.is_empty() {
        formatter.println("No instances found.");
        return;
    }

    let mut table = formatter.new_table(["#", "Instance", "Type", "State"]);
    for (index, instance) in instances.iter().enumerate() {
        table.add_row(vec![
            (index + 1).to_string(),
            instance.id.clone(),
            instance.instance_type.clone(),
            instance.state.clone(),
        ]);
    }
    formatter.table(&table);
}
