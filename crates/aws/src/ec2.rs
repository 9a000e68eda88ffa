//! EC2 client implementation
//!
//! Implements the InstanceService trait from cs-core over aws-sdk-ec2.

use async_trait::async_trait;

use cs_core::{InstanceInfo, InstanceService, Profile, Result};

use crate::error::classify;

pub struct Ec2Client {
    inner: aws_sdk_ec2::Client,
}

impl Ec2Client {
    /// Create a new EC2 client from a profile
    ///
    /// The profile endpoint is an S3 endpoint and is not applied here.
    pub async fn new(profile: &Profile) -> Result<Self> {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = &profile.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }
        let config = loader.load().await;

        Ok(Self {
            inner: aws_sdk_ec2::Client::new(&config),
        })
    }
}

fn instance_info(instance: &aws_sdk_ec2::types::Instance) -> InstanceInfo {
    InstanceInfo {
        id: instance.instance_id().unwrap_or_default().to_string(),
        instance_type: instance
            .instance_type()
            .map(|t| t.as_str().to_string())
            .unwrap_or_default(),
        state: instance
            .state()
            .and_then(|s| s.name())
            .map(|n| n.as_str().to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    }
}

#[async_trait]
impl InstanceService for Ec2Client {
    async fn list_instances(&self) -> Result<Vec<InstanceInfo>> {
        let mut instances = Vec::new();
        let mut token: Option<String> = None;

        loop {
            let response = self
                .inner
                .describe_instances()
                .set_next_token(token.take())
                .send()
                .await
                .map_err(|e| classify(e, "instances"))?;

            for reservation in response.reservations() {
                instances.extend(reservation.instances().iter().map(instance_info));
            }

            match response.next_token() {
                Some(next) if !next.is_empty() => token = Some(next.to_string()),
                _ => break,
            }
        }

        Ok(instances)
    }

    async fn start_instance(&self, id: &str) -> Result<()> {
        let response = self
            .inner
            .start_instances()
            .instance_ids(id)
            .send()
            .await
            .map_err(|e| classify(e, id))?;

        for change in response.starting_instances() {
            tracing::info!(
                id = change.instance_id().unwrap_or_default(),
                from = ?change.previous_state().and_then(|s| s.name()),
                to = ?change.current_state().and_then(|s| s.name()),
                "instance starting"
            );
        }
        Ok(())
    }
}
