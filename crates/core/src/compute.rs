//! Compute instance listing and starting

use async_trait::async_trait;
use serde::Serialize;

use crate::error::Result;
use crate::report::BatchReport;

/// State name providers use for a stopped instance
pub const STOPPED: &str = "stopped";

/// One compute instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceInfo {
    pub id: String,
    pub instance_type: String,
    pub state: String,
}

impl InstanceInfo {
    pub fn is_stopped(&self) -> bool {
        self.state.eq_ignore_ascii_case(STOPPED)
    }
}

/// Trait for compute instance operations
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InstanceService: Send + Sync {
    /// List every instance visible to the profile
    async fn list_instances(&self) -> Result<Vec<InstanceInfo>>;

    /// Start one instance
    async fn start_instance(&self, id: &str) -> Result<()>;
}

/// Start every stopped instance, one independent call each
///
/// A failed start is recorded and the remaining instances are still started.
pub async fn start_stopped(service: &dyn InstanceService) -> Result<BatchReport<String>> {
    let stopped: Vec<InstanceInfo> = service
        .list_instances()
        .await?
        .into_iter()
        .filter(InstanceInfo::is_stopped)
        .collect();

    tracing::info!(count = stopped.len(), "starting stopped instances");

    let mut report = BatchReport::new();
    for instance in stopped {
        let outcome = service.start_instance(&instance.id).await;
        if let Err(e) = &outcome {
            tracing::warn!(id = %instance.id, error = %e, "instance start failed");
        }
        report.record(instance.id, outcome);
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use mockall::predicate::eq;

    fn instance(id: &str, state: &str) -> InstanceInfo {
        InstanceInfo {
            id: id.to_string(),
            instance_type: "t3.micro".to_string(),
            state: state.to_string(),
        }
    }

    #[tokio::test]
    async fn test_start_stopped_only_touches_stopped() {
        let mut service = MockInstanceService::new();
        service.expect_list_instances().returning(|| {
            Ok(vec![
                instance("i-1", "running"),
                instance("i-2", "stopped"),
                instance("i-3", "stopping"),
                instance("i-4", "stopped"),
            ])
        });
        service
            .expect_start_instance()
            .with(eq("i-2"))
            .times(1)
            .returning(|_| Ok(()));
        service
            .expect_start_instance()
            .with(eq("i-4"))
            .times(1)
            .returning(|_| Err(Error::Remote("insufficient capacity".into())));

        let report = start_stopped(&service).await.unwrap();

        assert_eq!(report.total, 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed[0].item, "i-4");
        assert!(report.failed[0].reason.contains("insufficient capacity"));
    }

    #[tokio::test]
    async fn test_start_stopped_with_nothing_stopped() {
        let mut service = MockInstanceService::new();
        service
            .expect_list_instances()
            .returning(|| Ok(vec![instance("i-1", "running")]));
        service.expect_start_instance().never();

        let report = start_stopped(&service).await.unwrap();
        assert_eq!(report.total, 0);
        assert!(report.is_success());
    }

    #[tokio::test]
    async fn test_list_failure_propagates() {
        let mut service = MockInstanceService::new();
        service
            .expect_list_instances()
            .returning(|| Err(Error::Auth("expired token".into())));

        assert!(matches!(
            start_stopped(&service).await,
            Err(Error::Auth(_))
        ));
    }
}
