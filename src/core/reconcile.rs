use std::fmt::{self, Display};
use tracing::debug;

use crate::core::client::{ApiError, EndpointApi, WorkloadApi};
use crate::core::manifest::{Endpoint, Workload};

/// Outcome of reconciling one object against the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    Created,
    Replaced,
    Skipped { reason: String },
    Failed { reason: String },
}

impl ApplyOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, ApplyOutcome::Failed { .. })
    }
}

impl Display for ApplyOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApplyOutcome::Created => write!(f, "created"),
            ApplyOutcome::Replaced => write!(f, "replaced"),
            ApplyOutcome::Skipped { .. } => write!(f, "skipped"),
            ApplyOutcome::Failed { reason } => write!(f, "failed: {}", reason),
        }
    }
}

/// Create the workload, replacing it in full when the name is already taken.
/// Any other cluster error fails this object immediately, without retry.
pub async fn apply_workload<C>(client: &C, namespace: &str, workload: &Workload) -> ApplyOutcome
where
    C: WorkloadApi + Sync,
{
    match client.create_workload(namespace, workload).await {
        Ok(()) => ApplyOutcome::Created,
        Err(ApiError::Conflict { .. }) => {
            debug!(
                "Workload {} already exists, replacing it",
                workload.metadata.name
            );
            match client.replace_workload(namespace, workload).await {
                Ok(()) => ApplyOutcome::Replaced,
                Err(source) => ApplyOutcome::Failed {
                    reason: source.to_string(),
                },
            }
        }
        Err(source) => ApplyOutcome::Failed {
            reason: source.to_string(),
        },
    }
}

/// Create the endpoint. An existing endpoint is deliberately left untouched:
/// replacing it would tear down the network path already bound to it.
pub async fn apply_endpoint<C>(client: &C, namespace: &str, endpoint: &Endpoint) -> ApplyOutcome
where
    C: EndpointApi + Sync,
{
    match client.create_endpoint(namespace, endpoint).await {
        Ok(()) => ApplyOutcome::Created,
        Err(ApiError::Conflict { .. }) => ApplyOutcome::Skipped {
            reason: format!(
                "endpoint {} already exists; replacing it would disrupt its bound connections",
                endpoint.metadata.name
            ),
        },
        Err(source) => ApplyOutcome::Failed {
            reason: source.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{base_endpoint, base_workload, FakeCluster};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn workload_is_created_when_the_name_is_free() {
        let cluster = FakeCluster::new();
        let workload = base_workload();

        let outcome = apply_workload(&cluster, "stream-viewers", &workload).await;

        assert_eq!(outcome, ApplyOutcome::Created);
        assert_eq!(cluster.calls(), vec!["create_workload viewer"]);
    }

    #[tokio::test]
    async fn workload_conflict_falls_back_to_replace() {
        let cluster = FakeCluster::new().with_existing_workload("viewer");
        let workload = base_workload();

        let outcome = apply_workload(&cluster, "stream-viewers", &workload).await;

        assert_eq!(outcome, ApplyOutcome::Replaced);
        assert_eq!(
            cluster.calls(),
            vec!["create_workload viewer", "replace_workload viewer"]
        );
    }

    #[tokio::test]
    async fn workload_replace_error_is_reported() {
        let cluster = FakeCluster::new()
            .with_existing_workload("viewer")
            .with_broken_replace("viewer");
        let workload = base_workload();

        let outcome = apply_workload(&cluster, "stream-viewers", &workload).await;

        assert!(outcome.is_failed());
    }

    #[tokio::test]
    async fn workload_other_error_fails_without_replace_attempt() {
        let cluster = FakeCluster::new().with_broken_workload("viewer");
        let workload = base_workload();

        let outcome = apply_workload(&cluster, "stream-viewers", &workload).await;

        assert!(outcome.is_failed());
        assert_eq!(cluster.calls(), vec!["create_workload viewer"]);
    }

    #[tokio::test]
    async fn endpoint_conflict_is_skipped_never_replaced() {
        let cluster = FakeCluster::new().with_existing_endpoint("viewer-endpoint");
        let endpoint = base_endpoint();

        let outcome = apply_endpoint(&cluster, "stream-viewers", &endpoint).await;

        assert!(matches!(outcome, ApplyOutcome::Skipped { .. }));
        assert_eq!(cluster.calls(), vec!["create_endpoint viewer-endpoint"]);
    }

    #[tokio::test]
    async fn endpoint_is_created_when_the_name_is_free() {
        let cluster = FakeCluster::new();
        let endpoint = base_endpoint();

        let outcome = apply_endpoint(&cluster, "stream-viewers", &endpoint).await;

        assert_eq!(outcome, ApplyOutcome::Created);
    }
}
