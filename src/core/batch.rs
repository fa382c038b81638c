use std::path::PathBuf;
use tracing::{info, warn};

use crate::core::client::{EndpointApi, IdentityApi, WorkloadApi};
use crate::core::constants::{ENDPOINT_KIND, WORKLOAD_KIND};
use crate::core::manifest::{Endpoint, Workload};
use crate::core::materialize::{materialize, MaterializeWarning};
use crate::core::pool::{self, PoolError};
use crate::core::reconcile::{apply_endpoint, apply_workload, ApplyOutcome};
use crate::core::template::{self, TemplateError};

/// Run-level configuration, assembled by the CLI layer.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub stream_url: String,
    pub instances: usize,
    pub template_file: PathBuf,
    pub namespace: String,
    pub identity_store: String,
    pub replicas: u16,
}

/// Errors that abort a run during setup, before any instance is applied.
/// Per-instance reconciliation outcomes are recorded in the summary instead.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Pool(#[from] PoolError),
}

/// Everything recorded about one instance of the batch.
#[derive(Debug, Clone)]
pub struct InstanceReport {
    pub index: usize,
    pub workload_name: String,
    pub identity: String,
    pub workload: ApplyOutcome,
    pub endpoint: Option<ApplyOutcome>,
    pub warnings: Vec<MaterializeWarning>,
}

impl InstanceReport {
    fn outcomes(&self) -> impl Iterator<Item = &ApplyOutcome> {
        std::iter::once(&self.workload).chain(self.endpoint.as_ref())
    }
}

#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    pub reports: Vec<InstanceReport>,
}

impl RunSummary {
    fn count(&self, matching: impl Fn(&ApplyOutcome) -> bool) -> usize {
        self.reports
            .iter()
            .flat_map(InstanceReport::outcomes)
            .filter(|outcome| matching(outcome))
            .count()
    }

    pub fn created(&self) -> usize {
        self.count(|outcome| matches!(outcome, ApplyOutcome::Created))
    }

    pub fn replaced(&self) -> usize {
        self.count(|outcome| matches!(outcome, ApplyOutcome::Replaced))
    }

    pub fn skipped(&self) -> usize {
        self.count(|outcome| matches!(outcome, ApplyOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(ApplyOutcome::is_failed)
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0
    }
}

/// Drive one full run: load the base templates, resolve the identity pool,
/// then materialize and reconcile every instance in ascending index order.
///
/// Template and pool errors abort the run before anything is applied. Once
/// the loop is running, no instance's failure blocks another's attempt: each
/// outcome is recorded and the loop moves on to the next index.
pub async fn run<C>(client: &C, config: &RunConfig) -> Result<RunSummary, DeployError>
where
    C: WorkloadApi + EndpointApi + IdentityApi + Sync,
{
    let documents = template::load(&config.template_file)?;
    let base_workload: Workload = template::find_by_kind(&documents, WORKLOAD_KIND)
        .ok_or_else(|| TemplateError::WorkloadMissing {
            path: config.template_file.clone(),
        })
        .and_then(|document| template::decode(document, WORKLOAD_KIND))?;
    let base_endpoint: Option<Endpoint> = template::find_by_kind(&documents, ENDPOINT_KIND)
        .map(|document| template::decode(document, ENDPOINT_KIND))
        .transpose()?;

    let identities = pool::resolve(
        client,
        &config.namespace,
        &config.identity_store,
        config.instances,
    )
    .await?;

    let mut summary = RunSummary::default();
    for (index, identity) in identities.iter().enumerate() {
        let instance = materialize(
            &base_workload,
            base_endpoint.as_ref(),
            index,
            identity,
            &config.stream_url,
            config.replicas,
        );
        for warning in &instance.warnings {
            warn!("{}", warning);
        }

        let workload_name = instance.workload.metadata.name.clone();
        info!(
            "Applying workload {} with identity {}",
            workload_name, identity
        );
        let workload_outcome = apply_workload(client, &config.namespace, &instance.workload).await;

        let endpoint_outcome = match &instance.endpoint {
            Some(endpoint) => {
                info!("Applying endpoint {}", endpoint.metadata.name);
                Some(apply_endpoint(client, &config.namespace, endpoint).await)
            }
            None => None,
        };

        summary.reports.push(InstanceReport {
            index,
            workload_name,
            identity: identity.clone(),
            workload: workload_outcome,
            endpoint: endpoint_outcome,
            warnings: instance.warnings,
        });
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::fixtures::{identity_store, FakeCluster, TEMPLATE_YAML, WORKLOAD_ONLY_YAML};
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn run_config(dir: &TempDir, template: &str, instances: usize) -> RunConfig {
        let template_file = dir.path().join("template.yaml");
        fs::write(&template_file, template).expect("write template");
        RunConfig {
            stream_url: "https://stream.example/channel".to_string(),
            instances,
            template_file,
            namespace: "stream-viewers".to_string(),
            identity_store: "vpn-identities".to_string(),
            replicas: 1,
        }
    }

    #[tokio::test]
    async fn fresh_run_creates_every_instance_with_prefix_identities() {
        let dir = TempDir::new().expect("tempdir");
        let config = run_config(&dir, TEMPLATE_YAML, 3);
        let cluster =
            FakeCluster::new().with_store(identity_store(&["vpnA", "vpnB", "vpnC", "vpnD"]));

        let summary = run(&cluster, &config).await.expect("run");

        assert_eq!(summary.reports.len(), 3);
        let assigned: Vec<(&str, &str)> = summary
            .reports
            .iter()
            .map(|report| (report.workload_name.as_str(), report.identity.as_str()))
            .collect();
        assert_eq!(
            assigned,
            vec![
                ("viewer-0", "vpnA"),
                ("viewer-1", "vpnB"),
                ("viewer-2", "vpnC"),
            ]
        );
        assert_eq!(summary.created(), 6);
        assert_eq!(summary.failed(), 0);
        assert!(!summary.has_failures());
    }

    #[tokio::test]
    async fn exhausted_pool_aborts_before_any_mutation() {
        let dir = TempDir::new().expect("tempdir");
        let config = run_config(&dir, TEMPLATE_YAML, 5);
        let cluster = FakeCluster::new().with_store(identity_store(&["vpnA", "vpnB"]));

        let error = run(&cluster, &config).await.expect_err("must fail");

        assert!(matches!(
            error,
            DeployError::Pool(PoolError::Exhausted {
                requested: 5,
                available: 2
            })
        ));
        assert!(cluster.mutation_calls().is_empty());
    }

    #[tokio::test]
    async fn rerun_replaces_workloads_and_skips_endpoints() {
        let dir = TempDir::new().expect("tempdir");
        let config = run_config(&dir, TEMPLATE_YAML, 2);
        let cluster = FakeCluster::new()
            .with_store(identity_store(&["vpnA", "vpnB"]))
            .with_existing_workload("viewer-0")
            .with_existing_workload("viewer-1")
            .with_existing_endpoint("viewer-endpoint-0")
            .with_existing_endpoint("viewer-endpoint-1");

        let summary = run(&cluster, &config).await.expect("run");

        for report in &summary.reports {
            assert_eq!(report.workload, ApplyOutcome::Replaced);
            assert!(matches!(
                report.endpoint,
                Some(ApplyOutcome::Skipped { .. })
            ));
        }
        assert_eq!(summary.failed(), 0);
    }

    #[tokio::test]
    async fn one_failing_instance_does_not_block_the_others() {
        let dir = TempDir::new().expect("tempdir");
        let config = run_config(&dir, TEMPLATE_YAML, 5);
        let cluster = FakeCluster::new()
            .with_store(identity_store(&["vpnA", "vpnB", "vpnC", "vpnD", "vpnE"]))
            .with_broken_workload("viewer-2");

        let summary = run(&cluster, &config).await.expect("run");

        assert_eq!(summary.reports.len(), 5);
        for report in &summary.reports {
            if report.index == 2 {
                assert!(report.workload.is_failed());
            } else {
                assert_eq!(report.workload, ApplyOutcome::Created);
            }
        }
        assert!(summary.has_failures());
        assert_eq!(summary.failed(), 1);
    }

    #[tokio::test]
    async fn missing_workload_template_is_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let endpoint_only = "apiVersion: v0\nkind: Endpoint\nmetadata:\n  name: viewer-endpoint\nspec:\n  selector: {}\n";
        let config = run_config(&dir, endpoint_only, 1);
        let cluster = FakeCluster::new().with_store(identity_store(&["vpnA"]));

        let error = run(&cluster, &config).await.expect_err("must fail");

        assert!(matches!(
            error,
            DeployError::Template(TemplateError::WorkloadMissing { .. })
        ));
        assert!(cluster.mutation_calls().is_empty());
    }

    #[tokio::test]
    async fn absent_endpoint_template_disables_endpoint_creation() {
        let dir = TempDir::new().expect("tempdir");
        let config = run_config(&dir, WORKLOAD_ONLY_YAML, 2);
        let cluster = FakeCluster::new().with_store(identity_store(&["vpnA", "vpnB"]));

        let summary = run(&cluster, &config).await.expect("run");

        for report in &summary.reports {
            assert_eq!(report.endpoint, None);
        }
        assert!(cluster
            .mutation_calls()
            .iter()
            .all(|call| !call.starts_with("create_endpoint")));
    }

    #[tokio::test]
    async fn injected_environment_reaches_the_cluster() {
        let dir = TempDir::new().expect("tempdir");
        let config = run_config(&dir, TEMPLATE_YAML, 1);
        let cluster = FakeCluster::new().with_store(identity_store(&["vpnA"]));

        run(&cluster, &config).await.expect("run");

        let applied = cluster.applied_workloads();
        let container = &applied[0].spec.template.spec.containers[0];
        let vpn = container
            .env
            .iter()
            .find(|var| var.name == "VPN_CONFIG")
            .expect("VPN_CONFIG");
        assert_eq!(vpn.value, "vpnA");
    }
}
