use anyhow::{ensure, Result};
use async_trait::async_trait;
use clap::Args;
use prettytable::row;
use std::path::PathBuf;

use crate::cli::Handler;
use crate::core::batch::{self, InstanceReport, RunConfig};
use crate::core::client::Client;
use crate::core::config::Configuration;

use super::DisplayResource;

/// Fan out viewer instances onto the cluster, one unique VPN identity each.
#[derive(Debug, Args)]
pub struct DeployCommand {
    /// URL of the stream every viewer instance will watch.
    #[clap(short, long)]
    pub stream_url: String,

    /// Number of viewer instances to create.
    #[clap(short = 'n', long)]
    pub instances: usize,

    /// Path to the multi-document YAML file holding the base Workload and optional Endpoint.
    #[clap(short, long, default_value = "viewer-box.yaml")]
    pub template_file: PathBuf,

    /// Namespace the instances are created in.
    #[clap(long, default_value = "stream-viewers")]
    pub namespace: String,

    /// Name of the identity store holding the VPN identities.
    #[clap(long, default_value = "vpn-identities")]
    pub identity_store: String,

    /// Number of replicas for each instance.
    #[clap(short, long, default_value_t = 1)]
    pub replicas: u16,
}

#[async_trait]
impl Handler for DeployCommand {
    async fn handler(&self) -> Result<()> {
        ensure!(self.instances > 0, "at least one instance must be requested");

        let config = Configuration::load()?;
        let run = RunConfig {
            stream_url: self.stream_url.clone(),
            instances: self.instances,
            template_file: self.template_file.clone(),
            namespace: self.namespace.clone(),
            identity_store: self.identity_store.clone(),
            replicas: self.replicas,
        };

        let summary = batch::run(&Client::init(config.cluster), &run).await?;

        for report in &summary.reports {
            for warning in &report.warnings {
                println!("Warning: {}", warning);
            }
        }

        let table = summary.reports.into_table();
        table.printstd();
        println!(
            "Processed {} instances: {} created, {} replaced, {} skipped, {} failed.",
            summary.reports.len(),
            summary.created(),
            summary.replaced(),
            summary.skipped(),
            summary.failed()
        );
        if summary.has_failures() {
            println!("Some instances failed; rerunning the command will retry them.");
        }
        Ok(())
    }
}

impl DisplayResource for Vec<InstanceReport> {
    fn into_table(&self) -> prettytable::Table {
        let mut table = Self::new_table();
        table.set_titles(row!["INDEX", "NAME", "IDENTITY", "WORKLOAD", "ENDPOINT"]);
        if self.is_empty() {
            table.add_row(row!["", "", "", "", ""]);
        }
        for report in self {
            let endpoint = match &report.endpoint {
                Some(outcome) => outcome.to_string(),
                None => "-".to_string(),
            };
            table.add_row(row![
                report.index,
                report.workload_name,
                report.identity,
                report.workload,
                endpoint
            ]);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::reconcile::ApplyOutcome;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_reports_table() {
        let reports = vec![
            InstanceReport {
                index: 0,
                workload_name: "viewer-0".to_string(),
                identity: "vpnA".to_string(),
                workload: ApplyOutcome::Created,
                endpoint: Some(ApplyOutcome::Created),
                warnings: vec![],
            },
            InstanceReport {
                index: 1,
                workload_name: "viewer-1".to_string(),
                identity: "vpnB".to_string(),
                workload: ApplyOutcome::Replaced,
                endpoint: Some(ApplyOutcome::Skipped {
                    reason: "endpoint viewer-endpoint-1 already exists".to_string(),
                }),
                warnings: vec![],
            },
        ];

        let table = reports.into_table();
        let expected_output = " INDEX  NAME      IDENTITY  WORKLOAD  ENDPOINT \n 0      viewer-0  vpnA      created   created \n 1      viewer-1  vpnB      replaced  skipped \n";
        assert_eq!(table.to_string(), expected_output);
    }

    #[test]
    fn display_reports_table_without_endpoint() {
        let reports = vec![InstanceReport {
            index: 0,
            workload_name: "viewer-0".to_string(),
            identity: "vpnA".to_string(),
            workload: ApplyOutcome::Created,
            endpoint: None,
            warnings: vec![],
        }];

        let table = reports.into_table();
        let expected_output = " INDEX  NAME      IDENTITY  WORKLOAD  ENDPOINT \n 0      viewer-0  vpnA      created   - \n";
        assert_eq!(table.to_string(), expected_output);
    }
}
