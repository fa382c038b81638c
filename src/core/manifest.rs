use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label maps carried by manifests. Key order is not significant.
pub type Labels = BTreeMap<String, String>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PortSpec {
    pub port: u16,
    #[serde(rename = "targetPort", default)]
    pub target_port: Option<u16>,
    #[serde(default)]
    pub protocol: Option<String>,
}

/// `Container` holds the attributes of one workload container.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub env: Vec<EnvVar>,
    #[serde(default)]
    pub ports: Option<PortSpec>,
}

impl Container {
    /// Merge variables into the declared environment by name: an existing
    /// variable of the same name is overwritten in place, every other
    /// declared variable is preserved, new names are appended.
    pub fn merge_env<I>(&mut self, vars: I)
    where
        I: IntoIterator<Item = EnvVar>,
    {
        for var in vars {
            match self.env.iter_mut().find(|declared| declared.name == var.name) {
                Some(declared) => declared.value = var.value,
                None => self.env.push(var),
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub name: String,
    #[serde(default)]
    pub labels: Labels,
}

/// Metadata block of a pod template. Carries labels only, the pods
/// themselves are named by the orchestrator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct TemplateMetadata {
    #[serde(default)]
    pub labels: Labels,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    #[serde(rename = "matchLabels", default)]
    pub match_labels: Labels,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PodSpec {
    #[serde(default)]
    pub containers: Vec<Container>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PodTemplate {
    #[serde(default)]
    pub metadata: TemplateMetadata,
    pub spec: PodSpec,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct WorkloadSpec {
    #[serde(default = "default_replicas")]
    pub replicas: u16,
    pub selector: Selector,
    pub template: PodTemplate,
}

fn default_replicas() -> u16 {
    1
}

/// `Workload` holds all attributes of a viewer workload manifest.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Workload {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: WorkloadSpec,
}

impl Workload {
    /// Look up a container of the pod template by name.
    pub fn container_mut(&mut self, name: &str) -> Option<&mut Container> {
        self.spec
            .template
            .spec
            .containers
            .iter_mut()
            .find(|container| container.name == name)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct EndpointSpec {
    #[serde(default)]
    pub selector: Labels,
    #[serde(default)]
    pub ports: Vec<PortSpec>,
}

/// `Endpoint` holds all attributes of the companion network endpoint
/// manifest that fronts the pods of one instance.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    #[serde(rename = "apiVersion")]
    pub api_version: String,
    pub kind: String,
    pub metadata: Metadata,
    pub spec: EndpointSpec,
}
