use std::fmt::{self, Display};

use crate::core::constants::{
    COMPONENT_LABEL, DEFAULT_COMPONENT, ENV_BOX_NAME, ENV_STREAM_URL, ENV_VPN_CONFIG,
    INSTANCE_INDEX_LABEL, VIEWER_CONTAINER_NAME,
};
use crate::core::manifest::{Endpoint, EnvVar, Workload};

/// Non-fatal conditions observed while deriving an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterializeWarning {
    /// The pod template declares no `viewer-box` container. The instance is
    /// still produced, but without the injected environment.
    ViewerContainerMissing { workload: String },
}

impl Display for MaterializeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MaterializeWarning::ViewerContainerMissing { workload } => write!(
                f,
                "container '{}' not found in workload {}, environment not injected",
                VIEWER_CONTAINER_NAME, workload
            ),
        }
    }
}

/// The derived object pair for one instance index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterializedInstance {
    pub workload: Workload,
    pub endpoint: Option<Endpoint>,
    pub warnings: Vec<MaterializeWarning>,
}

/// Derive the concrete object pair for one instance.
///
/// Pure: the base manifests are cloned, never mutated, and the result is
/// fully determined by the arguments. Naming and labeling rules:
///
/// - object names get a `-<index>` suffix;
/// - the component label gets the same suffix, and selector match labels,
///   pod-template labels and the endpoint selector all agree on
///   `{component, instance-index}` so that pods, workload and endpoint of
///   one instance bind to each other and to nothing else;
/// - the `viewer-box` container receives `BOX_NAME`, `STREAM_URL` and
///   `VPN_CONFIG`, merged by name into its declared environment.
pub fn materialize(
    base_workload: &Workload,
    base_endpoint: Option<&Endpoint>,
    index: usize,
    identity: &str,
    stream_url: &str,
    replicas: u16,
) -> MaterializedInstance {
    let suffix = format!("-{}", index);

    let mut workload = base_workload.clone();
    let component = workload
        .spec
        .selector
        .match_labels
        .get(COMPONENT_LABEL)
        .cloned()
        .unwrap_or_else(|| DEFAULT_COMPONENT.to_string());
    let component = format!("{}{}", component, suffix);

    workload.metadata.name = format!("{}{}", base_workload.metadata.name, suffix);
    workload
        .metadata
        .labels
        .insert(INSTANCE_INDEX_LABEL.to_string(), index.to_string());
    workload.spec.replicas = replicas;

    let selector = &mut workload.spec.selector.match_labels;
    selector.insert(COMPONENT_LABEL.to_string(), component.clone());
    selector.insert(INSTANCE_INDEX_LABEL.to_string(), index.to_string());

    let pod_labels = &mut workload.spec.template.metadata.labels;
    pod_labels.insert(COMPONENT_LABEL.to_string(), component.clone());
    pod_labels.insert(INSTANCE_INDEX_LABEL.to_string(), index.to_string());

    let workload_name = workload.metadata.name.clone();
    let mut warnings = Vec::new();
    match workload.container_mut(VIEWER_CONTAINER_NAME) {
        Some(container) => container.merge_env([
            EnvVar {
                name: ENV_BOX_NAME.to_string(),
                value: format!("box{}", suffix),
            },
            EnvVar {
                name: ENV_STREAM_URL.to_string(),
                value: stream_url.to_string(),
            },
            EnvVar {
                name: ENV_VPN_CONFIG.to_string(),
                value: identity.to_string(),
            },
        ]),
        None => warnings.push(MaterializeWarning::ViewerContainerMissing {
            workload: workload_name,
        }),
    }

    let endpoint = base_endpoint.map(|base| {
        let mut endpoint = base.clone();
        endpoint.metadata.name = format!("{}{}", base.metadata.name, suffix);
        endpoint
            .metadata
            .labels
            .insert(INSTANCE_INDEX_LABEL.to_string(), index.to_string());
        endpoint
            .spec
            .selector
            .insert(COMPONENT_LABEL.to_string(), component.clone());
        endpoint
            .spec
            .selector
            .insert(INSTANCE_INDEX_LABEL.to_string(), index.to_string());
        endpoint
    });

    MaterializedInstance {
        workload,
        endpoint,
        warnings,
    }
}
