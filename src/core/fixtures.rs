//! Shared test fixtures: canned templates and an in-memory cluster fake
//! implementing the API traits.

use async_trait::async_trait;
use serde::Deserialize;
use serde_yaml::Value;
use std::collections::HashSet;
use std::sync::Mutex;

use crate::core::client::{ApiError, EndpointApi, IdentityApi, WorkloadApi};
use crate::core::constants::{ENDPOINT_KIND, IDENTITY_KEY_SUFFIX, WORKLOAD_KIND};
use crate::core::manifest::{Endpoint, Workload};
use crate::core::pool::{IdentityEntry, IdentityStore};
use crate::core::template;

pub const TEMPLATE_YAML: &str = r#"apiVersion: v0
kind: Workload
metadata:
  name: viewer
  labels:
    app: stream-viewers
spec:
  replicas: 1
  selector:
    matchLabels:
      component: viewer
  template:
    metadata:
      labels:
        component: viewer
    spec:
      containers:
        - name: viewer-box
          image: registry.local/viewer-box:1.4
          env:
            - name: TZ
              value: Etc/UTC
            - name: STREAM_URL
              value: https://stream.example/placeholder
---
apiVersion: v0
kind: Endpoint
metadata:
  name: viewer-endpoint
spec:
  selector:
    component: viewer
  ports:
    - port: 8080
      targetPort: 8080
"#;

pub const WORKLOAD_ONLY_YAML: &str = r#"apiVersion: v0
kind: Workload
metadata:
  name: viewer
spec:
  selector:
    matchLabels:
      component: viewer
  template:
    spec:
      containers:
        - name: viewer-box
          image: registry.local/viewer-box:1.4
"#;

fn parse_documents(content: &str) -> Vec<Value> {
    serde_yaml::Deserializer::from_str(content)
        .map(|document| Value::deserialize(document).expect("fixture document"))
        .collect()
}

pub fn base_workload() -> Workload {
    let documents = parse_documents(TEMPLATE_YAML);
    let document = template::find_by_kind(&documents, WORKLOAD_KIND).expect("workload document");
    template::decode(document, WORKLOAD_KIND).expect("workload fixture")
}

pub fn base_endpoint() -> Endpoint {
    let documents = parse_documents(TEMPLATE_YAML);
    let document = template::find_by_kind(&documents, ENDPOINT_KIND).expect("endpoint document");
    template::decode(document, ENDPOINT_KIND).expect("endpoint fixture")
}

pub fn identity_store(tokens: &[&str]) -> IdentityStore {
    IdentityStore {
        name: "vpn-identities".to_string(),
        entries: tokens
            .iter()
            .map(|token| IdentityEntry {
                key: format!("{}{}", token, IDENTITY_KEY_SUFFIX),
                value: format!("credential payload for {}", token),
            })
            .collect(),
    }
}

/// In-memory stand-in for the cluster API. Pre-existing object names answer
/// with a conflict, broken names with a server error, and every call is
/// recorded in order.
#[derive(Debug, Default)]
pub struct FakeCluster {
    store: Option<IdentityStore>,
    existing_workloads: HashSet<String>,
    existing_endpoints: HashSet<String>,
    broken_workloads: HashSet<String>,
    broken_replaces: HashSet<String>,
    calls: Mutex<Vec<String>>,
    applied_workloads: Mutex<Vec<Workload>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(mut self, store: IdentityStore) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_existing_workload(mut self, name: &str) -> Self {
        self.existing_workloads.insert(name.to_string());
        self
    }

    pub fn with_existing_endpoint(mut self, name: &str) -> Self {
        self.existing_endpoints.insert(name.to_string());
        self
    }

    pub fn with_broken_workload(mut self, name: &str) -> Self {
        self.broken_workloads.insert(name.to_string());
        self
    }

    pub fn with_broken_replace(mut self, name: &str) -> Self {
        self.broken_replaces.insert(name.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls that would mutate cluster state, i.e. everything but reads.
    pub fn mutation_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|call| !call.starts_with("get_"))
            .collect()
    }

    pub fn applied_workloads(&self) -> Vec<Workload> {
        self.applied_workloads.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn server_error() -> ApiError {
        ApiError::Api {
            status: 500,
            message: "internal error".to_string(),
        }
    }
}

#[async_trait]
impl WorkloadApi for FakeCluster {
    async fn create_workload(&self, _namespace: &str, workload: &Workload) -> Result<(), ApiError> {
        let name = workload.metadata.name.clone();
        self.record(format!("create_workload {}", name));
        if self.broken_workloads.contains(&name) {
            return Err(Self::server_error());
        }
        if self.existing_workloads.contains(&name) {
            return Err(ApiError::Conflict {
                kind: WORKLOAD_KIND.to_string(),
                name,
            });
        }
        self.applied_workloads.lock().unwrap().push(workload.clone());
        Ok(())
    }

    async fn replace_workload(&self, _namespace: &str, workload: &Workload) -> Result<(), ApiError> {
        let name = workload.metadata.name.clone();
        self.record(format!("replace_workload {}", name));
        if self.broken_replaces.contains(&name) {
            return Err(Self::server_error());
        }
        if !self.existing_workloads.contains(&name) {
            return Err(ApiError::NotFound {
                kind: WORKLOAD_KIND.to_string(),
                name,
            });
        }
        self.applied_workloads.lock().unwrap().push(workload.clone());
        Ok(())
    }
}

#[async_trait]
impl EndpointApi for FakeCluster {
    async fn create_endpoint(&self, _namespace: &str, endpoint: &Endpoint) -> Result<(), ApiError> {
        let name = endpoint.metadata.name.clone();
        self.record(format!("create_endpoint {}", name));
        if self.existing_endpoints.contains(&name) {
            return Err(ApiError::Conflict {
                kind: ENDPOINT_KIND.to_string(),
                name,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityApi for FakeCluster {
    async fn get_identity_store(&self, _namespace: &str, name: &str) -> Result<IdentityStore, ApiError> {
        self.record(format!("get_identity_store {}", name));
        self.store.clone().ok_or_else(|| ApiError::NotFound {
            kind: "IdentityStore".to_string(),
            name: name.to_string(),
        })
    }
}
