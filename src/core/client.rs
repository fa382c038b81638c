use async_trait::async_trait;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::Serialize;
use serde_json::json;

use crate::core::config;
use crate::core::manifest::{Endpoint, Workload};
use crate::core::pool::IdentityStore;

/// Errors returned by the cluster API, reduced to the categories the
/// reconciliation logic distinguishes.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{kind} '{name}' was not found")]
    NotFound { kind: String, name: String },
    #[error("{kind} '{name}' already exists")]
    Conflict { kind: String, name: String },
    #[error("the cluster API answered with status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("unable to reach the cluster API: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to decode the cluster API response: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait WorkloadApi {
    async fn create_workload(&self, namespace: &str, workload: &Workload) -> Result<(), ApiError>;
    async fn replace_workload(&self, namespace: &str, workload: &Workload) -> Result<(), ApiError>;
}

#[async_trait]
pub trait EndpointApi {
    async fn create_endpoint(&self, namespace: &str, endpoint: &Endpoint) -> Result<(), ApiError>;
}

#[async_trait]
pub trait IdentityApi {
    async fn get_identity_store(&self, namespace: &str, name: &str) -> Result<IdentityStore, ApiError>;
}

/// `Client` provides the ability to interact with the cluster controller by
/// using HTTP Protocol.
#[derive(Debug)]
pub struct Client {
    /// The full address for accessing the cluster controller.
    ///
    /// e.g: http://127.0.0.1:5000
    endpoint: String,

    /// The internal HTTP client used to make requests.
    http_client: HttpClient,
}

impl Client {
    pub fn init(config: config::Cluster) -> Self {
        Self {
            endpoint: config.server,
            http_client: HttpClient::new(),
        }
    }

    /// Build a complete endpoint path
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.endpoint, path)
    }

    async fn apply<T: Serialize + Sync>(
        &self,
        path: &str,
        kind: &str,
        name: &str,
        namespace: &str,
        manifest: &T,
    ) -> Result<(), ApiError> {
        let response = self
            .http_client
            .post(self.endpoint(path))
            .json(&json!({ "namespace": namespace, "manifest": manifest }))
            .send()
            .await?;

        Self::into_api_result(response, kind, name).await
    }

    async fn into_api_result(response: Response, kind: &str, name: &str) -> Result<(), ApiError> {
        match response.status() {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound {
                kind: kind.to_string(),
                name: name.to_string(),
            }),
            StatusCode::CONFLICT => Err(ApiError::Conflict {
                kind: kind.to_string(),
                name: name.to_string(),
            }),
            status if !status.is_success() => Err(ApiError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl WorkloadApi for Client {
    async fn create_workload(&self, namespace: &str, workload: &Workload) -> Result<(), ApiError> {
        self.apply(
            "api/v0/workloads.create",
            &workload.kind,
            &workload.metadata.name,
            namespace,
            workload,
        )
        .await
    }

    async fn replace_workload(&self, namespace: &str, workload: &Workload) -> Result<(), ApiError> {
        self.apply(
            "api/v0/workloads.replace",
            &workload.kind,
            &workload.metadata.name,
            namespace,
            workload,
        )
        .await
    }
}

#[async_trait]
impl EndpointApi for Client {
    async fn create_endpoint(&self, namespace: &str, endpoint: &Endpoint) -> Result<(), ApiError> {
        self.apply(
            "api/v0/endpoints.create",
            &endpoint.kind,
            &endpoint.metadata.name,
            namespace,
            endpoint,
        )
        .await
    }
}

#[async_trait]
impl IdentityApi for Client {
    async fn get_identity_store(&self, namespace: &str, name: &str) -> Result<IdentityStore, ApiError> {
        let response = self
            .http_client
            .get(self.endpoint("api/v0/identitystores.get"))
            .query(&[("namespace", namespace), ("name", name)])
            .send()
            .await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound {
                kind: "IdentityStore".to_string(),
                name: name.to_string(),
            }),
            status if !status.is_success() => Err(ApiError::Api {
                status: status.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
            _ => Ok(serde_json::from_str(&response.text().await?)?),
        }
    }
}
