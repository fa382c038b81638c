use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::client::{ApiError, IdentityApi};
use crate::core::constants::IDENTITY_KEY_SUFFIX;

/// One entry of an identity store. The value is the opaque credential
/// payload and is never inspected.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IdentityEntry {
    pub key: String,
    pub value: String,
}

/// An identity store resource: an ordered key-value collection holding the
/// shared pool of VPN identities, one `<token>.ovpn` entry each.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct IdentityStore {
    pub name: String,
    #[serde(default)]
    pub entries: Vec<IdentityEntry>,
}

/// Identity pool related errors
#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("identity store '{name}' was not found in namespace '{namespace}'; it must hold one '<token>.ovpn' entry per identity")]
    NotFound { name: String, namespace: String },
    #[error("identity store '{name}' holds no '.ovpn' entries; cannot assign any identity")]
    Empty { name: String },
    #[error("requested {requested} instances but only {available} identities are available")]
    Exhausted { requested: usize, available: usize },
    #[error("unable to query identity store '{name}': {source}")]
    Query {
        name: String,
        #[source]
        source: ApiError,
    },
}

/// Extract the pool of identity tokens from a store: keys carrying the
/// `.ovpn` suffix, stripped of it, in store order.
pub fn identity_tokens(store: &IdentityStore) -> Vec<String> {
    store
        .entries
        .iter()
        .filter_map(|entry| entry.key.strip_suffix(IDENTITY_KEY_SUFFIX))
        .map(str::to_string)
        .collect()
}

/// Resolve the first `capacity` identity tokens of the pool.
///
/// Fails before any orchestrator mutation when the pool cannot satisfy the
/// request, so a run never assigns duplicate or missing identities.
pub async fn resolve<C>(
    client: &C,
    namespace: &str,
    name: &str,
    capacity: usize,
) -> Result<Vec<String>, PoolError>
where
    C: IdentityApi + Sync,
{
    let store = client
        .get_identity_store(namespace, name)
        .await
        .map_err(|source| match source {
            ApiError::NotFound { .. } => PoolError::NotFound {
                name: name.to_string(),
                namespace: namespace.to_string(),
            },
            source => PoolError::Query {
                name: name.to_string(),
                source,
            },
        })?;

    let tokens = identity_tokens(&store);
    if tokens.is_empty() {
        return Err(PoolError::Empty {
            name: name.to_string(),
        });
    }
    if capacity > tokens.len() {
        return Err(PoolError::Exhausted {
            requested: capacity,
            available: tokens.len(),
        });
    }

    debug!("Resolved {} identities from store {}", tokens.len(), name);
    Ok(tokens.into_iter().take(capacity).collect())
}
