use crate::{Deployment, Pod, Service};
use anyhow::Result;
use std::collections::BTreeMap;

/// Looks up cluster resources by namespace and label selector.
///
/// Implementations own transport concerns (authentication, timeouts). Callers treat any error as
/// an empty result for the lookup that failed.
#[async_trait::async_trait]
pub trait DiscoverResources {
    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<Pod>>;

    async fn list_deployments(&self, namespace: &str, selector: &str) -> Result<Vec<Deployment>>;

    async fn list_services(&self, namespace: &str, selector: &str) -> Result<Vec<Service>>;

    /// Returns the data entries of the named config map.
    async fn get_config_data(&self, namespace: &str, name: &str)
        -> Result<BTreeMap<String, String>>;
}
