use crate::{convert, ConfigMap, Deployment, Pod, Service};
use anyhow::Result;
use k8s_rules_viewer_core as core;
use kube::{
    api::{Api, ListParams},
    Client,
};
use std::collections::BTreeMap;
use tokio::time;
use tracing::{debug, instrument};

/// Looks up resources through the Kubernetes API.
#[derive(Clone)]
pub struct Cluster {
    client: Client,
}

// === impl Cluster ===

impl Cluster {
    /// Bounds every API request.
    const REQUEST_TIMEOUT: time::Duration = time::Duration::from_secs(10);

    pub fn new(client: Client) -> Self {
        Self { client }
    }

    async fn list<K>(&self, namespace: &str, selector: &str) -> Result<Vec<K>>
    where
        K: kube::Resource<Scope = k8s_openapi::NamespaceResourceScope>
            + Clone
            + serde::de::DeserializeOwned
            + std::fmt::Debug,
        K::DynamicType: Default,
    {
        let api = Api::<K>::namespaced(self.client.clone(), namespace);
        let params = ListParams::default().labels(selector);
        let list = time::timeout(Self::REQUEST_TIMEOUT, api.list(&params)).await??;
        debug!(items = list.items.len(), "listed");
        Ok(list.items)
    }
}

#[async_trait::async_trait]
impl core::DiscoverResources for Cluster {
    #[instrument(skip(self))]
    async fn list_pods(&self, namespace: &str, selector: &str) -> Result<Vec<core::Pod>> {
        let pods = self.list::<Pod>(namespace, selector).await?;
        Ok(pods.iter().map(convert::pod).collect())
    }

    #[instrument(skip(self))]
    async fn list_deployments(
        &self,
        namespace: &str,
        selector: &str,
    ) -> Result<Vec<core::Deployment>> {
        let deployments = self.list::<Deployment>(namespace, selector).await?;
        Ok(deployments.iter().map(convert::deployment).collect())
    }

    #[instrument(skip(self))]
    async fn list_services(&self, namespace: &str, selector: &str) -> Result<Vec<core::Service>> {
        let services = self.list::<Service>(namespace, selector).await?;
        Ok(services.iter().map(convert::service).collect())
    }

    #[instrument(skip(self))]
    async fn get_config_data(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<BTreeMap<String, String>> {
        let api = Api::<ConfigMap>::namespaced(self.client.clone(), namespace);
        let cm = time::timeout(Self::REQUEST_TIMEOUT, api.get(name)).await??;
        Ok(cm.data.unwrap_or_default())
    }
}
