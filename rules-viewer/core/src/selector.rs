//! Resolves an application identifier to the label selector that finds its workloads.
//!
//! Applications are labeled inconsistently across teams, so several selectors are tried in a fixed
//! priority order and the first one that matches anything wins.

use crate::{DiscoverResources, Pod, Service, APP_LABEL};
use tracing::{debug, instrument, warn};

/// The recommended `app.kubernetes.io` name label.
pub const NAME_LABEL: &str = "app.kubernetes.io/name";

/// The label Argo CD stamps on the resources of an application instance.
pub const ARGOCD_INSTANCE_LABEL: &str = "argocd.argoproj.io/instance";

/// Label keys tried when selecting an application's pods. `None` uses the bare identifier as the
/// selector.
const POD_SELECTOR_KEYS: [Option<&str>; 3] = [Some(APP_LABEL), Some(NAME_LABEL), None];

/// Label keys tried when selecting an application's service.
const SERVICE_SELECTOR_KEYS: [&str; 2] = [APP_LABEL, ARGOCD_INSTANCE_LABEL];

/// The outcome of pod selector resolution.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Resolved {
    /// The adopted selector, or the least specific candidate if nothing matched.
    pub selector: String,
    pub pods: Vec<Pod>,
}

/// Returns the pod selectors for `id`, most specific first.
pub fn pod_candidates(id: &str) -> Vec<String> {
    POD_SELECTOR_KEYS
        .iter()
        .map(|key| match key {
            Some(key) => format!("{key}={id}"),
            None => id.to_string(),
        })
        .collect()
}

/// Returns the service selectors for `id`, most specific first.
pub fn service_candidates(id: &str) -> Vec<String> {
    SERVICE_SELECTOR_KEYS
        .iter()
        .map(|key| format!("{key}={id}"))
        .collect()
}

/// Reduces a label expression like `app="web"` to its bare value.
pub fn clean_identifier(raw: &str) -> &str {
    raw.strip_prefix("app=").unwrap_or(raw).trim_matches('"')
}

/// Finds the pods of application `id`.
///
/// Candidates are queried one at a time; the first one that matches at least one pod is adopted
/// and the rest are never queried. Lookup failures count as empty results.
#[instrument(skip(discover))]
pub async fn resolve<D>(discover: &D, namespace: &str, id: &str) -> Resolved
where
    D: DiscoverResources + Sync + ?Sized,
{
    let mut resolved = Resolved::default();
    for selector in pod_candidates(id) {
        let pods = match discover.list_pods(namespace, &selector).await {
            Ok(pods) => pods,
            Err(error) => {
                warn!(%error, %selector, "failed to list pods");
                Vec::new()
            }
        };
        if !pods.is_empty() {
            debug!(%selector, pods = pods.len(), "resolved selector");
            return Resolved { selector, pods };
        }
        resolved.selector = selector;
    }

    debug!(selector = %resolved.selector, "no pods matched any selector");
    resolved
}

/// Finds the service of the application named by `label`, a bare identifier or an `app=`
/// expression.
#[instrument(skip(discover))]
pub async fn resolve_service<D>(discover: &D, namespace: &str, label: &str) -> Option<Service>
where
    D: DiscoverResources + Sync + ?Sized,
{
    let id = clean_identifier(label);
    for selector in service_candidates(id) {
        match discover.list_services(namespace, &selector).await {
            Ok(services) => {
                if let Some(service) = services.into_iter().next() {
                    debug!(%selector, service = %service.name, "resolved service");
                    return Some(service);
                }
            }
            Err(error) => warn!(%error, %selector, "failed to list services"),
        }
    }

    None
}
