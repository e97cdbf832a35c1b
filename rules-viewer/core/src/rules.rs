//! The fixed set of compliance rules.
//!
//! Rules are pure functions over a [`Snapshot`] of already-fetched resources; all cluster lookups
//! happen in [`Snapshot::gather`].

use crate::{
    selector::{self, Resolved},
    Deployment, DiscoverResources, Pod, Report, RuleResult, Service, APP_LABEL,
};
use std::io::Write;
use tracing::{debug, instrument, warn};

/// Port name prefixes the sidecar proxy uses to select a protocol.
pub const PROTOCOL_PREFIXES: [&str; 8] = [
    "http", "http2", "https", "tcp", "tls", "grpc", "mongo", "redis",
];

/// Labels every deployment must carry.
pub const REQUIRED_DEPLOYMENT_LABELS: [&str; 2] = [APP_LABEL, "version"];

/// Marks a service whose metrics must be scraped over TLS.
pub const SCRAPE_TLS_LABEL: &str = "scrape_tls";

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Some pod runs as a service account named after its `app` label.
    ServiceAccountMatchesLabel,

    /// Some deployment carries every label in [`REQUIRED_DEPLOYMENT_LABELS`].
    DeploymentRequiredLabels,

    /// Every service port is named with a protocol prefix.
    ServicePortNaming,

    /// The service is labeled `scrape_tls=true`.
    ServiceScrapeTls,
}

/// The resources a compliance run is evaluated against.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// The selector the pods were resolved with.
    pub selector: String,
    pub pods: Vec<Pod>,
    pub deployments: Vec<Deployment>,
    pub service: Option<Service>,
}

/// Evaluates every [`Rule`] against a snapshot, recording each verdict to an optional audit sink.
#[derive(Debug)]
pub struct Evaluator<W = std::io::Sink> {
    audit: Option<W>,
}

// === impl Rule ===

impl Rule {
    /// All rules, in report order.
    pub const ALL: [Rule; 4] = [
        Rule::ServiceAccountMatchesLabel,
        Rule::DeploymentRequiredLabels,
        Rule::ServicePortNaming,
        Rule::ServiceScrapeTls,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::ServiceAccountMatchesLabel => "service-account-matches-label",
            Self::DeploymentRequiredLabels => "deployment-required-labels",
            Self::ServicePortNaming => "service-port-naming",
            Self::ServiceScrapeTls => "service-scrape-tls-label",
        }
    }

    pub fn evaluate(&self, snapshot: &Snapshot) -> RuleResult {
        let (passed, description) = match self {
            Self::ServiceAccountMatchesLabel => {
                service_account_matches_label(&snapshot.selector, &snapshot.pods)
            }
            Self::DeploymentRequiredLabels => {
                deployment_required_labels(&snapshot.selector, &snapshot.deployments)
            }
            Self::ServicePortNaming => service_port_naming(snapshot.service.as_ref()),
            Self::ServiceScrapeTls => service_scrape_tls(snapshot.service.as_ref()),
        };
        RuleResult {
            name: self.name().to_string(),
            description,
            passed,
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Returns true if `name`'s prefix before the first `-` is a known protocol.
pub fn is_protocol_port_name(name: &str) -> bool {
    let prefix = name.split('-').next().unwrap_or_default();
    !prefix.is_empty() && PROTOCOL_PREFIXES.contains(&prefix.to_ascii_lowercase().as_str())
}

fn service_account_matches_label(selector: &str, pods: &[Pod]) -> (bool, String) {
    if pods.is_empty() {
        return (false, format!("no pods match selector '{selector}'"));
    }

    let matching = pods.iter().find(|pod| match pod.service_account() {
        Some(sa) => pod.app_label() == Some(sa),
        None => false,
    });
    match matching {
        Some(pod) => (
            true,
            format!(
                "pod {} runs as service account '{}' matching its app label (selector '{selector}')",
                pod.name,
                pod.service_account().unwrap_or_default(),
            ),
        ),
        None => (
            false,
            format!("no pod runs as a service account matching its app label (selector '{selector}')"),
        ),
    }
}

fn deployment_required_labels(selector: &str, deployments: &[Deployment]) -> (bool, String) {
    if deployments.is_empty() {
        return (false, format!("no deployments match selector '{selector}'"));
    }

    let has_required = |d: &&Deployment| {
        REQUIRED_DEPLOYMENT_LABELS
            .iter()
            .all(|label| d.labels.contains_key(label))
    };
    match deployments.iter().find(has_required) {
        Some(deployment) => (
            true,
            format!(
                "deployment {} carries labels {}",
                deployment.name,
                REQUIRED_DEPLOYMENT_LABELS.join(", ")
            ),
        ),
        None => {
            let names = deployments
                .iter()
                .map(|d| d.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            (
                false,
                format!(
                    "no deployment carries all of {} (checked {names})",
                    REQUIRED_DEPLOYMENT_LABELS.join(", ")
                ),
            )
        }
    }
}

fn service_port_naming(service: Option<&Service>) -> (bool, String) {
    let Some(service) = service else {
        return (false, "no service found".to_string());
    };
    if service.ports.is_empty() {
        return (false, format!("service {} exposes no ports", service.name));
    }

    let invalid = service
        .ports
        .iter()
        .filter(|port| !port.name().is_some_and(is_protocol_port_name))
        .map(|port| match port.name() {
            Some(name) => name.to_string(),
            None => format!("<unnamed:{}>", port.port),
        })
        .collect::<Vec<_>>();
    if invalid.is_empty() {
        (
            true,
            format!(
                "all {} ports of service {} are named with a protocol prefix",
                service.ports.len(),
                service.name
            ),
        )
    } else {
        (
            false,
            format!(
                "service {} has ports without a protocol prefix: {}",
                service.name,
                invalid.join(", ")
            ),
        )
    }
}

fn service_scrape_tls(service: Option<&Service>) -> (bool, String) {
    let Some(service) = service else {
        return (false, "no service found".to_string());
    };
    match service.labels.get(SCRAPE_TLS_LABEL) {
        Some("true") => (
            true,
            format!("service {} is labeled {SCRAPE_TLS_LABEL}=true", service.name),
        ),
        Some(value) => (
            false,
            format!(
                "service {} is labeled {SCRAPE_TLS_LABEL}={value:?}, expected \"true\"",
                service.name
            ),
        ),
        None => (
            false,
            format!("service {} is missing label {SCRAPE_TLS_LABEL}", service.name),
        ),
    }
}

// === impl Snapshot ===

impl Snapshot {
    /// Fetches the deployments and service that accompany the resolved pods.
    ///
    /// Deployments are selected with the resolved pod selector. The service is looked up by
    /// `label`, the application identifier or `app=` expression the pods were resolved from.
    /// Lookup failures leave the affected resources empty.
    #[instrument(skip(discover, resolved), fields(selector = %resolved.selector))]
    pub async fn gather<D>(discover: &D, namespace: &str, label: &str, resolved: Resolved) -> Self
    where
        D: DiscoverResources + Sync + ?Sized,
    {
        let Resolved { selector, pods } = resolved;

        let deployments = match discover.list_deployments(namespace, &selector).await {
            Ok(deployments) => deployments,
            Err(error) => {
                warn!(%error, %selector, "failed to list deployments");
                Vec::new()
            }
        };

        let service = selector::resolve_service(discover, namespace, label).await;

        Self {
            selector,
            pods,
            deployments,
            service,
        }
    }
}

// === impl Evaluator ===

impl Evaluator {
    pub fn new() -> Self {
        Self { audit: None }
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> Evaluator<W> {
    /// Records every verdict as a tab-separated line to `audit`.
    pub fn with_audit(audit: W) -> Self {
        Self { audit: Some(audit) }
    }

    /// Evaluates all rules, in order. The report always holds one result per rule.
    pub fn evaluate(&mut self, namespace: &str, snapshot: &Snapshot) -> Report {
        let mut results = Vec::with_capacity(Rule::ALL.len());
        for rule in Rule::ALL {
            let result = rule.evaluate(snapshot);
            debug!(%rule, passed = result.passed, "evaluated");
            self.record(namespace, &result);
            results.push(result);
        }

        Report {
            namespace: namespace.to_string(),
            results,
        }
    }

    fn record(&mut self, namespace: &str, result: &RuleResult) {
        let Some(audit) = self.audit.as_mut() else {
            return;
        };
        let verdict = if result.passed { "pass" } else { "fail" };
        if let Err(error) = writeln!(
            audit,
            "{namespace}\t{}\t{verdict}\t{}",
            result.name, result.description
        ) {
            warn!(%error, "failed to write audit record");
        }
    }

    pub fn into_audit(self) -> Option<W> {
        self.audit
    }
}

#[cfg(test)]
mod tests;
