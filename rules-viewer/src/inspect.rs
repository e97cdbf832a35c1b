use crate::core::{
    gateway::{self, Citation, ScanError, ScanMode},
    report,
    rules::{Evaluator, Snapshot},
    selector, summary, DiscoverResources, Glyphs, Report,
};
use serde::Serialize;
use std::io::Write;

/// What to inspect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Params {
    pub label: String,
    pub namespace: String,
    pub krakend_map: String,
    pub scan_mode: ScanMode,
}

/// Everything learned about an application in one run.
#[derive(Debug)]
pub(crate) struct Inspection {
    pub params: Params,
    pub snapshot: Snapshot,
    pub report: Report,
    pub references: Result<Vec<Citation>, ScanError>,
}

#[derive(Serialize)]
struct JsonInspection<'a> {
    label: &'a str,
    namespace: &'a str,
    selector: &'a str,
    report: &'a Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    references: Option<&'a [Citation]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    krakend_error: Option<String>,
}

/// Resolves the application's workloads, evaluates them, and scans the gateway configuration for
/// references to the application.
pub(crate) async fn inspect<D, W>(discover: &D, params: Params, mut evaluator: Evaluator<W>) -> Inspection
where
    D: DiscoverResources + Sync + ?Sized,
    W: Write,
{
    let resolved = selector::resolve(discover, &params.namespace, &params.label).await;
    let snapshot = Snapshot::gather(discover, &params.namespace, &params.label, resolved).await;
    let report = evaluator.evaluate(&params.namespace, &snapshot);

    let target = selector::clean_identifier(&params.label);
    let references = gateway::fetch_document(discover, &params.namespace, &params.krakend_map)
        .await
        .and_then(|document| gateway::scan(&document, target, params.scan_mode));
    if let Err(error) = &references {
        tracing::warn!(%error, "failed to analyze gateway config");
    }

    Inspection {
        params,
        snapshot,
        report,
        references,
    }
}

// === impl Inspection ===

impl Inspection {
    pub(crate) fn render(&self, glyphs: &Glyphs) -> String {
        let Params {
            label,
            namespace,
            krakend_map,
            ..
        } = &self.params;
        let Snapshot {
            selector,
            pods,
            deployments,
            service,
        } = &self.snapshot;

        let mut sections = vec![format!(
            "k8s-rules-viewer - Label: {label} - Namespace: {namespace}"
        )];

        let deployments = if deployments.is_empty() {
            format!("No deployments found with label '{selector}'\n")
        } else {
            deployments
                .iter()
                .map(|d| summary::describe_deployment(d, glyphs))
                .collect::<Vec<_>>()
                .join("\n")
        };
        sections.push(section("Deployment Details", &deployments));

        let service = match service {
            Some(service) => summary::describe_service(service),
            None => "No service found\n".to_string(),
        };
        sections.push(section("Service Details", &service));

        sections.push(section(
            &format!("Pod Monitoring (label: {selector})"),
            &summary::describe_pods(selector, pods),
        ));

        sections.push(section(
            "Rules Compliance",
            &report::render(&self.report, glyphs),
        ));

        let krakend = match &self.references {
            Ok(citations) => gateway::render_citations(
                selector::clean_identifier(label),
                citations,
                glyphs,
            ),
            Err(error) => format!("Error analyzing Krakend ConfigMap: {error}"),
        };
        sections.push(section(
            &format!("Krakend Config Check ({krakend_map})"),
            &krakend,
        ));

        sections.join("\n\n")
    }

    pub(crate) fn to_json(&self) -> serde_json::Result<String> {
        let (references, krakend_error) = match &self.references {
            Ok(citations) => (Some(citations.as_slice()), None),
            Err(error) => (None, Some(error.to_string())),
        };
        serde_json::to_string_pretty(&JsonInspection {
            label: &self.params.label,
            namespace: &self.params.namespace,
            selector: &self.snapshot.selector,
            report: &self.report,
            references,
            krakend_error,
        })
    }
}

fn section(title: &str, body: &str) -> String {
    format!("== {title} ==\n{}", body.trim_end())
}
