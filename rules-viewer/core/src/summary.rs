//! Human-readable descriptions of the inspected resources.

use crate::{rules::REQUIRED_DEPLOYMENT_LABELS, Deployment, Glyphs, Pod, Service};
use std::fmt::Write;

pub fn describe_deployment(deployment: &Deployment, glyphs: &Glyphs) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Name: {}", deployment.name);
    let _ = writeln!(out, "Namespace: {}", deployment.namespace);
    let _ = writeln!(
        out,
        "Replicas: {}/{}",
        deployment.ready_replicas, deployment.replicas
    );
    let _ = writeln!(out, "Selector: {}", deployment.selector);

    if deployment.labels.is_empty() {
        let _ = writeln!(
            out,
            "Labels: None (missing required labels: {}) {}",
            REQUIRED_DEPLOYMENT_LABELS.join(", "),
            glyphs.failure
        );
        return out;
    }

    out.push_str("Labels:\n");
    for (k, v) in deployment.labels.iter() {
        if REQUIRED_DEPLOYMENT_LABELS.contains(&k) {
            let _ = writeln!(out, "  {k}: {v} {}", glyphs.success);
        } else {
            let _ = writeln!(out, "  {k}: {v}");
        }
    }
    for label in REQUIRED_DEPLOYMENT_LABELS {
        if !deployment.labels.contains_key(label) {
            let _ = writeln!(out, "  {label}: MISSING {}", glyphs.failure);
        }
    }
    out
}

pub fn describe_service(service: &Service) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Name: {}", service.name);
    let _ = writeln!(out, "Namespace: {}", service.namespace);
    if !service.labels.is_empty() {
        let _ = writeln!(out, "Labels: {}", service.labels);
    }
    if service.ports.is_empty() {
        out.push_str("Ports: None\n");
    } else {
        out.push_str("Ports:\n");
        for port in &service.ports {
            let _ = writeln!(out, "  {port}");
        }
    }
    out
}

pub fn describe_pods(selector: &str, pods: &[Pod]) -> String {
    if pods.is_empty() {
        return format!("No pods found with label '{selector}'\n");
    }

    let mut out = format!("Pods with label '{selector}':\n");
    for (i, pod) in pods.iter().enumerate() {
        let _ = writeln!(out, "\n--- Pod {} ---", i + 1);
        let _ = writeln!(out, "Name: {}", pod.name);
        let _ = writeln!(out, "Namespace: {}", pod.namespace);
        let _ = writeln!(out, "Status: {}", pod.phase.as_deref().unwrap_or("Unknown"));
        let _ = writeln!(out, "Node: {}", pod.node_name.as_deref().unwrap_or("<none>"));
        let _ = writeln!(out, "IP: {}", pod.pod_ip.as_deref().unwrap_or("<none>"));
        let _ = writeln!(
            out,
            "Service Account: {}",
            pod.service_account().unwrap_or("<none>")
        );
    }
    out
}
