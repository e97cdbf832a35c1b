//! Conversions from API objects into core snapshots.

use crate::{Deployment, Pod, ResourceExt, Service};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use k8s_rules_viewer_core as core;

pub(crate) fn pod(pod: &Pod) -> core::Pod {
    let spec = pod.spec.as_ref();
    let status = pod.status.as_ref();
    core::Pod {
        name: pod.name_any(),
        namespace: pod.namespace().unwrap_or_default(),
        labels: pod.labels().clone().into(),
        service_account_name: spec.and_then(|s| s.service_account_name.clone()),
        phase: status.and_then(|s| s.phase.clone()),
        node_name: spec.and_then(|s| s.node_name.clone()),
        pod_ip: status.and_then(|s| s.pod_ip.clone()),
    }
}

pub(crate) fn deployment(deployment: &Deployment) -> core::Deployment {
    let spec = deployment.spec.as_ref();
    let status = deployment.status.as_ref();
    core::Deployment {
        name: deployment.name_any(),
        namespace: deployment.namespace().unwrap_or_default(),
        labels: deployment.labels().clone().into(),
        replicas: status.and_then(|s| s.replicas).unwrap_or(0),
        ready_replicas: status.and_then(|s| s.ready_replicas).unwrap_or(0),
        selector: spec
            .and_then(|s| s.selector.match_labels.clone())
            .into(),
    }
}

pub(crate) fn service(service: &Service) -> core::Service {
    let ports = service
        .spec
        .as_ref()
        .and_then(|s| s.ports.as_ref())
        .into_iter()
        .flatten()
        .map(|p| core::ServicePort {
            name: p.name.clone(),
            port: p.port,
            target_port: p.target_port.as_ref().map(|tp| match tp {
                IntOrString::Int(port) => port.to_string(),
                IntOrString::String(name) => name.clone(),
            }),
            protocol: p.protocol.clone(),
        })
        .collect();

    core::Service {
        name: service.name_any(),
        namespace: service.namespace().unwrap_or_default(),
        labels: service.labels().clone().into(),
        ports,
    }
}
