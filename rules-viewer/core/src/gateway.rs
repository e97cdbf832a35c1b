//! Finds references to a service in a KrakenD gateway configuration.
//!
//! A KrakenD configuration lists routes under `endpoints`; each route names its path in
//! `endpoint` and its upstreams under `backend`, where every backend has a `url_pattern` and one
//! or more `host`s:
//!
//! ```json
//! { "endpoints": [{ "endpoint": "/v1/users", "backend": [{ "url_pattern": "/users", "host": ["http://users.apps"] }] }] }
//! ```

use crate::{DiscoverResources, Glyphs};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, instrument, trace};

/// The config map key that holds the gateway configuration.
pub const CONFIG_KEY: &str = "krakend.json";

/// The locator used for routes without an `endpoint` path.
pub const UNKNOWN_ENDPOINT: &str = "unknown";

/// One occurrence of the target name in a route's backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Citation {
    /// The route's `endpoint` path.
    pub locator: String,
    pub field: MatchedField,
    pub value: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MatchedField {
    BackendUrl,
    BackendHost,
}

/// Controls which parts of the document are searched.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ScanMode {
    /// Only backends listed under `endpoints[].backend[]`.
    #[default]
    Routes,

    /// Any mapping, at any depth, that has a `url_pattern` or `host`.
    Deep,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("target name must not be empty")]
    EmptyTarget,

    #[error("no krakend.json or other .json key in config map (keys: {keys:?})")]
    MissingDocument { keys: Vec<String> },

    #[error("failed to parse {key}: {source}")]
    Parse {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to fetch config map {name}: {source}")]
    Unavailable {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Finds backends under `endpoints[].backend[]` that reference `target`.
pub fn find_references(document: &Value, target: &str) -> Result<Vec<Citation>, ScanError> {
    scan(document, target, ScanMode::Routes)
}

/// Finds backends that reference `target`, in document order.
///
/// Nodes of an unexpected shape are skipped. Every matching backend yields at most one host
/// citation; matches in distinct backends are all kept.
pub fn scan(document: &Value, target: &str, mode: ScanMode) -> Result<Vec<Citation>, ScanError> {
    if target.is_empty() {
        return Err(ScanError::EmptyTarget);
    }

    let mut citations = Vec::new();
    match mode {
        ScanMode::Routes => scan_routes(document, target, &mut citations),
        ScanMode::Deep => scan_deep(document, UNKNOWN_ENDPOINT, target, &mut citations),
    }
    debug!(%target, ?mode, citations = citations.len(), "scanned gateway config");
    Ok(citations)
}

fn scan_routes(document: &Value, target: &str, citations: &mut Vec<Citation>) {
    let Some(routes) = document.get("endpoints").and_then(Value::as_array) else {
        trace!("no endpoints sequence");
        return;
    };

    for route in routes {
        let Some(route) = route.as_object() else {
            trace!(?route, "skipping non-mapping route");
            continue;
        };
        let locator = endpoint(route).unwrap_or(UNKNOWN_ENDPOINT);
        let Some(backends) = route.get("backend").and_then(Value::as_array) else {
            trace!(%locator, "no backend sequence");
            continue;
        };
        for backend in backends.iter().filter_map(Value::as_object) {
            scan_backend(locator, backend, target, citations);
        }
    }
}

fn scan_deep(node: &Value, locator: &str, target: &str, citations: &mut Vec<Citation>) {
    match node {
        Value::Object(map) => {
            let locator = endpoint(map).unwrap_or(locator);
            scan_backend(locator, map, target, citations);
            for child in map.values() {
                scan_deep(child, locator, target, citations);
            }
        }
        Value::Array(items) => {
            for item in items {
                scan_deep(item, locator, target, citations);
            }
        }
        _ => {}
    }
}

fn endpoint(route: &Map<String, Value>) -> Option<&str> {
    route.get("endpoint").and_then(Value::as_str)
}

fn scan_backend(
    locator: &str,
    backend: &Map<String, Value>,
    target: &str,
    citations: &mut Vec<Citation>,
) {
    let cite = |field, value: &str| Citation {
        locator: locator.to_string(),
        field,
        value: value.to_string(),
    };

    if let Some(url) = backend.get("url_pattern").and_then(Value::as_str) {
        if url.contains(target) {
            citations.push(cite(MatchedField::BackendUrl, url));
        }
    }

    let host = match backend.get("host") {
        Some(Value::String(host)) => host.contains(target).then_some(host.as_str()),
        Some(Value::Array(hosts)) => hosts
            .iter()
            .filter_map(Value::as_str)
            .find(|host| host.contains(target)),
        _ => None,
    };
    if let Some(host) = host {
        citations.push(cite(MatchedField::BackendHost, host));
    }
}

/// Parses the gateway configuration out of config map data.
///
/// Uses the [`CONFIG_KEY`] entry, or else the first key (in sorted order) ending in `.json`.
pub fn document_from_config_data(data: &BTreeMap<String, String>) -> Result<Value, ScanError> {
    let (key, raw) = data
        .get_key_value(CONFIG_KEY)
        .or_else(|| data.iter().find(|(k, _)| k.ends_with(".json")))
        .ok_or_else(|| ScanError::MissingDocument {
            keys: data.keys().cloned().collect(),
        })?;

    serde_json::from_str(raw).map_err(|source| ScanError::Parse {
        key: key.clone(),
        source,
    })
}

/// Fetches and parses the gateway configuration stored in config map `name`.
#[instrument(skip(discover))]
pub async fn fetch_document<D>(discover: &D, namespace: &str, name: &str) -> Result<Value, ScanError>
where
    D: DiscoverResources + Sync + ?Sized,
{
    let data = discover
        .get_config_data(namespace, name)
        .await
        .map_err(|source| ScanError::Unavailable {
            name: name.to_string(),
            source: source.into(),
        })?;
    document_from_config_data(&data)
}

/// Formats citations as one line per reference, or a single failure line if there are none.
pub fn render_citations(target: &str, citations: &[Citation], glyphs: &Glyphs) -> String {
    if citations.is_empty() {
        return format!("{} no backend references to {target}", glyphs.failure);
    }

    citations
        .iter()
        .map(|c| format!("{} {} -> {}: {}", glyphs.success, c.locator, c.field, c.value))
        .collect::<Vec<_>>()
        .join("\n")
}

impl std::fmt::Display for MatchedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BackendUrl => f.write_str("backend-url"),
            Self::BackendHost => f.write_str("backend-host"),
        }
    }
}
