use crate::{
    core::{
        gateway::ScanMode,
        rules::Evaluator,
        Glyphs, TerminalEnv,
    },
    inspect::{inspect, Params},
    k8s::Cluster,
};
use anyhow::{Context, Result};
use clap::Parser;
use std::{fs::OpenOptions, path::PathBuf};
use tracing::info;

/// Checks an application's workloads against mesh conventions and finds the gateway routes that
/// reach it.
#[derive(Debug, Parser)]
#[clap(name = "k8s-rules-viewer", version, about)]
pub struct Args {
    #[clap(
        long,
        default_value = "k8s_rules_viewer=info,warn",
        env = "K8S_RULES_VIEWER_LOG"
    )]
    log_level: kubert::LogFilter,

    #[clap(long, default_value = "plain")]
    log_format: kubert::LogFormat,

    #[clap(flatten)]
    client: kubert::ClientArgs,

    /// Application label to filter resources
    #[clap(long, default_value = "py-kannel")]
    label: String,

    /// Namespace to search in
    #[clap(long, short = 'n', default_value = "default")]
    namespace: String,

    /// Name of the config map holding the KrakenD configuration
    #[clap(long, default_value = "krakend-config")]
    krakend_map: String,

    /// Appends every rule verdict to this file.
    #[clap(long)]
    audit_log: Option<PathBuf>,

    /// Searches the whole KrakenD configuration, not just `endpoints[].backend[]`.
    #[clap(long)]
    deep_scan: bool,

    /// Always uses ASCII status symbols.
    #[clap(long)]
    ascii: bool,

    /// Prints the results as JSON.
    #[clap(long)]
    json: bool,
}

// === impl Args ===

impl Args {
    #[inline]
    pub async fn parse_and_run() -> Result<()> {
        Self::parse().run().await
    }

    pub async fn run(self) -> Result<()> {
        let Self {
            log_level,
            log_format,
            client,
            label,
            namespace,
            krakend_map,
            audit_log,
            deep_scan,
            ascii,
            json,
        } = self;

        log_format.try_init(log_level)?;

        let params = Params {
            label,
            namespace,
            krakend_map,
            scan_mode: if deep_scan {
                ScanMode::Deep
            } else {
                ScanMode::Routes
            },
        };
        info!(
            label = %params.label,
            namespace = %params.namespace,
            krakend_map = %params.krakend_map,
            "inspecting"
        );

        let cluster = Cluster::new(client.try_client().await?);
        let inspection = match audit_log {
            Some(path) => {
                let file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("failed to open audit log {}", path.display()))?;
                inspect(&cluster, params, Evaluator::with_audit(file)).await
            }
            None => inspect(&cluster, params, Evaluator::new()).await,
        };

        if json {
            println!("{}", inspection.to_json()?);
        } else {
            let glyphs = if ascii {
                Glyphs::ASCII
            } else {
                Glyphs::detect(&TerminalEnv::from_env())
            };
            println!("{}", inspection.render(&glyphs));
        }

        info!(
            passed = inspection.report.passed(),
            total = inspection.report.results.len(),
            "inspection complete"
        );
        Ok(())
    }
}
