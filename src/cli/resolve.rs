//! Resolve command - merge targets and materialize their value sources.
//!
//! Prints a summary only. Resolved values are never printed.

use std::time::Duration;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::cli::{output, Context};
use crate::core::config::TargetSelection;
use crate::core::constants;
use crate::core::domain::TargetConfig;
use crate::core::merge;
use crate::core::provider::ProviderFetcher;
use crate::core::resolve::Resolver;
use crate::error::Result;

/// Redacted view of a resolved target.
#[derive(Debug, Serialize)]
struct Summary<'a> {
    target: &'a str,
    name: &'a str,
    image: String,
    server: &'a str,
    port: u16,
    replicas: u32,
    domains: Vec<&'a str>,
    env: Vec<&'a str>,
    registry_auth: bool,
}

impl<'a> From<&'a TargetConfig> for Summary<'a> {
    fn from(config: &'a TargetConfig) -> Self {
        Self {
            target: &config.target,
            name: &config.name,
            image: config.image.reference(),
            server: &config.server,
            port: config.port,
            replicas: config.replicas,
            domains: config.domains.iter().map(|d| d.domain.as_str()).collect(),
            env: config.env.iter().map(|e| e.name.as_str()).collect(),
            registry_auth: config.image.registry.is_some(),
        }
    }
}

/// Execute the resolve command.
pub fn execute(ctx: &Context, selection: TargetSelection, json: bool) -> Result<()> {
    let config = ctx.load_config()?;
    let mut targets = merge::resolve_targets(&config, &selection)?;
    info!(targets = targets.len(), "targets merged");

    let mut fetcher = ProviderFetcher::new();
    if let Some(dir) = &ctx.store_dir {
        fetcher = fetcher.with_store_dir(dir);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("interrupted, cancelling fetches");
                on_interrupt.cancel();
            }
        });

        Resolver::new(&fetcher, config.secret_providers.as_ref())
            .with_cancellation(cancel)
            .with_timeout(Duration::from_secs(constants::FETCH_TIMEOUT_SECS))
            .resolve_all(&mut targets)
            .await
    })?;

    let summaries: Vec<Summary<'_>> = targets.iter().map(Summary::from).collect();
    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for summary in &summaries {
        output::section(summary.target);
        output::kv("name", summary.name);
        output::kv("image", &summary.image);
        output::kv("server", summary.server);
        output::kv("port", summary.port);
        output::kv("replicas", summary.replicas);
        if !summary.domains.is_empty() {
            output::kv("domains", summary.domains.join(", "));
        }
        for name in &summary.env {
            output::list_item(&format!("{} = {}", output::key(name), "********"));
        }
    }
    println!();
    output::success(&format!("{} target(s) resolved", summaries.len()));
    Ok(())
}
