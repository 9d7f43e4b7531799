//! event-worker — evaluates one webhook event delivery against the
//! repository's policy configuration.
//!
//! Reads a webhook payload JSON from disk, builds a REST client and a
//! fresh component registry, runs the engine, and logs the per-rule
//! outcomes. Intended to be invoked by whatever receives the webhooks
//! (a CI job, a queue consumer, a bot process).

use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use tracing::info;

use warden_engine::config::ConfigMode;
use warden_engine::engine;
use warden_engine::registry::Registry;
use warden_github::{EventContext, RestClient};

// ── CLI ─────────────────────────────────────────────────────────────

/// Policy engine worker — evaluates one repository event.
#[derive(Parser, Debug)]
#[command(name = "event-worker", version, about)]
struct Cli {
    /// GitHub API token.
    #[arg(long, env = "GITHUB_TOKEN")]
    token: String,

    /// Repository slug, e.g. `octocat/hello-world`.
    #[arg(long, env = "GITHUB_REPOSITORY")]
    repo: String,

    /// Webhook event name (e.g. `pull_request`, `issues`, `schedule`).
    #[arg(long)]
    event: String,

    /// Path to the webhook payload JSON.
    #[arg(long)]
    payload: PathBuf,

    /// Parse the policy configuration as the legacy flat shape.
    #[arg(long, default_value_t = false)]
    legacy_config: bool,
}

// ── main ────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let (owner, repo) = cli
        .repo
        .split_once('/')
        .context("repository slug must be owner/repo")?;

    let raw = std::fs::read_to_string(&cli.payload)
        .with_context(|| format!("reading payload {}", cli.payload.display()))?;
    let payload: serde_json::Value = serde_json::from_str(&raw).context("parsing payload JSON")?;
    let action = payload
        .get("action")
        .and_then(|action| action.as_str())
        .unwrap_or_default()
        .to_string();

    let ctx = EventContext::new(cli.event, action, payload, owner, repo);
    let client = RestClient::new(&cli.token, owner, repo)?;
    let mode = if cli.legacy_config {
        ConfigMode::Legacy
    } else {
        ConfigMode::Versioned
    };

    let mut registry = Registry::new();
    let outcomes = engine::execute(ctx, &client, &mut registry, mode).await?;

    for outcome in &outcomes {
        info!(
            rule = outcome.rule_index,
            verdict = %outcome.verdict,
            checks = outcome.results.len(),
            "rule completed"
        );
    }
    info!(rules = outcomes.len(), "event processed");
    Ok(())
}
