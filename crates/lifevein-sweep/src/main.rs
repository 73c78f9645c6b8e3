//! lifevein-sweep binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), builds the
//! failover gateway over the configured regions, and deletes expired blood
//! requests on a fixed interval. Replaces the scheduled cleanup that used
//! to run as a hosted function.

use std::{path::PathBuf, sync::Arc, time::Duration};

use anyhow::Context as _;
use chrono::Utc;
use clap::Parser;
use lifevein_gateway::{AnonymousAuth, Gateway, RestEndpoint};
use lifevein_match::MatchEngine;
use serde::Deserialize;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Expired blood-request sweeper")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,

  /// Run a single sweep and exit instead of looping.
  #[arg(long)]
  once: bool,
}

#[derive(Clone, Deserialize)]
struct SweepConfig {
  /// Primary region base URL.
  primary_url:  String,
  /// Optional second region, tried when the primary fails.
  fallback_url: Option<String>,

  /// Anonymous sign-up endpoint of the identity service. When both this
  /// and `api_key` are set, every request carries a session token.
  signup_url: Option<String>,
  api_key:    Option<String>,

  #[serde(default = "default_interval_minutes")]
  interval_minutes: u64,
  /// Soft budget for one sweep; an overrun is logged and retried next
  /// tick, never escalated.
  #[serde(default = "default_timeout_secs")]
  timeout_secs: u64,
}

fn default_interval_minutes() -> u64 {
  60
}

fn default_timeout_secs() -> u64 {
  15
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Initialise tracing.
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  // Load configuration.
  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config).required(false))
    .add_source(config::Environment::with_prefix("LIFEVEIN"))
    .build()
    .context("failed to read config file")?;

  let sweep_cfg: SweepConfig = settings
    .try_deserialize()
    .context("failed to deserialise SweepConfig")?;

  let engine = build_engine(&sweep_cfg);

  if cli.once {
    sweep_once(&engine, sweep_cfg.timeout_secs).await;
    return Ok(());
  }

  let mut ticker =
    tokio::time::interval(Duration::from_secs(sweep_cfg.interval_minutes * 60));
  tracing::info!(
    interval_minutes = sweep_cfg.interval_minutes,
    "sweep loop started"
  );

  loop {
    ticker.tick().await;
    sweep_once(&engine, sweep_cfg.timeout_secs).await;
  }
}

fn build_engine(cfg: &SweepConfig) -> MatchEngine<RestEndpoint> {
  let auth = match (&cfg.signup_url, &cfg.api_key) {
    (Some(url), Some(key)) => Some(Arc::new(AnonymousAuth::new(url, key))),
    _ => None,
  };

  let with_auth = |endpoint: RestEndpoint| match &auth {
    Some(auth) => endpoint.with_auth(auth.clone()),
    None => endpoint,
  };

  let mut endpoints = vec![with_auth(RestEndpoint::new("primary", &cfg.primary_url))];
  if let Some(fallback) = &cfg.fallback_url {
    endpoints.push(with_auth(RestEndpoint::new("fallback", fallback)));
  }

  MatchEngine::new(Gateway::new(endpoints))
}

/// One sweep pass. Failures and overruns are logged, never propagated;
/// the next tick simply tries again.
async fn sweep_once(engine: &MatchEngine<RestEndpoint>, timeout_secs: u64) {
  let now = Utc::now().timestamp_millis();
  let budget = Duration::from_secs(timeout_secs);

  match tokio::time::timeout(budget, engine.cleanup_expired(now)).await {
    Ok(Ok(removed)) => {
      tracing::info!(removed = removed.len(), "sweep complete");
    }
    Ok(Err(error)) => {
      tracing::warn!(%error, "sweep failed");
    }
    Err(_) => {
      tracing::warn!(timeout_secs, "sweep exceeded its time budget");
    }
  }
}
