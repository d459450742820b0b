//! HTTP server assembly for Tally.
//!
//! Loads [`ServerConfig`], and wraps the subscription API with a health check
//! and per-request tracing.

use std::path::{Path, PathBuf};

use axum::{Router, routing::get};
use serde::Deserialize;
use tally_api::ApiState;
use tally_core::store::SubscriptionStore;
use tower_http::trace::TraceLayer;

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration.
///
/// Layered, lowest precedence first: built-in defaults, the optional TOML
/// file, then `TALLY_*` environment variables (e.g. `TALLY_PORT=9000`).
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:              String,
  pub port:              u16,
  pub store_path:        PathBuf,
  /// Page size for list requests that omit `limit`.
  pub default_page_size: i64,
}

impl ServerConfig {
  pub fn load(file: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .set_default("host", "0.0.0.0")?
      .set_default("port", 8080)?
      .set_default("store_path", "subscriptions.db")?
      .set_default("default_page_size", tally_api::DEFAULT_PAGE_SIZE)?
      .add_source(config::File::from(file.to_path_buf()).required(false))
      .add_source(config::Environment::with_prefix("TALLY"))
      .build()?
      .try_deserialize()
  }

  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  /// `store_path` with a leading `~/` expanded to the user's home directory.
  pub fn resolved_store_path(&self) -> PathBuf { expand_tilde(&self.store_path) }
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// The full application: `/health` plus the subscription API, traced.
pub fn app<S>(state: ApiState<S>) -> Router
where
  S: SubscriptionStore + 'static,
{
  Router::new()
    .route("/health", get(health))
    .merge(tally_api::api_router(state))
    .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str { "OK" }
