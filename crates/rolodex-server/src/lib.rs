//! Server assembly for Rolodex: configuration and the combined router that
//! mounts both surfaces over one [`Directory`].

use std::path::{Path, PathBuf};

use axum::{Router, extract::DefaultBodyLimit};
use rolodex_core::{directory::Directory, store::PersonStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROLODEX_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:           String,
  #[serde(default = "default_port")]
  pub port:           u16,
  #[serde(default = "default_store_path")]
  pub store_path:     PathBuf,
  #[serde(default = "default_max_body_bytes")]
  pub max_body_bytes: usize,
}

fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_store_path() -> PathBuf { PathBuf::from("rolodex.db") }
fn default_max_body_bytes() -> usize { 64 * 1024 }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:           default_host(),
      port:           default_port(),
      store_path:     default_store_path(),
      max_body_bytes: default_max_body_bytes(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Mount the resource surface under `/api` and the query surface at
/// `/query`, both over the same `directory`.
pub fn app<S>(directory: Directory<S>, config: &ServerConfig) -> Router
where
  S: PersonStore + 'static,
{
  Router::new()
    .nest("/api", rolodex_api::api_router(directory.clone()))
    .merge(rolodex_query::query_router(directory))
    .layer(DefaultBodyLimit::max(config.max_body_bytes))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_fill_missing_keys() {
    let settings = config::Config::builder()
      .set_override("port", 9000)
      .unwrap()
      .build()
      .unwrap();
    let cfg: ServerConfig = settings.try_deserialize().unwrap();
    assert_eq!(cfg.port, 9000);
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.store_path, PathBuf::from("rolodex.db"));
    assert_eq!(cfg.address(), "127.0.0.1:9000");
  }

  #[test]
  fn tilde_is_expanded_only_as_prefix() {
    let plain = Path::new("/var/lib/rolodex.db");
    assert_eq!(expand_tilde(plain), plain);
    let odd = Path::new("data/~/rolodex.db");
    assert_eq!(expand_tilde(odd), odd);
  }
}
