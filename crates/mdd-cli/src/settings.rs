//! Layered configuration: TOML file, then `MDD_*` environment variables.

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use anyhow::Context as _;
use mdd_client::ClientConfig;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
  #[serde(default = "default_base_url")]
  pub base_url:     String,
  /// SQLite file holding the persisted session. `~` is expanded.
  #[serde(default = "default_session_path")]
  pub session_path: PathBuf,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
}

fn default_base_url() -> String { "http://localhost:8080".to_string() }

fn default_session_path() -> PathBuf { PathBuf::from("~/.local/share/mdd/session.db") }

fn default_timeout_secs() -> u64 { 30 }

impl Settings {
  /// Read `path` if it exists, then let the environment override it.
  pub fn load(path: &Path) -> anyhow::Result<Self> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("MDD"))
      .build()
      .context("failed to read config file")?
      .try_deserialize()
      .context("failed to deserialise settings")
  }

  pub fn client_config(&self) -> ClientConfig {
    ClientConfig {
      base_url: self.base_url.clone(),
      timeout:  Duration::from_secs(self.timeout_secs),
    }
  }

  pub fn session_path(&self) -> PathBuf { expand_tilde(&self.session_path) }
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
