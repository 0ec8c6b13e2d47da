//! Configuration for the Balcão consumer crates.
//!
//! Layering, lowest precedence first:
//!
//! 1. Built-in defaults ([`Config::default`]).
//! 2. An optional YAML file: `$BLC_CONFIG` if set, else `./balcao.yaml`
//!    when present.
//! 3. `BLC_*` environment variable overrides.
//!
//! `load()` applies all three layers and validates the result. Binaries call
//! [`bootstrap_dotenv`] first so a dev-time `.env.local` can feed layer 3.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Default config file probed in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "balcao.yaml";

/// Env var naming the config file explicitly.
pub const CONFIG_PATH_VAR: &str = "BLC_CONFIG";

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Base URL of the collaborator API, including any path prefix
    /// (e.g. `https://host/api`). No trailing slash.
    pub api_base_url: String,
    /// Directory for locally persisted client state (the cart store).
    pub data_dir: PathBuf,
    pub live: LiveRetryConfig,
}

/// Reconnect policy for the live update channel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LiveRetryConfig {
    /// Reconnect attempts after a dropped stream before giving up.
    /// Zero disables reconnecting entirely.
    pub max_attempts: u32,
    /// First backoff delay; doubles per attempt.
    pub base_delay_ms: u64,
    /// Backoff ceiling.
    pub max_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:3000".to_string(),
            data_dir: PathBuf::from(".balcao"),
            live: LiveRetryConfig::default(),
        }
    }
}

impl Default for LiveRetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
        }
    }
}

impl Config {
    /// Apply all three layers and validate.
    pub fn load() -> Result<Self> {
        let mut cfg = match config_file_path() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        cfg.apply_env()?;
        cfg.normalize();
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a single YAML file over the defaults (`serde(default)` fills
    /// missing fields).
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config failed: {}", path.display()))?;
        let cfg: Self = serde_yaml::from_str(&raw)
            .with_context(|| format!("parse config failed: {}", path.display()))?;
        Ok(cfg)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(v) = env::var("BLC_API_BASE_URL") {
            self.api_base_url = v;
        }
        if let Ok(v) = env::var("BLC_DATA_DIR") {
            self.data_dir = PathBuf::from(v);
        }
        if let Ok(v) = env::var("BLC_LIVE_MAX_ATTEMPTS") {
            self.live.max_attempts = v
                .parse()
                .context("BLC_LIVE_MAX_ATTEMPTS must be an integer")?;
        }
        if let Ok(v) = env::var("BLC_LIVE_BASE_DELAY_MS") {
            self.live.base_delay_ms = v
                .parse()
                .context("BLC_LIVE_BASE_DELAY_MS must be an integer")?;
        }
        if let Ok(v) = env::var("BLC_LIVE_MAX_DELAY_MS") {
            self.live.max_delay_ms = v
                .parse()
                .context("BLC_LIVE_MAX_DELAY_MS must be an integer")?;
        }
        Ok(())
    }

    fn normalize(&mut self) {
        while self.api_base_url.ends_with('/') {
            self.api_base_url.pop();
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.is_empty() {
            bail!("api_base_url must not be empty");
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            bail!("api_base_url must start with http:// or https://");
        }
        if self.live.max_delay_ms < self.live.base_delay_ms {
            bail!("live.max_delay_ms must be >= live.base_delay_ms");
        }
        Ok(())
    }
}

fn config_file_path() -> Option<PathBuf> {
    if let Ok(explicit) = env::var(CONFIG_PATH_VAR) {
        return Some(PathBuf::from(explicit));
    }
    let default = PathBuf::from(DEFAULT_CONFIG_FILE);
    default.exists().then_some(default)
}

/// Dev-time `.env.local` bootstrap. Missing file is fine.
pub fn bootstrap_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
