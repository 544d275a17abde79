// src/config.rs
//! Application configuration: `config/pricing.toml` plus env overrides.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::compliance::CompliancePolicy;
use crate::harvest::HarvestConfig;
use crate::matcher::Matcher;

pub const DEFAULT_CONFIG_PATH: &str = "config/pricing.toml";
pub const DEFAULT_BIND: &str = "0.0.0.0:8000";

pub const ENV_CONFIG_PATH: &str = "PRICING_CONFIG_PATH";
pub const ENV_BIND: &str = "PRICING_BIND";
pub const ENV_BASE_URL: &str = "PNCP_BASE_URL";
pub const ENV_QPS_LIMIT: &str = "PNCP_QPS_LIMIT";
pub const ENV_MAX_RETRIES: &str = "PNCP_MAX_RETRIES";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Optional JSON array of award records loaded into the in-memory source.
    pub seed_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            seed_path: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub harvest: HarvestConfig,
    pub matcher: Matcher,
    pub compliance: CompliancePolicy,
}

impl AppConfig {
    /// Parse a TOML file; missing sections and keys fall back to defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }

    /// Resolve the config:
    /// 1) $PRICING_CONFIG_PATH (must exist)
    /// 2) config/pricing.toml if present
    /// 3) built-in defaults
    ///
    /// then apply env overrides.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!(
                    "{ENV_CONFIG_PATH} points to non-existent path {}",
                    pb.display()
                ));
            }
            Self::load_from(&pb)?
        } else {
            let default = PathBuf::from(DEFAULT_CONFIG_PATH);
            if default.exists() {
                Self::load_from(&default)?
            } else {
                Self::default()
            }
        };
        cfg.apply_env()?;
        cfg.harvest.validate()?;
        Ok(cfg)
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Some(v) = env_nonempty(ENV_BIND) {
            self.server.bind = v;
        }
        if let Some(v) = env_nonempty(ENV_BASE_URL) {
            self.harvest.base_url = v;
        }
        if let Some(v) = env_nonempty(ENV_QPS_LIMIT) {
            self.harvest.qps_limit = v
                .parse()
                .with_context(|| format!("{ENV_QPS_LIMIT}={v} is not a number"))?;
        }
        if let Some(v) = env_nonempty(ENV_MAX_RETRIES) {
            self.harvest.max_retries = v
                .parse()
                .with_context(|| format!("{ENV_MAX_RETRIES}={v} is not an integer"))?;
        }
        Ok(())
    }
}

fn env_nonempty(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
