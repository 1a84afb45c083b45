use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Context, Result, anyhow};

use crate::agent::RequestStyle;

pub const DEFAULT_AGENT_ID: &str = "68fd263d71c6b27d6c8eb80f";
pub const DEFAULT_ENDPOINT: &str = "http://localhost:3000/api/agent";

pub const AGENT_ID_ENV: &str = "FOLIO_AGENT_ID";
pub const ENDPOINT_ENV: &str = "FOLIO_AGENT_ENDPOINT";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub agent_id: Option<String>,
    pub endpoint: Option<String>,
    pub request_style: Option<RequestStyle>,
    pub portfolio_path: Option<PathBuf>,
}

/// Values given on the command line; they win over everything else.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub agent_id: Option<String>,
    pub endpoint: Option<String>,
    pub request_style: Option<RequestStyle>,
    pub portfolio_path: Option<PathBuf>,
}

/// Final settings after layering flags, environment, file and defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub agent_id: String,
    pub endpoint: String,
    pub request_style: RequestStyle,
    pub portfolio_path: Option<PathBuf>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config = serde_json::from_str(&config_content)
            .with_context(|| format!("parsing {}", path.display()))?;
        Ok(config)
    }

    /// Resolve settings against the process environment.
    pub fn resolve(&self, overrides: Overrides) -> Settings {
        self.resolve_with(overrides, |key| std::env::var(key).ok())
    }

    /// Resolve settings: flag, then environment, then file, then default.
    pub fn resolve_with<F>(&self, overrides: Overrides, env: F) -> Settings
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        let agent_id = non_empty(overrides.agent_id)
            .or_else(|| non_empty(env(AGENT_ID_ENV)))
            .or_else(|| non_empty(self.agent_id.clone()))
            .unwrap_or_else(|| DEFAULT_AGENT_ID.to_string());

        let endpoint = non_empty(overrides.endpoint)
            .or_else(|| non_empty(env(ENDPOINT_ENV)))
            .or_else(|| non_empty(self.endpoint.clone()))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Settings {
            agent_id,
            endpoint,
            request_style: overrides
                .request_style
                .or(self.request_style)
                .unwrap_or_default(),
            portfolio_path: overrides.portfolio_path.or_else(|| self.portfolio_path.clone()),
        }
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("folio"))
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }
}
