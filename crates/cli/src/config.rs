//! `.mlcanvas/config.toml` loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use editor::EditorOptions;
use ml_service::HttpServiceConfig;
use serde::{Deserialize, Serialize};

/// Location checked when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = ".mlcanvas/config.toml";

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// `[service]`: training service connection.
    pub service: HttpServiceConfig,
    /// `[editor]`: session behaviour.
    pub editor: EditorOptions,
}

impl CliConfig {
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Loads `explicit` when given (it must exist), otherwise
    /// [`DEFAULT_CONFIG_PATH`] when present, otherwise the defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Applies `--api-url` / `MLCANVAS_API_URL`.
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.service.base_url = url;
        }
        self
    }
}
