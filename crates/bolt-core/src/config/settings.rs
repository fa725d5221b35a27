use crate::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

use super::validation::warn_unknown_fields;

/// Main configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Accelerator that toggles the launcher window, e.g. `<Super>space`
    #[serde(default = "default_global_shortcut")]
    pub global_shortcut: String,

    /// Mode shown when the application starts
    #[serde(default = "default_mode")]
    pub default_mode: String,

    #[serde(default)]
    pub launcher: LauncherConfig,

    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LauncherConfig {
    /// Maximum number of applications listed for a query
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiConfig {
    #[serde(default)]
    pub vertex_api_key: Option<String>,

    #[serde(default)]
    pub openrouter_api_key: Option<String>,
}

fn default_global_shortcut() -> String {
    "<Super>space".to_string()
}

fn default_mode() -> String {
    "Launcher".to_string()
}

fn default_max_results() -> usize {
    10
}

impl Default for Config {
    fn default() -> Self {
        Self {
            global_shortcut: default_global_shortcut(),
            default_mode: default_mode(),
            launcher: LauncherConfig::default(),
            ai: AiConfig::default(),
        }
    }
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            max_results: default_max_results(),
        }
    }
}

impl Config {
    /// Load configuration from `path`. A missing file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        warn_unknown_fields(&content, "config.json");
        Ok(serde_json::from_str(&content)?)
    }

    /// Like [`Config::load`], but logs the failure and falls back to defaults.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_else(|e| {
            warn!("Failed to load {}: {e}, using defaults", path.display());
            Self::default()
        })
    }
}

impl AiConfig {
    /// Vertex AI key, if set to something other than whitespace.
    #[must_use]
    pub fn vertex_key(&self) -> Option<&str> {
        non_blank(self.vertex_api_key.as_deref())
    }

    #[must_use]
    pub fn openrouter_key(&self) -> Option<&str> {
        non_blank(self.openrouter_api_key.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
