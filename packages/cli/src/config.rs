use customfly_autosave::AutosaveConfig;
use customfly_editor::SessionConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "customfly.config.json";

/// Customfly configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Edit session tuning (history size, coalesce window)
    #[serde(default)]
    pub history: SessionConfig,

    #[serde(default)]
    pub autosave: AutosaveConfig,

    /// Directory the file store writes designs to
    #[serde(default = "default_store_dir")]
    pub store_dir: String,
}

fn default_store_dir() -> String {
    ".customfly/designs".to_string()
}

impl Config {
    /// Load config from `explicit`, or from the working directory if present
    pub fn load(cwd: &str, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match explicit {
            Some(path) => {
                if !path.exists() {
                    anyhow::bail!("Config file not found: {}", path.display());
                }
                path.to_path_buf()
            }
            None => PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            tracing::debug!(path = %config_path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Absolute path of the store directory
    pub fn get_store_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.store_dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history: SessionConfig::default(),
            autosave: AutosaveConfig::default(),
            store_dir: default_store_dir(),
        }
    }
}
