use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sync::anthropic::{ANTHROPIC_API_BASE, DEFAULT_MODEL};
use crate::sync::github::GITHUB_API_BASE;

pub const CONFIG_FILE: &str = "config.json";

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("~/.local/share"))
        .join("taskflow")
}

fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("~/.config"))
        .join("taskflow")
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub data_directory: PathBuf,
    pub debug_logging: bool,
    pub github_api_base: String,
    pub anthropic_api_base: String,
    pub ai_model: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_directory: default_data_dir(),
            debug_logging: false,
            github_api_base: GITHUB_API_BASE.to_string(),
            anthropic_api_base: ANTHROPIC_API_BASE.to_string(),
            ai_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        default_config_dir().join(CONFIG_FILE)
    }

    /// Read the config file; a missing or broken file yields the defaults.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}
