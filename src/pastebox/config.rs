use crate::error::{PasteError, Result};
use crate::model::{DEFAULT_AUTHOR, DEFAULT_DISPLAY_MODE};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";

pub const KEYS: &[&str] = &["base-path", "default-author", "display-mode"];

/// Configuration for a pastebox store, kept as `config.json` in the notes root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub struct PasteboxConfig {
    /// URL prefix for generated links, e.g. "/paste"
    #[serde(default)]
    pub base_path: String,

    /// Author recorded on new pastes when none is given
    #[serde(default = "default_author")]
    pub default_author: String,

    /// Display mode for new pastes
    #[serde(default = "default_display_mode")]
    pub display_mode: String,
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

fn default_display_mode() -> String {
    DEFAULT_DISPLAY_MODE.to_string()
}

impl Default for PasteboxConfig {
    fn default() -> Self {
        Self {
            base_path: String::new(),
            default_author: default_author(),
            display_mode: default_display_mode(),
        }
    }
}

impl PasteboxConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(PasteError::Io)?;
        let config: PasteboxConfig =
            serde_json::from_str(&content).map_err(PasteError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(PasteError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self).map_err(PasteError::Serialization)?;
        fs::write(config_path, content).map_err(PasteError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "base-path" => Some(self.base_path.clone()),
            "default-author" => Some(self.default_author.clone()),
            "display-mode" => Some(self.display_mode.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> std::result::Result<(), String> {
        match key {
            "base-path" => {
                let trimmed = value.trim_end_matches('/');
                self.base_path = if trimmed.is_empty() || trimmed.starts_with('/') {
                    trimmed.to_string()
                } else {
                    format!("/{}", trimmed)
                };
            }
            "default-author" => {
                if value.trim().is_empty() {
                    return Err("default-author cannot be empty".to_string());
                }
                self.default_author = value.to_string();
            }
            "display-mode" => {
                if !(value.starts_with("single-") || value.starts_with("multi-")) {
                    return Err(format!(
                        "display-mode must start with single- or multi-, got {}",
                        value
                    ));
                }
                self.display_mode = value.to_string();
            }
            _ => return Err(format!("Unknown config key: {}", key)),
        }
        Ok(())
    }
}
