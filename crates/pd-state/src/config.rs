//! Draw configuration
//!
//! Persistent settings for a draw host:
//! - Event name (groups autosave files)
//! - Optional RNG seed for rehearsals
//! - Reveal delay between stop and winner
//! - Autosave settings

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::AutosaveConfig;

/// Draw host configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawConfig {
    /// Event name shown in logs and used for autosave files
    pub event_name: String,
    /// Fixed RNG seed (rehearsals only; `None` seeds from the OS)
    pub seed: Option<u64>,
    /// Delay between a stop request and the winner reveal (ms)
    pub reveal_delay_ms: u64,
    /// Autosave settings
    pub autosave: AutosaveConfig,
}

impl Default for DrawConfig {
    fn default() -> Self {
        Self {
            event_name: "Prize Draw".to_string(),
            seed: None,
            reveal_delay_ms: 0,
            autosave: AutosaveConfig::default(),
        }
    }
}

impl DrawConfig {
    /// Load from the standard location
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load from a path, falling back to defaults if missing or invalid
    pub fn load_from<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    log::warn!("Invalid config {:?}, using defaults: {}", path, e);
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    /// Save to a path
    pub fn save_to<P: AsRef<Path>>(&self, path: P) -> std::io::Result<()> {
        if let Some(parent) = path.as_ref().parent() {
            fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, json)
    }

    /// Standard config file location
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .map(|d| d.join("prize-draw"))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.json")
    }
}
