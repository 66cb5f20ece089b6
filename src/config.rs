//! Configuration management
//!
//! Config file loading/saving and API key resolution.
//! Config is stored at ~/.config/reelview/config.toml

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// TMDB API read access token
    pub tmdb_api_key: Option<String>,
}

impl Config {
    /// Get config file path (~/.config/reelview/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reelview").join("config.toml"))
    }

    /// Load config from file, or return default if not found
    pub fn load() -> Self {
        Self::path()
            .and_then(|p| std::fs::read_to_string(p).ok())
            .and_then(|s| toml::from_str(&s).ok())
            .unwrap_or_default()
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::path().ok_or_else(|| anyhow::anyhow!("Could not determine config path"))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml = toml::to_string_pretty(self)?;
        std::fs::write(path, toml)?;
        Ok(())
    }

    /// Resolve the TMDB API key:
    /// 1. Environment variable TMDB_API_KEY
    /// 2. Key from config file
    pub fn get_tmdb_api_key(&self) -> Result<String> {
        if let Ok(key) = std::env::var("TMDB_API_KEY") {
            if !key.is_empty() {
                return Ok(key);
            }
        }

        if let Some(ref key) = self.tmdb_api_key {
            return Ok(key.clone());
        }

        Err(anyhow::anyhow!(
            "No TMDB API key. Set TMDB_API_KEY or add tmdb_api_key to {}",
            Self::path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "the config file".to_string())
        ))
    }
}
