//! Application configuration management.
//!
//! Configuration is stored at `~/.config/travelbuddy/config.json`. Every
//! field is optional; environment variables (and a `.env` file loaded by
//! the binary) override what the file says.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
const APP_NAME: &str = "travelbuddy";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_CATALOG_URL: &str = "http://localhost:8080/assets/data";

/// Delay of the simulated suggestion service.
pub const DEFAULT_SUGGESTION_DELAY_MS: u64 = 1500;

pub const ENV_CATALOG_URL: &str = "TRAVELBUDDY_CATALOG_URL";
pub const ENV_DATA_DIR: &str = "TRAVELBUDDY_DATA_DIR";
pub const ENV_UNSPLASH_KEY: &str = "UNSPLASH_ACCESS_KEY";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub catalog_base_url: Option<String>,
    pub data_dir: Option<PathBuf>,
    pub unsplash_access_key: Option<String>,
    pub suggestion_delay_ms: Option<u64>,
}

impl Config {
    /// Load the config file, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file(&Self::config_path()?)?;
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn load_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Blank values are ignored so an empty `.env` entry does not wipe a
    /// configured value.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(ENV_CATALOG_URL) {
            self.catalog_base_url = Some(url);
        }
        if let Some(dir) = lookup(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(key) = lookup(ENV_UNSPLASH_KEY) {
            self.unsplash_access_key = Some(key);
        }
    }

    pub fn catalog_base_url(&self) -> &str {
        self.catalog_base_url
            .as_deref()
            .map(|url| url.trim_end_matches('/'))
            .unwrap_or(DEFAULT_CATALOG_URL)
    }

    /// Where `FileStorage` keeps its documents.
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn suggestion_delay(&self) -> Duration {
        Duration::from_millis(
            self.suggestion_delay_ms
                .unwrap_or(DEFAULT_SUGGESTION_DELAY_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.catalog_base_url(), DEFAULT_CATALOG_URL);
        assert_eq!(config.suggestion_delay(), Duration::from_millis(1500));
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_file(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"catalog_base_url": "https://cdn.example.com/data/"}"#)
            .unwrap();

        let config = Config::load_file(&path).unwrap();
        assert_eq!(config.catalog_base_url(), "https://cdn.example.com/data");
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config {
            catalog_base_url: Some("https://file.example.com".to_string()),
            ..Config::default()
        };
        config.apply_overrides(|name| match name {
            ENV_DATA_DIR => Some("/tmp/tb".to_string()),
            ENV_CATALOG_URL => Some("  ".to_string()),
            _ => None,
        });

        assert_eq!(config.catalog_base_url(), "https://file.example.com");
        assert_eq!(config.data_dir().unwrap(), PathBuf::from("/tmp/tb"));
        assert!(config.unsplash_access_key.is_none());
    }
}
