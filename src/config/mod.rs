pub mod site;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::eta::Locale;

pub use site::{SiteConfigError, SiteConfiguration};

const APP_DIR: &str = "paper-eta";

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where site configuration and screen dumps live
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// ETA locale used when a settings form does not choose one
    #[serde(default)]
    pub default_locale: Locale,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            storage_dir: None,
            log_level: default_log_level(),
            default_locale: Locale::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join(APP_DIR);

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Ok(AppConfig::default()),
        }
    }

    /// Load config from `path`. A missing file is created with defaults;
    /// an unreadable or broken one is an error and is left untouched.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            let config = AppConfig::default();
            if let Err(e) = config.save_to(path) {
                tracing::warn!("Failed to write default config: {}", e);
            }
            return Ok(config);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let mut clean_config = self.clone();

        // Blank storage paths fall back to the default location
        if clean_config
            .storage_dir
            .as_ref()
            .map(|p| p.as_os_str().is_empty())
            .unwrap_or(false)
        {
            clean_config.storage_dir = None;
        }

        let content = toml::to_string_pretty(&clean_config)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Resolved storage directory
    pub fn storage_dir(&self) -> PathBuf {
        self.storage_dir.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(APP_DIR)
        })
    }

    /// Location of the site configuration JSON
    pub fn site_config_path(&self) -> PathBuf {
        self.storage_dir().join("config.json")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            storage_dir: Some(PathBuf::from("/var/lib/paper-eta")),
            log_level: "debug".to_string(),
            default_locale: Locale::Tc,
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: AppConfig = toml::from_str("log_level = \"warn\"").unwrap();
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.default_locale, Locale::En);
        assert_eq!(config.storage_dir, None);
    }

    #[test]
    fn test_load_from_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config, AppConfig::default());
        assert!(path.exists());
        assert_eq!(AppConfig::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_broken_config_is_reported_and_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not = [valid").unwrap();

        let err = AppConfig::load_from(&path).unwrap_err();
        assert!(err.to_string().starts_with("Failed to parse"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not = [valid");
    }

    #[test]
    fn test_site_config_path() {
        let config = AppConfig {
            storage_dir: Some(PathBuf::from("/srv/eta")),
            ..AppConfig::default()
        };
        assert_eq!(config.site_config_path(), PathBuf::from("/srv/eta/config.json"));
    }
}
