//! Configuration management for Flange

pub mod schema;

pub use schema::Config;

use crate::error::{FlangeError, FlangeResult};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flange")
            .join("config.toml")
    }

    /// Get the default cache root
    pub fn default_cache_root() -> PathBuf {
        dirs::cache_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("flange")
    }

    /// Cache root: explicit override, then config, then platform default
    pub fn cache_root(config: &Config, override_root: Option<&Path>) -> PathBuf {
        override_root
            .map(Path::to_path_buf)
            .or_else(|| config.cache.root.clone())
            .unwrap_or_else(Self::default_cache_root)
    }

    /// Load configuration, creating default if not exists
    pub async fn load(&self) -> FlangeResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> FlangeResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| FlangeError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| FlangeError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Save configuration to file
    pub async fn save(&self, config: &Config) -> FlangeResult<()> {
        self.ensure_config_dir().await?;

        let content = toml::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            FlangeError::io(
                format!("writing config to {}", self.config_path.display()),
                e,
            )
        })?;

        info!("Configuration saved to {}", self.config_path.display());
        Ok(())
    }

    /// Ensure the config directory exists
    async fn ensure_config_dir(&self) -> FlangeResult<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| FlangeError::ConfigDirCreate {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_default_when_missing() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nonexistent.toml");
        let manager = ConfigManager::with_path(path);

        let config = manager.load().await.unwrap();
        assert_eq!(config.remote.timeout_secs, 300);
    }

    #[tokio::test]
    async fn save_and_load_roundtrip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.toml");
        let manager = ConfigManager::with_path(path);

        let mut config = Config::default();
        config.cache.root = Some(PathBuf::from("/srv/flange"));
        config.remote.timeout_secs = 30;

        manager.save(&config).await.unwrap();
        let loaded = manager.load().await.unwrap();

        assert_eq!(loaded.cache.root, Some(PathBuf::from("/srv/flange")));
        assert_eq!(loaded.remote.timeout_secs, 30);
    }

    #[tokio::test]
    async fn invalid_config_is_reported() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        std::fs::write(&path, "[remote\ntimeout_secs = ").unwrap();

        let err = ConfigManager::with_path(path).load().await.unwrap_err();
        assert!(matches!(err, FlangeError::ConfigInvalid { .. }));
    }

    #[test]
    fn cache_root_precedence() {
        let mut config = Config::default();
        assert_eq!(
            ConfigManager::cache_root(&config, None),
            ConfigManager::default_cache_root()
        );

        config.cache.root = Some(PathBuf::from("/from/config"));
        assert_eq!(
            ConfigManager::cache_root(&config, None),
            PathBuf::from("/from/config")
        );
        assert_eq!(
            ConfigManager::cache_root(&config, Some(Path::new("/from/flag"))),
            PathBuf::from("/from/flag")
        );
    }
}
