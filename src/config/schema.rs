//! Configuration schema for Flange
//!
//! Configuration is stored at `~/.config/flange/config.toml`

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Download pattern for vanilla server builds
pub const DEFAULT_VANILLA_URL: &str =
    "https://s3.amazonaws.com/Minecraft.Download/versions/{version}/minecraft_server.{version}.jar";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local cache settings
    pub cache: CacheConfig,

    /// Remote source settings
    pub remote: RemoteConfig,
}

/// Cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache root (defaults to the platform cache directory)
    pub root: Option<PathBuf>,

    /// Partial downloads older than this many minutes are removed by `cache gc`
    pub partial_max_age_mins: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            root: None,
            partial_max_age_mins: 60,
        }
    }
}

/// Remote source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// URL template for vanilla builds (`{version}` is substituted)
    pub vanilla_url: String,

    /// URL template for patch containers (optional)
    pub patch_url: Option<String>,

    /// Per-request timeout in seconds
    pub timeout_secs: u64,

    /// Pinned patch locations (version -> URL)
    pub patches: HashMap<String, String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            vanilla_url: DEFAULT_VANILLA_URL.to_string(),
            patch_url: None,
            timeout_secs: 300,
            patches: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_serializes() {
        let config = Config::default();
        let toml = toml::to_string_pretty(&config).unwrap();
        assert!(toml.contains("[cache]"));
        assert!(toml.contains("[remote]"));
    }

    #[test]
    fn config_deserializes_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.remote.vanilla_url, DEFAULT_VANILLA_URL);
        assert_eq!(config.cache.partial_max_age_mins, 60);
        assert!(config.cache.root.is_none());
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [remote]
            patch_url = "https://ci.example.com/{version}.fldiff"

            [remote.patches]
            "1.0.0" = "https://example.com/1.0.0.fldiff"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(
            config.remote.patch_url.as_deref(),
            Some("https://ci.example.com/{version}.fldiff")
        );
        assert_eq!(config.remote.patches.len(), 1);
        assert_eq!(config.remote.timeout_secs, 300); // default preserved
    }
}
