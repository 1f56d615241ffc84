use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";
pub const DEFAULT_PLACEHOLDER_POSTER: &str = "https://via.placeholder.com/300x445?text=No+Image";

/// Optional colour overrides, each a `#RRGGBB` or `#RGB` string
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_bg: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the review backend
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Image shown instead of posters the provider marks as "N/A"
    #[serde(default = "default_placeholder_poster")]
    pub placeholder_poster: String,

    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}

fn default_placeholder_poster() -> String {
    DEFAULT_PLACEHOLDER_POSTER.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            placeholder_poster: default_placeholder_poster(),
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("reelnote");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Directory for the TUI's log file
    pub fn log_dir() -> PathBuf {
        dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(std::env::temp_dir)
            .join("reelnote")
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        match Self::config_path() {
            Ok(path) => Ok(Self::load_from(&path)),
            Err(_) => Ok(AppConfig::default()),
        }
    }

    /// A missing file is created with defaults. A file that cannot be read
    /// or parsed is left untouched and defaults are used for this run.
    fn load_from(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match Self::parse(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
            return AppConfig::default();
        }

        let config = AppConfig::default();
        if let Err(e) = config.save_to(path) {
            tracing::warn!("Could not write default config: {}", e);
        }
        config
    }

    fn parse(content: &str) -> Result<Self> {
        let mut config: AppConfig = toml::from_str(content)?;
        config.backend_url = config.backend_url.trim().to_string();
        if config.backend_url.is_empty() {
            config.backend_url = default_backend_url();
        }
        Ok(config)
    }

    /// Save config to file
    fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = AppConfig {
            backend_url: "http://movies.local:8080".to_string(),
            placeholder_poster: "http://img/none.png".to_string(),
            theme: ThemeConfig {
                accent: Some("#FFC107".to_string()),
                ..ThemeConfig::default()
            },
        };

        let serialized = toml::to_string_pretty(&config).unwrap();
        let deserialized: AppConfig = toml::from_str(&serialized).unwrap();

        assert_eq!(config, deserialized);
        assert!(!serialized.contains("danger"));
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, AppConfig::default());

        let config = AppConfig::parse("backend_url = \"  http://10.0.0.2:3000 \"\n").unwrap();
        assert_eq!(config.backend_url, "http://10.0.0.2:3000");
        assert_eq!(config.placeholder_poster, DEFAULT_PLACEHOLDER_POSTER);
    }

    #[test]
    fn test_blank_backend_url_falls_back() {
        let config = AppConfig::parse("backend_url = \"\"").unwrap();
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        assert!(AppConfig::parse("backend_url = ").is_err());
    }

    #[test]
    fn test_missing_file_is_created_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = AppConfig::load_from(&path);
        assert_eq!(config, AppConfig::default());

        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(AppConfig::parse(&written).unwrap(), AppConfig::default());
    }

    #[test]
    fn test_broken_file_is_left_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let broken = "backend_url = \n[theme\n";
        std::fs::write(&path, broken).unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config, AppConfig::default());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), broken);
    }

    #[test]
    fn test_existing_file_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "backend_url = \"http://movies.local:8080\"\n").unwrap();

        let config = AppConfig::load_from(&path);
        assert_eq!(config.backend_url, "http://movies.local:8080");
        assert_eq!(config.placeholder_poster, DEFAULT_PLACEHOLDER_POSTER);
    }
}
