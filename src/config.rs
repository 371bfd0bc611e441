use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::{AppError, Result};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    pub api_token: Option<String>,

    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_token: None,
            search_debounce_ms: default_search_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| AppError::Config(format!("invalid api_url '{}': {}", self.api_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::Config(format!(
                "api_url must be http or https, got '{}'",
                url.scheme()
            )));
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("draft-desk")
            .join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_fill_missing_fields() {
        let file = write_config("api_token = \"secret\"\n");
        let config = Config::load_from(file.path()).unwrap();

        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.api_token.as_deref(), Some("secret"));
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_explicit_values() {
        let file = write_config(
            "api_url = \"https://app.example.com\"\nsearch_debounce_ms = 150\nrequest_timeout_secs = 5\n",
        );
        let config = Config::load_from(file.path()).unwrap();

        assert_eq!(config.api_url, "https://app.example.com");
        assert!(config.api_token.is_none());
        assert_eq!(config.search_debounce_ms, 150);
        assert_eq!(config.request_timeout_secs, 5);
    }

    #[test]
    fn test_rejects_invalid_api_url() {
        let file = write_config("api_url = \"not a url\"\n");
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_rejects_non_http_scheme() {
        let file = write_config("api_url = \"ftp://example.com\"\n");
        assert!(matches!(
            Config::load_from(file.path()),
            Err(AppError::Config(_))
        ));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let file = write_config("api_url = ");
        assert!(matches!(
            Config::load_from(file.path()),
            Err(AppError::Toml(_))
        ));
    }
}
