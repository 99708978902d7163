use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Result;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_service_url")]
    pub service_url: String,
    #[serde(default = "default_theme")]
    pub theme: String,
    /// Render the last service failure in the status line. Failures are
    /// always logged either way.
    #[serde(default)]
    pub show_errors: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

fn default_service_url() -> String {
    "http://127.0.0.1:5000".to_string()
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: default_service_url(),
            theme: default_theme(),
            show_errors: false,
            request_timeout_secs: None,
            log_file: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str::<Config>(&content)?
        } else {
            Config::default()
        };
        config.normalize_service_url();
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mathprep")
            .join("config.toml")
    }

    pub fn log_path(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => PathBuf::from(path),
            None => dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("mathprep")
                .join("mathprep.log"),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs
            .filter(|&secs| secs > 0)
            .map(Duration::from_secs)
    }

    /// Strip surrounding whitespace and trailing slashes; an empty value
    /// falls back to the default address.
    pub fn normalize_service_url(&mut self) {
        let trimmed = self.service_url.trim().trim_end_matches('/');
        self.service_url = if trimmed.is_empty() {
            default_service_url()
        } else {
            trimmed.to_string()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.service_url, "http://127.0.0.1:5000");
        assert_eq!(config.theme, "catppuccin-mocha");
        assert!(!config.show_errors);
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_config_partial_file() {
        let toml_str = r#"
service_url = "http://tutor.local:8080/"
show_errors = true
request_timeout_secs = 15
"#;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, toml_str).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.service_url, "http://tutor.local:8080");
        assert!(config.show_errors);
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(15)));
        assert_eq!(config.theme, "catppuccin-mocha");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.service_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "service_url = [").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_zero_timeout_means_none() {
        let config = Config {
            request_timeout_secs: Some(0),
            ..Config::default()
        };
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_blank_url_falls_back() {
        let mut config = Config {
            service_url: "  ".to_string(),
            ..Config::default()
        };
        config.normalize_service_url();
        assert_eq!(config.service_url, "http://127.0.0.1:5000");
    }

    #[test]
    fn test_config_roundtrip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            theme: "terminal-default".to_string(),
            log_file: Some("/tmp/mathprep.log".to_string()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.theme, "terminal-default");
        assert_eq!(loaded.log_path(), PathBuf::from("/tmp/mathprep.log"));
    }
}
