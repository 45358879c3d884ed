//! Tool settings for the InfraGenius toolkit
//!
//! Provides TOML-based settings with defaults and validation.
//! Location: ~/.infragenius/config.toml
//!
//! These are settings for the setup tool itself. The files the tool
//! generates inside a project (config.json, .env, compose manifests)
//! live in src/artifacts and src/deploy.

use crate::errors::{Result, SetupError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete settings for the toolkit.
///
/// Every section is optional in the file; an omitted section keeps
/// its built-in defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub ollama: OllamaSettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub deploy: DeploySettings,
    #[serde(default)]
    pub paths: PathsSettings,
}

/// Ollama connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    pub host: String,
    pub port: u16,
    pub default_model: String,
    pub request_timeout_secs: u64,
}

/// MCP app server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub workers: usize,
}

/// Professional deployment defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploySettings {
    pub domain: String,
    pub monitoring: String,
}

/// File system paths for tool state (PID files, daemon logs)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsSettings {
    pub state_dir: String,
    pub log_dir: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ollama: OllamaSettings::default(),
            server: ServerSettings::default(),
            deploy: DeploySettings::default(),
            paths: PathsSettings::default(),
        }
    }
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 11434,
            default_model: "gpt-oss:latest".to_string(),
            request_timeout_secs: 120,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            workers: 4,
        }
    }
}

impl Default for DeploySettings {
    fn default() -> Self {
        Self {
            domain: "localhost".to_string(),
            monitoring: "basic".to_string(),
        }
    }
}

impl Default for PathsSettings {
    fn default() -> Self {
        Self {
            state_dir: "~/.infragenius".to_string(),
            log_dir: "~/.infragenius/logs".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from file or use defaults
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        if let Some(settings_path) = path {
            Self::load_from_file(&settings_path)
        } else {
            Self::load_default()
        }
    }

    /// Load settings from specific file
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SetupError::ConfigError(format!("Failed to read settings: {}", e)))?;

        let settings: Settings = toml::from_str(&contents)
            .map_err(|e| SetupError::ConfigError(format!("Failed to parse settings: {}", e)))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from the standard location or use built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Some(home) = dirs::home_dir() {
            let settings_path = home.join(".infragenius").join("config.toml");
            if settings_path.exists() {
                return Self::load_from_file(&settings_path);
            }
        }

        Ok(Settings::default())
    }

    /// Validate settings values
    pub fn validate(&self) -> Result<()> {
        if self.ollama.port == 0 {
            return Err(SetupError::ConfigError(
                "ollama.port must be greater than 0".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(SetupError::ConfigError(
                "server.port must be greater than 0".to_string(),
            ));
        }

        if self.server.workers == 0 {
            return Err(SetupError::ConfigError(
                "server.workers must be greater than 0".to_string(),
            ));
        }

        match self.deploy.monitoring.as_str() {
            "basic" | "premium" | "enterprise" => {}
            _ => {
                return Err(SetupError::ConfigError(format!(
                    "Invalid monitoring tier: {}",
                    self.deploy.monitoring
                )))
            }
        }

        if self.deploy.domain.is_empty() || self.deploy.domain.contains(char::is_whitespace) {
            return Err(SetupError::ConfigError(format!(
                "Invalid deploy domain: {:?}",
                self.deploy.domain
            )));
        }

        Ok(())
    }

    /// Save settings to file
    pub fn save(&self, path: &PathBuf) -> Result<()> {
        let contents = toml::to_string_pretty(self)
            .map_err(|e| SetupError::ConfigError(format!("Failed to serialize settings: {}", e)))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                SetupError::ConfigError(format!("Failed to create settings dir: {}", e))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| SetupError::ConfigError(format!("Failed to write settings: {}", e)))?;

        Ok(())
    }

    /// Get Ollama base URL
    pub fn ollama_url(&self) -> String {
        format!("http://{}:{}", self.ollama.host, self.ollama.port)
    }

    /// Base URL the app server answers on from this host
    pub fn server_url(&self) -> String {
        // The bind host is often 0.0.0.0; probe via loopback
        let host = if self.server.host == "0.0.0.0" {
            "localhost"
        } else {
            self.server.host.as_str()
        };
        format!("http://{}:{}", host, self.server.port)
    }

    /// Expand tilde in paths
    pub fn expand_path(path: &str) -> PathBuf {
        if path.starts_with("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(&path[2..]);
            }
        }
        PathBuf::from(path)
    }

    /// Get state directory path
    pub fn state_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.state_dir)
    }

    /// Get log directory path
    pub fn log_dir(&self) -> PathBuf {
        Self::expand_path(&self.paths.log_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.ollama.host, "127.0.0.1");
        assert_eq!(settings.ollama.port, 11434);
        assert_eq!(settings.ollama.default_model, "gpt-oss:latest");
        assert_eq!(settings.server.port, 8000);
    }

    #[test]
    fn test_settings_validation_success() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_validation_zero_port() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_validation_zero_workers() {
        let mut settings = Settings::default();
        settings.server.workers = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_settings_validation_monitoring_tier() {
        let mut settings = Settings::default();
        settings.deploy.monitoring = "platinum".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_ollama_url() {
        let settings = Settings::default();
        assert_eq!(settings.ollama_url(), "http://127.0.0.1:11434");
    }

    #[test]
    fn test_server_url_uses_loopback_for_wildcard_bind() {
        let settings = Settings::default();
        assert_eq!(settings.server_url(), "http://localhost:8000");
    }

    #[test]
    fn test_expand_path_with_tilde() {
        let expanded = Settings::expand_path("~/.infragenius");
        assert!(!expanded.to_string_lossy().contains('~'));
    }

    #[test]
    fn test_expand_path_without_tilde() {
        let path = "/absolute/path";
        let expanded = Settings::expand_path(path);
        assert_eq!(expanded.to_string_lossy(), path);
    }

    #[test]
    fn test_settings_validation_blank_domain() {
        let mut settings = Settings::default();
        settings.deploy.domain = "bad domain".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_other_sections_default() {
        let parsed: Settings = toml::from_str("[deploy]\ndomain = \"infra.test\"\n").unwrap();

        assert_eq!(parsed.deploy.domain, "infra.test");
        assert_eq!(parsed.deploy.monitoring, "basic");
        assert_eq!(parsed.ollama.port, 11434);
        assert_eq!(parsed.server.port, 8000);
    }

    #[test]
    fn test_settings_toml_round_trip() {
        let settings = Settings::default();
        let toml_text = toml::to_string_pretty(&settings).unwrap();
        let parsed: Settings = toml::from_str(&toml_text).unwrap();
        assert_eq!(parsed.ollama.default_model, settings.ollama.default_model);
        assert_eq!(parsed.deploy.domain, settings.deploy.domain);
    }
}
