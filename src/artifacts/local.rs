//! Local development artifacts: config.json, .env, .cursor/mcp.json

use crate::cli::Settings;
use crate::errors::Result;
use crate::project::ProjectRoot;
use chrono::{DateTime, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Local-mode `config.json` consumed by the MCP server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalConfig {
    pub server: ServerBlock,
    pub ollama: OllamaBlock,
    pub cache: CacheBlock,
    pub analysis: AnalysisBlock,
    pub deployment: DeploymentBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerBlock {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaBlock {
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheBlock {
    pub enabled: bool,
    pub max_entries: usize,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisBlock {
    pub domains: Vec<String>,
    pub default_environment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentBlock {
    pub mode: String,
    pub generated_at: DateTime<Utc>,
}

impl LocalConfig {
    /// Build the local configuration document
    pub fn new(settings: &Settings, ollama_url: &str, model: &str) -> Self {
        Self {
            server: ServerBlock {
                host: settings.server.host.clone(),
                port: settings.server.port,
                workers: settings.server.workers,
                log_level: "info".to_string(),
            },
            ollama: OllamaBlock {
                base_url: ollama_url.to_string(),
                model: model.to_string(),
                timeout_seconds: settings.ollama.request_timeout_secs,
            },
            cache: CacheBlock {
                enabled: true,
                max_entries: 1000,
                ttl_seconds: 3600,
            },
            analysis: AnalysisBlock {
                domains: vec![
                    "devops".to_string(),
                    "sre".to_string(),
                    "cloud".to_string(),
                    "platform".to_string(),
                ],
                default_environment: "production".to_string(),
            },
            deployment: DeploymentBlock {
                mode: "local".to_string(),
                generated_at: Utc::now(),
            },
        }
    }

    /// Serialize to pretty JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        Ok(format!("{}\n", serde_json::to_string_pretty(self)?))
    }
}

/// `.env` file written next to config.json.
///
/// Not JSON; rendered as KEY=VALUE lines, but built from typed fields
/// so the key set is fixed at compile time.
#[derive(Debug, Clone)]
pub struct EnvFile {
    pub environment: String,
    pub ollama_base_url: String,
    pub ollama_model: String,
    pub server_host: String,
    pub server_port: u16,
    pub log_level: String,
    pub jwt_secret: String,
}

impl EnvFile {
    /// Build a fresh .env with a newly generated JWT secret
    pub fn new(settings: &Settings, ollama_url: &str, model: &str) -> Self {
        Self {
            environment: "development".to_string(),
            ollama_base_url: ollama_url.to_string(),
            ollama_model: model.to_string(),
            server_host: settings.server.host.clone(),
            server_port: settings.server.port,
            log_level: "INFO".to_string(),
            jwt_secret: generate_secret(48),
        }
    }

    /// Render as KEY=VALUE lines
    pub fn render(&self) -> String {
        format!(
            "INFRAGENIUS_ENV={}\n\
             OLLAMA_BASE_URL={}\n\
             OLLAMA_MODEL={}\n\
             MCP_SERVER_HOST={}\n\
             MCP_SERVER_PORT={}\n\
             LOG_LEVEL={}\n\
             JWT_SECRET={}\n",
            self.environment,
            self.ollama_base_url,
            self.ollama_model,
            self.server_host,
            self.server_port,
            self.log_level,
            self.jwt_secret,
        )
    }
}

/// Generate a random alphanumeric secret
fn generate_secret(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Cursor editor integration manifest: `.cursor/mcp.json`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorManifest {
    #[serde(rename = "mcpServers")]
    pub mcp_servers: BTreeMap<String, McpServerEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpServerEntry {
    pub command: String,
    pub args: Vec<String>,
    pub env: BTreeMap<String, String>,
}

impl CursorManifest {
    /// Build the manifest pointing Cursor at the venv interpreter and
    /// the stdio adapter script.
    pub fn new(root: &ProjectRoot, ollama_url: &str, model: &str) -> Self {
        let mut env = BTreeMap::new();
        env.insert("OLLAMA_BASE_URL".to_string(), ollama_url.to_string());
        env.insert("OLLAMA_MODEL".to_string(), model.to_string());

        let entry = McpServerEntry {
            command: root.venv_python().display().to_string(),
            args: vec![root.cursor_entry().display().to_string()],
            env,
        };

        let mut mcp_servers = BTreeMap::new();
        mcp_servers.insert("infragenius".to_string(), entry);

        Self { mcp_servers }
    }

    /// Serialize to pretty JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        Ok(format!("{}\n", serde_json::to_string_pretty(self)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_settings() -> Settings {
        Settings::default()
    }

    fn test_root(dir: &TempDir) -> ProjectRoot {
        std::fs::write(dir.path().join("README.md"), "# test\n").unwrap();
        std::fs::create_dir(dir.path().join("mcp_server")).unwrap();
        ProjectRoot::discover(dir.path()).unwrap()
    }

    #[test]
    fn test_local_config_structure() {
        let config = LocalConfig::new(&test_settings(), "http://127.0.0.1:11434", "gpt-oss:latest");

        assert_eq!(config.server.port, 8000);
        assert_eq!(config.ollama.model, "gpt-oss:latest");
        assert_eq!(config.cache.max_entries, 1000);
        assert_eq!(config.cache.ttl_seconds, 3600);
        assert_eq!(config.deployment.mode, "local");
    }

    #[test]
    fn test_local_config_json_is_valid() {
        let config = LocalConfig::new(&test_settings(), "http://127.0.0.1:11434", "gpt-oss:latest");
        let json = config.to_json().unwrap();

        let parsed: LocalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.analysis.domains.len(), 4);
        assert!(json.contains("\"base_url\": \"http://127.0.0.1:11434\""));
    }

    #[test]
    fn test_env_file_render() {
        let env = EnvFile::new(&test_settings(), "http://127.0.0.1:11434", "gpt-oss:latest");
        let rendered = env.render();

        assert!(rendered.contains("OLLAMA_BASE_URL=http://127.0.0.1:11434"));
        assert!(rendered.contains("OLLAMA_MODEL=gpt-oss:latest"));
        assert!(rendered.contains("MCP_SERVER_PORT=8000"));
        assert!(rendered.contains("JWT_SECRET="));
    }

    #[test]
    fn test_env_secret_is_fresh_per_file() {
        let settings = test_settings();
        let a = EnvFile::new(&settings, "http://127.0.0.1:11434", "gpt-oss:latest");
        let b = EnvFile::new(&settings, "http://127.0.0.1:11434", "gpt-oss:latest");

        assert_eq!(a.jwt_secret.len(), 48);
        assert!(a.jwt_secret.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(a.jwt_secret, b.jwt_secret);
    }

    #[test]
    fn test_cursor_manifest_shape() {
        let dir = TempDir::new().unwrap();
        let root = test_root(&dir);

        let manifest = CursorManifest::new(&root, "http://127.0.0.1:11434", "gpt-oss:latest");
        let json = manifest.to_json().unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let entry = &value["mcpServers"]["infragenius"];
        assert!(entry["command"].as_str().unwrap().ends_with("python"));
        assert_eq!(entry["env"]["OLLAMA_MODEL"], "gpt-oss:latest");
        assert!(entry["args"][0]
            .as_str()
            .unwrap()
            .ends_with("cursor_integration.py"));
    }
}
