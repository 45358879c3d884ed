//! HTTP client for the Ollama API
//!
//! Covers the endpoints the toolkit needs: `/api/tags` for liveness and
//! model listing, `/api/version`, and `/api/pull` with streaming NDJSON
//! progress rendered through an indicatif bar.

use crate::errors::{Result, SetupError};
use futures_util::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

/// Model information from the Ollama tags endpoint
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelInfo {
    pub name: String,
    pub size: u64,
    pub digest: String,
    #[serde(default)]
    pub modified_at: String,
}

#[derive(Debug, Deserialize)]
struct TagsResponse {
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct VersionResponse {
    version: String,
}

/// One line of the `/api/pull` NDJSON stream
#[derive(Debug, Deserialize)]
struct PullProgress {
    status: String,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    completed: Option<u64>,
}

/// Client for a local Ollama daemon
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    /// Create a client for `base_url`, e.g. `http://127.0.0.1:11434`.
    ///
    /// The timeout covers everything except model pulls, which stream
    /// for as long as the download takes.
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Base URL this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Underlying reqwest client, shared with readiness probes
    pub fn http(&self) -> &Client {
        &self.client
    }

    /// Check if the Ollama API is reachable
    pub async fn is_running(&self) -> bool {
        let url = format!("{}/api/tags", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Daemon version string from `/api/version`
    pub async fn version(&self) -> Result<String> {
        let url = format!("{}/api/version", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SetupError::OllamaApi(format!("Failed to query version: {}", e)))?;

        if !response.status().is_success() {
            return Err(SetupError::OllamaApi(format!(
                "API returned status: {}",
                response.status()
            )));
        }

        let version: VersionResponse = response
            .json()
            .await
            .map_err(|e| SetupError::OllamaApi(format!("Failed to parse response: {}", e)))?;

        Ok(version.version)
    }

    /// List models installed on the daemon
    pub async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SetupError::OllamaApi(format!("Failed to query models: {}", e)))?;

        if !response.status().is_success() {
            return Err(SetupError::OllamaApi(format!(
                "API returned status: {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| SetupError::OllamaApi(format!("Failed to parse response: {}", e)))?;

        Ok(tags.models)
    }

    /// Check if a specific model tag is installed
    pub async fn has_model(&self, tag: &str) -> Result<bool> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|m| m.name == tag))
    }

    /// Pull a model, streaming NDJSON progress from `/api/pull`.
    ///
    /// Renders a download bar when `show_progress` is set; quiet mode
    /// consumes the stream silently.
    pub async fn pull_model(&self, tag: &str, show_progress: bool) -> Result<()> {
        let url = format!("{}/api/pull", self.base_url);

        // Replace the client's default timeout with a pull-sized bound;
        // large models legitimately take many minutes
        let response = self
            .client
            .post(&url)
            .timeout(Duration::from_secs(60 * 60))
            .json(&json!({ "name": tag }))
            .send()
            .await
            .map_err(|e| SetupError::OllamaApi(format!("Failed to start pull: {}", e)))?;

        if !response.status().is_success() {
            return Err(SetupError::OllamaApi(format!(
                "Pull of '{}' failed with status: {}",
                tag,
                response.status()
            )));
        }

        let bar = if show_progress {
            let pb = ProgressBar::new(0);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.cyan} {msg} [{bar:30.green/dim}] {bytes}/{total_bytes}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("=> "),
            );
            pb.set_message(format!("Pulling {}", tag));
            Some(pb)
        } else {
            None
        };

        let mut stream = response.bytes_stream();
        let mut buffer = String::new();
        let mut succeeded = false;

        while let Some(chunk) = stream.next().await {
            let bytes = chunk
                .map_err(|e| SetupError::OllamaApi(format!("Pull stream error: {}", e)))?;
            buffer.push_str(&String::from_utf8_lossy(&bytes));

            // The stream is line-delimited JSON; keep the trailing
            // partial line in the buffer for the next chunk
            while let Some(newline) = buffer.find('\n') {
                let line = buffer[..newline].trim().to_string();
                buffer.drain(..=newline);

                if line.is_empty() {
                    continue;
                }

                if let Ok(progress) = serde_json::from_str::<PullProgress>(&line) {
                    if let Some(ref pb) = bar {
                        if let (Some(total), Some(completed)) =
                            (progress.total, progress.completed)
                        {
                            pb.set_length(total);
                            pb.set_position(completed);
                        }
                        pb.set_message(format!("Pulling {}: {}", tag, progress.status));
                    }

                    if progress.status == "success" {
                        succeeded = true;
                    }
                }
            }
        }

        if let Some(pb) = bar {
            pb.finish_and_clear();
        }

        if succeeded {
            Ok(())
        } else {
            Err(SetupError::OllamaApi(format!(
                "Pull of '{}' ended without a success status",
                tag
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OllamaClient::new("http://127.0.0.1:11434", 5);
        assert_eq!(client.base_url(), "http://127.0.0.1:11434");
    }

    #[test]
    fn test_client_strips_trailing_slash() {
        let client = OllamaClient::new("http://localhost:11434/", 5);
        assert_eq!(client.base_url(), "http://localhost:11434");
    }

    #[test]
    fn test_pull_progress_parse() {
        let line = r#"{"status":"pulling manifest"}"#;
        let progress: PullProgress = serde_json::from_str(line).unwrap();
        assert_eq!(progress.status, "pulling manifest");
        assert!(progress.total.is_none());

        let line = r#"{"status":"downloading","total":1000,"completed":250}"#;
        let progress: PullProgress = serde_json::from_str(line).unwrap();
        assert_eq!(progress.total, Some(1000));
        assert_eq!(progress.completed, Some(250));
    }

    #[test]
    fn test_tags_response_parse() {
        let body = r#"{"models":[{"name":"gpt-oss:latest","size":13000000000,"digest":"abc123"}]}"#;
        let tags: TagsResponse = serde_json::from_str(body).unwrap();
        assert_eq!(tags.models.len(), 1);
        assert_eq!(tags.models[0].name, "gpt-oss:latest");
        assert_eq!(tags.models[0].modified_at, "");
    }

    #[tokio::test]
    #[ignore] // Requires Ollama running
    async fn test_is_running_integration() {
        let client = OllamaClient::new("http://127.0.0.1:11434", 5);
        assert!(client.is_running().await);
    }
}
