//! Error types for the InfraGenius setup and deployment toolkit.
//!
//! Every fatal condition surfaces as a `SetupError` so the binary can
//! print one red line and exit with code 1.

use thiserror::Error;

/// Main error type for setup and deployment operations
#[derive(Error, Debug)]
pub enum SetupError {
    /// Project root detection errors
    #[error("Not an InfraGenius project root: {path} is missing {missing}")]
    ProjectRoot { path: String, missing: String },

    /// Host precondition errors (disk, runtime, binaries)
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// Python runtime errors
    #[error("Python runtime error: {0}")]
    PythonRuntime(String),

    /// Ollama API errors
    #[error("Ollama API error: {0}")]
    OllamaApi(String),

    /// License key validation errors
    #[error("Invalid license key: {0}")]
    License(String),

    /// Deployment pipeline errors
    #[error("Deployment error: {0}")]
    Deploy(String),

    /// External command failures
    #[error("Command `{command}` failed: {detail}")]
    CommandFailed { command: String, detail: String },

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// JSON serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// YAML serialization errors
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Readiness probe timeouts
    #[error("Timed out waiting for {what} after {waited_secs}s")]
    Timeout { what: String, waited_secs: u64 },

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for setup operations
pub type Result<T> = std::result::Result<T, SetupError>;

/// Convert anyhow errors to SetupError
impl From<anyhow::Error> for SetupError {
    fn from(err: anyhow::Error) -> Self {
        SetupError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SetupError::Timeout {
            what: "Ollama API".to_string(),
            waited_secs: 30,
        };
        assert!(err.to_string().contains("Ollama API"));
        assert!(err.to_string().contains("30"));
    }

    #[test]
    fn test_project_root_error() {
        let err = SetupError::ProjectRoot {
            path: "/tmp/somewhere".to_string(),
            missing: "mcp_server/".to_string(),
        };
        assert!(err.to_string().contains("/tmp/somewhere"));
        assert!(err.to_string().contains("mcp_server/"));
    }

    #[test]
    fn test_command_failed_display() {
        let err = SetupError::CommandFailed {
            command: "docker compose up -d".to_string(),
            detail: "exit status 1".to_string(),
        };
        assert!(err.to_string().contains("docker compose"));
    }
}
