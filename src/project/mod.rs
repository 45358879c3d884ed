//! Project root detection and artifact paths
//!
//! Every command that touches a checkout goes through `ProjectRoot`:
//! it gates on the two markers that identify an InfraGenius checkout
//! (`README.md` and `mcp_server/`) and owns the layout of everything
//! the toolkit reads or writes inside the project.

use crate::errors::{Result, SetupError};
use std::path::{Path, PathBuf};

/// A validated InfraGenius project root
#[derive(Debug, Clone)]
pub struct ProjectRoot {
    root: PathBuf,
}

impl ProjectRoot {
    /// Validate `dir` as an InfraGenius checkout.
    ///
    /// Fails fast when the directory is missing either marker so setup
    /// and deploy exit before writing anything.
    pub fn discover(dir: &Path) -> Result<Self> {
        let root = dir
            .canonicalize()
            .map_err(|_| SetupError::ProjectRoot {
                path: dir.display().to_string(),
                missing: "the directory itself".to_string(),
            })?;

        if !root.join("README.md").is_file() {
            return Err(SetupError::ProjectRoot {
                path: root.display().to_string(),
                missing: "README.md".to_string(),
            });
        }

        if !root.join("mcp_server").is_dir() {
            return Err(SetupError::ProjectRoot {
                path: root.display().to_string(),
                missing: "mcp_server/".to_string(),
            });
        }

        Ok(Self { root })
    }

    /// Project root path
    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Generated local configuration: `config.json`
    pub fn config_json(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// Generated environment file: `.env`
    pub fn env_file(&self) -> PathBuf {
        self.root.join(".env")
    }

    /// Cursor editor integration manifest: `.cursor/mcp.json`
    pub fn cursor_manifest(&self) -> PathBuf {
        self.root.join(".cursor").join("mcp.json")
    }

    /// Python virtual environment directory
    pub fn venv_dir(&self) -> PathBuf {
        self.root.join("venv")
    }

    /// Python interpreter inside the venv
    pub fn venv_python(&self) -> PathBuf {
        if cfg!(windows) {
            self.venv_dir().join("Scripts").join("python.exe")
        } else {
            self.venv_dir().join("bin").join("python")
        }
    }

    /// pip inside the venv
    pub fn venv_pip(&self) -> PathBuf {
        if cfg!(windows) {
            self.venv_dir().join("Scripts").join("pip.exe")
        } else {
            self.venv_dir().join("bin").join("pip")
        }
    }

    /// Optional requirements file consumed by venv provisioning
    pub fn requirements(&self) -> PathBuf {
        self.root.join("requirements.txt")
    }

    /// MCP app server entry point
    pub fn server_entry(&self) -> PathBuf {
        self.root.join("mcp_server").join("server.py")
    }

    /// Cursor stdio adapter entry point
    pub fn cursor_entry(&self) -> PathBuf {
        self.root.join("mcp_server").join("cursor_integration.py")
    }

    /// Log directory for processes the toolkit spawns in this project
    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Professional Compose manifest: `docker-compose.prod.yml`
    pub fn compose_file(&self) -> PathBuf {
        self.root.join("docker-compose.prod.yml")
    }

    /// Monitoring configuration directory
    pub fn monitoring_dir(&self) -> PathBuf {
        self.root.join("monitoring")
    }

    /// Prometheus scrape configuration
    pub fn prometheus_config(&self) -> PathBuf {
        self.monitoring_dir().join("prometheus.yml")
    }

    /// Grafana dashboard document
    pub fn grafana_dashboard(&self) -> PathBuf {
        self.monitoring_dir().join("grafana-dashboard.json")
    }

    /// Self-signed TLS material directory
    pub fn ssl_dir(&self) -> PathBuf {
        self.root.join("ssl")
    }

    /// Kubernetes manifest directory
    pub fn k8s_dir(&self) -> PathBuf {
        self.root.join("k8s")
    }

    /// Professional license marker: `.license`
    pub fn license_marker(&self) -> PathBuf {
        self.root.join(".license")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_project(dir: &TempDir) {
        std::fs::write(dir.path().join("README.md"), "# InfraGenius\n").unwrap();
        std::fs::create_dir(dir.path().join("mcp_server")).unwrap();
    }

    #[test]
    fn test_discover_valid_project() {
        let dir = TempDir::new().unwrap();
        make_project(&dir);

        let root = ProjectRoot::discover(dir.path()).unwrap();
        assert!(root.path().join("mcp_server").is_dir());
    }

    #[test]
    fn test_discover_rejects_empty_dir() {
        let dir = TempDir::new().unwrap();

        let err = ProjectRoot::discover(dir.path()).unwrap_err();
        assert!(err.to_string().contains("README.md"));
    }

    #[test]
    fn test_discover_rejects_missing_mcp_server() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("README.md"), "# readme\n").unwrap();

        let err = ProjectRoot::discover(dir.path()).unwrap_err();
        assert!(err.to_string().contains("mcp_server"));
    }

    #[test]
    fn test_discover_rejects_missing_dir() {
        let err = ProjectRoot::discover(Path::new("/nonexistent/infragenius")).unwrap_err();
        assert!(matches!(err, SetupError::ProjectRoot { .. }));
    }

    #[test]
    fn test_artifact_paths_live_under_root() {
        let dir = TempDir::new().unwrap();
        make_project(&dir);

        let root = ProjectRoot::discover(dir.path()).unwrap();
        assert!(root.config_json().starts_with(root.path()));
        assert!(root.compose_file().ends_with("docker-compose.prod.yml"));
        assert!(root.cursor_manifest().ends_with(".cursor/mcp.json"));
        assert!(root.prometheus_config().ends_with("monitoring/prometheus.yml"));
    }

    #[test]
    #[cfg(unix)]
    fn test_venv_python_path() {
        let dir = TempDir::new().unwrap();
        make_project(&dir);

        let root = ProjectRoot::discover(dir.path()).unwrap();
        assert!(root.venv_python().ends_with("venv/bin/python"));
        assert!(root.venv_pip().ends_with("venv/bin/pip"));
    }
}
