//! MCP app server process management
//!
//! Setup ends by starting `mcp_server/server.py` with the venv
//! interpreter, detached, with output captured to the project log dir
//! and the PID recorded. Readiness is a `/health` probe.

use crate::errors::{Result, SetupError};
use crate::probe::ReadinessProbe;
use crate::project::ProjectRoot;
use std::fs::File;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;

/// Deadline for the app server to answer `/health` after spawn
const READY_DEADLINE: Duration = Duration::from_secs(45);

/// Spawner for the Python MCP app server
pub struct AppServer<'a> {
    root: &'a ProjectRoot,
}

impl<'a> AppServer<'a> {
    pub fn new(root: &'a ProjectRoot) -> Self {
        Self { root }
    }

    /// PID file for a server this toolkit spawned
    pub fn pid_file(&self) -> PathBuf {
        self.root.logs_dir().join("server.pid")
    }

    /// Log file capturing the server's output
    pub fn log_file(&self) -> PathBuf {
        self.root.logs_dir().join("server.log")
    }

    /// Spawn the server detached and wait for `/health`.
    ///
    /// Returns the elapsed readiness time. A probe timeout bubbles up
    /// as `Timeout` so the caller can point at the log file.
    pub async fn start(&self, health_url: &str) -> Result<Duration> {
        let entry = self.root.server_entry();
        if !entry.is_file() {
            return Err(SetupError::Precondition(format!(
                "server entry point not found: {}",
                entry.display()
            )));
        }

        self.spawn_detached(&entry)?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()?;

        let probe = ReadinessProbe::new(READY_DEADLINE);
        probe.wait_for_http(&client, health_url, "MCP app server").await
    }

    fn spawn_detached(&self, entry: &std::path::Path) -> Result<()> {
        std::fs::create_dir_all(self.root.logs_dir())?;

        let log = File::create(self.log_file())?;
        let log_err = log.try_clone()?;

        let mut cmd = Command::new(self.root.venv_python());
        cmd.arg(entry)
            .current_dir(self.root.path())
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            unsafe {
                cmd.pre_exec(|| {
                    libc::setsid();
                    Ok(())
                });
            }
        }

        let child = cmd.spawn().map_err(|e| SetupError::CommandFailed {
            command: format!("python {}", entry.display()),
            detail: e.to_string(),
        })?;

        std::fs::write(self.pid_file(), child.id().to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn test_root(dir: &TempDir) -> ProjectRoot {
        std::fs::write(dir.path().join("README.md"), "# test\n").unwrap();
        std::fs::create_dir(dir.path().join("mcp_server")).unwrap();
        ProjectRoot::discover(dir.path()).unwrap()
    }

    #[test]
    fn test_state_paths_live_in_logs_dir() {
        let dir = TempDir::new().unwrap();
        let root = test_root(&dir);
        let server = AppServer::new(&root);

        assert!(server.pid_file().starts_with(root.logs_dir()));
        assert!(server.log_file().ends_with("server.log"));
    }

    #[tokio::test]
    async fn test_start_requires_entry_point() {
        let dir = TempDir::new().unwrap();
        let root = test_root(&dir);
        let server = AppServer::new(&root);

        let err = server.start("http://localhost:8000/health").await.unwrap_err();
        assert!(matches!(err, SetupError::Precondition(_)));
    }
}
