//! Ollama daemon bring-up
//!
//! When the API is not reachable, setup locates the `ollama` binary,
//! spawns `ollama serve` detached from the toolkit process, records the
//! PID, and waits for `/api/tags` to answer.

use crate::errors::{Result, SetupError};
use crate::ollama::OllamaClient;
use crate::probe::ReadinessProbe;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

/// Deadline for the daemon to answer `/api/tags` after spawn
const READY_DEADLINE: Duration = Duration::from_secs(30);

/// Manages the lifecycle of a locally spawned Ollama daemon
pub struct OllamaDaemon {
    /// Directory holding the PID file and daemon log
    state_dir: PathBuf,
}

impl OllamaDaemon {
    /// Create a daemon manager writing state under `state_dir`
    pub fn new(state_dir: PathBuf) -> Self {
        Self { state_dir }
    }

    /// Locate the `ollama` binary on PATH
    pub fn find_binary() -> Option<PathBuf> {
        let path_var = std::env::var_os("PATH")?;

        std::env::split_paths(&path_var)
            .map(|dir| dir.join("ollama"))
            .find(|candidate| candidate.is_file())
    }

    /// PID file for a daemon this toolkit spawned
    pub fn pid_file(&self) -> PathBuf {
        self.state_dir.join("ollama.pid")
    }

    /// Log file capturing the spawned daemon's output
    pub fn log_file(&self) -> PathBuf {
        self.state_dir.join("ollama.log")
    }

    /// Ensure the daemon is reachable, spawning `ollama serve` if not.
    ///
    /// Returns true when this call started the daemon, false when it
    /// was already running. A missing binary is a hard precondition
    /// failure with install instructions on stderr.
    pub async fn ensure_running(&self, client: &OllamaClient) -> Result<bool> {
        if client.is_running().await {
            return Ok(false);
        }

        let binary = Self::find_binary().ok_or_else(|| {
            Self::show_install_instructions();
            SetupError::Precondition("ollama binary not found on PATH".to_string())
        })?;

        self.spawn_serve(&binary)?;

        let probe = ReadinessProbe::new(READY_DEADLINE);
        let url = format!("{}/api/tags", client.base_url());
        probe
            .wait_for_http(client.http(), &url, "Ollama daemon")
            .await?;

        Ok(true)
    }

    /// Spawn `ollama serve` detached, logging to the state dir
    fn spawn_serve(&self, binary: &Path) -> Result<()> {
        std::fs::create_dir_all(&self.state_dir)?;

        let log = File::create(self.log_file())?;
        let log_err = log.try_clone()?;

        let mut cmd = Command::new(binary);
        cmd.arg("serve")
            .stdin(Stdio::null())
            .stdout(Stdio::from(log))
            .stderr(Stdio::from(log_err));

        // Detach into its own session so the daemon outlives the toolkit
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
            command: "ollama serve".to_string(),
            detail: e.to_string(),
        })?;

        std::fs::write(self.pid_file(), child.id().to_string())?;
        Ok(())
    }

    /// Install instructions printed when the binary is missing
    pub fn show_install_instructions() {
        eprintln!("\nOllama is required to run the InfraGenius MCP server.");
        eprintln!("\nInstallation:");
        eprintln!("   Linux:   curl -fsSL https://ollama.com/install.sh | sh");
        eprintln!("   macOS:   brew install ollama");
        eprintln!("\nThen start it with:");
        eprintln!("   ollama serve");
        eprintln!("\nMore info: https://ollama.com/download\n");
    }
}
