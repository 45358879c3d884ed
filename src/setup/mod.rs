//! Quick local setup pipeline
//!
//! Sequential bring-up of a development machine: preflight gates,
//! Ollama daemon and model, Python venv, generated config files, health
//! checks, and finally the MCP app server itself.

pub mod preflight;

pub use preflight::{Gate, GateStatus, Preflight};

use crate::artifacts::{write_if_absent, write_replacing, CursorManifest, EnvFile, LocalConfig, WriteOutcome};
use crate::cli::{Settings, Verbosity};
use crate::errors::{Result, SetupError};
use crate::ollama::{OllamaClient, OllamaDaemon};
use crate::project::ProjectRoot;
use crate::server::AppServer;
use colored::Colorize;
use std::path::Path;

/// Quick-local-setup runner
pub struct Setup<'a> {
    root: &'a ProjectRoot,
    settings: &'a Settings,
    client: &'a OllamaClient,
    model: String,
    verbosity: Verbosity,
}

impl<'a> Setup<'a> {
    pub fn new(
        root: &'a ProjectRoot,
        settings: &'a Settings,
        client: &'a OllamaClient,
        model: &str,
        verbosity: Verbosity,
    ) -> Self {
        Self {
            root,
            settings,
            client,
            model: model.to_string(),
            verbosity,
        }
    }

    /// Run the full setup sequence
    pub async fn run(&self, skip_server: bool) -> Result<()> {
        self.banner();

        // 1. Host gates; a Fail aborts before anything is written
        self.step("Checking host prerequisites");
        let preflight = Preflight::run(self.root.path()).await?;
        self.print_gates(&preflight.gates);
        if let Some(gate) = preflight.fatal() {
            return Err(SetupError::Precondition(format!(
                "{}: {}",
                gate.name, gate.message
            )));
        }
        let python = preflight
            .python
            .ok_or_else(|| SetupError::PythonRuntime("python3 not available".to_string()))?;

        // 2. Ollama daemon and model
        self.step("Checking Ollama");
        let daemon = OllamaDaemon::new(self.settings.state_dir());
        if daemon.ensure_running(self.client).await? {
            self.detail("Started ollama serve (log in state dir)");
        } else {
            self.detail("Ollama already running");
        }

        if self.client.has_model(&self.model).await? {
            self.detail(&format!("Model {} already installed", self.model));
        } else {
            self.step(&format!("Pulling model {}", self.model));
            self.client
                .pull_model(&self.model, self.verbosity.show_progress())
                .await?;
        }

        // 3. Python environment
        self.step("Preparing Python environment");
        if python.create_venv(self.root).await? {
            self.detail("Created venv/");
        } else {
            self.detail("venv/ already present");
        }
        python.install_requirements(self.root).await?;

        // 4. Generated files
        self.step("Writing configuration");
        let ollama_url = self.client.base_url();

        let config = LocalConfig::new(self.settings, ollama_url, &self.model);
        let outcome = write_if_absent(&self.root.config_json(), &config.to_json()?)?;
        self.report_write("config.json", &self.root.config_json(), outcome);

        let env = EnvFile::new(self.settings, ollama_url, &self.model);
        let outcome = write_if_absent(&self.root.env_file(), &env.render())?;
        self.report_write(".env", &self.root.env_file(), outcome);

        let manifest = CursorManifest::new(self.root, ollama_url, &self.model);
        write_replacing(&self.root.cursor_manifest(), &manifest.to_json()?)?;
        self.detail(".cursor/mcp.json regenerated");

        // 5. Health checks
        self.step("Running health checks");
        match python.verify_import(self.root, "mcp").await {
            Ok(()) => self.detail("venv imports mcp"),
            Err(_) => self.warn("mcp does not import inside the venv, server may not start"),
        }

        match self.client.version().await {
            Ok(version) => self.detail(&format!("Ollama v{} answering", version)),
            Err(e) => self.warn(&format!("Ollama version check failed: {}", e)),
        }

        // 6. App server
        if skip_server {
            self.detail("Skipping app server start (--skip-server)");
        } else {
            self.step("Starting MCP app server");
            let server = AppServer::new(self.root);
            let health_url = format!("{}/health", self.settings.server_url());

            match server.start(&health_url).await {
                Ok(elapsed) => {
                    self.detail(&format!("Server healthy after {:.1}s", elapsed.as_secs_f64()))
                }
                Err(SetupError::Timeout { .. }) => {
                    self.warn(&format!(
                        "Server not answering /health yet, check {}",
                        server.log_file().display()
                    ));
                }
                Err(e) => return Err(e),
            }
        }

        self.print_summary(skip_server);
        Ok(())
    }

    fn banner(&self) {
        if self.verbosity == Verbosity::Quiet {
            return;
        }
        println!();
        println!("{}", "  InfraGenius local setup".bold());
        println!("  Model: {}  Ollama: {}", self.model, self.client.base_url());
        println!();
    }

    fn print_gates(&self, gates: &[Gate]) {
        if self.verbosity == Verbosity::Quiet {
            return;
        }

        for gate in gates {
            let symbol = match gate.status {
                GateStatus::Pass => "✓".green(),
                GateStatus::Warn => "⚠".yellow(),
                GateStatus::Fail => "✗".red(),
            };
            println!("  {} {:<18} {}", symbol, format!("{}:", gate.name), gate.message);
        }
    }

    fn print_summary(&self, skip_server: bool) {
        if self.verbosity == Verbosity::Quiet {
            return;
        }

        let base = self.settings.server_url();
        println!();
        println!("{}", "  Setup complete".green().bold());
        println!();
        println!("  Endpoints:");
        println!("    Health:   {}/health", base);
        println!("    Analyze:  {}/analyze", base);
        println!("    Docs:     {}/docs", base);
        println!();
        if skip_server {
            println!("  Start the server with:");
            println!("    {} mcp_server/server.py", self.root.venv_python().display());
            println!();
        }
        println!("  Cursor integration: .cursor/mcp.json (restart Cursor to pick it up)");
        println!();
    }

    fn report_write(&self, label: &str, path: &Path, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Created => self.detail(&format!("{} written", label)),
            WriteOutcome::SkippedExisting => self.detail(&format!(
                "{} already exists, keeping it ({})",
                label,
                path.display()
            )),
        }
    }

    fn step(&self, msg: &str) {
        if self.verbosity != Verbosity::Quiet {
            println!("{} {}", "==>".cyan().bold(), msg);
        }
    }

    fn detail(&self, msg: &str) {
        if self.verbosity != Verbosity::Quiet {
            println!("    {}", msg);
        }
    }

    fn warn(&self, msg: &str) {
        eprintln!("{} {}", "warning:".yellow().bold(), msg);
    }
}
