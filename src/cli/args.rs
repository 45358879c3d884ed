//! Command-line argument parsing for the InfraGenius toolkit
//!
//! Provides clap-based CLI with subcommands and verbosity control.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// InfraGenius - local setup and professional deployment for the MCP server
#[derive(Parser, Debug)]
#[command(name = "infragenius")]
#[command(version)]
#[command(about = "Set up and deploy the InfraGenius MCP server", long_about = None)]
pub struct Args {
    /// Ollama model tag (default: settings value, gpt-oss:latest)
    #[arg(short, long, global = true)]
    pub model: Option<String>,

    /// Ollama host (default: settings value, 127.0.0.1)
    #[arg(long, global = true)]
    pub host: Option<String>,

    /// Ollama port (default: settings value, 11434)
    #[arg(long, global = true)]
    pub port: Option<u16>,

    /// Project root directory (current directory by default)
    #[arg(long, global = true, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Tool settings file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbosity level: default (normal), -v (verbose), -vv (very verbose)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress everything except warnings and errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Subcommand
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Prepare a local development environment
    Setup {
        /// Do not start the MCP app server after setup
        #[arg(long)]
        skip_server: bool,
    },

    /// Deploy the professional tier
    Deploy {
        /// Professional license key (32+ alphanumeric characters)
        #[arg(long, value_name = "KEY")]
        license_key: String,

        /// Deployment target
        #[arg(long = "type", value_enum, default_value_t = DeployTarget::Docker)]
        target: DeployTarget,

        /// Public domain the deployment serves (default: settings value, localhost)
        #[arg(long)]
        domain: Option<String>,

        /// Skip self-signed TLS material
        #[arg(long)]
        no_ssl: bool,

        /// Monitoring tier (default: settings value, basic)
        #[arg(long, value_enum)]
        monitoring: Option<MonitoringTier>,
    },

    /// Run system diagnostics and health checks
    Doctor,

    /// List models installed on the Ollama daemon
    Models,

    /// Display the effective tool configuration
    Config,
}

/// Deployment target platform
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployTarget {
    Docker,
    Kubernetes,
    Cloud,
}

impl DeployTarget {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            DeployTarget::Docker => "docker",
            DeployTarget::Kubernetes => "kubernetes",
            DeployTarget::Cloud => "cloud",
        }
    }
}

impl std::fmt::Display for DeployTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Monitoring tier for professional deployments
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MonitoringTier {
    Basic,
    Premium,
    Enterprise,
}

impl MonitoringTier {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MonitoringTier::Basic => "basic",
            MonitoringTier::Premium => "premium",
            MonitoringTier::Enterprise => "enterprise",
        }
    }

    /// Parse a tier name as written in the settings file
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "basic" => Some(MonitoringTier::Basic),
            "premium" => Some(MonitoringTier::Premium),
            "enterprise" => Some(MonitoringTier::Enterprise),
            _ => None,
        }
    }
}

impl std::fmt::Display for MonitoringTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verbosity level enum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    VeryVerbose,
}

impl Args {
    /// Get verbosity level based on flags
    pub fn verbosity(&self) -> Verbosity {
        if self.quiet {
            Verbosity::Quiet
        } else {
            match self.verbose {
                0 => Verbosity::Normal,
                1 => Verbosity::Verbose,
                _ => Verbosity::VeryVerbose,
            }
        }
    }

    /// Get project directory (current dir if not specified)
    pub fn project_dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }

    /// Cross-flag validation clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if let Commands::Deploy {
            domain: Some(domain),
            ..
        } = &self.command
        {
            if domain.is_empty() || domain.contains(char::is_whitespace) {
                return Err(format!("Invalid domain: {:?}", domain));
            }
        }

        Ok(())
    }
}

impl Verbosity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "quiet",
            Verbosity::Normal => "normal",
            Verbosity::Verbose => "verbose",
            Verbosity::VeryVerbose => "very_verbose",
        }
    }

    /// Check if should show progress indicators
    pub fn show_progress(&self) -> bool {
        !matches!(self, Verbosity::Quiet)
    }

    /// Check if should show per-step detail
    pub fn show_detail(&self) -> bool {
        matches!(self, Verbosity::Verbose | Verbosity::VeryVerbose)
    }
}
