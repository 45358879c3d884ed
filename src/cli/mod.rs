//! CLI module for the InfraGenius toolkit
//!
//! Handles command-line argument parsing and tool settings.

pub mod args;
pub mod config;

pub use args::{Args, Commands, DeployTarget, MonitoringTier, Verbosity};
pub use config::Settings;
