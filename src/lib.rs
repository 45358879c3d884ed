//! InfraGenius toolkit - local setup and professional deployment
//!
//! A CLI around the InfraGenius MCP server: `setup` prepares a
//! developer machine (Ollama daemon, model, Python venv, generated
//! configuration), `deploy` performs a license-gated professional
//! deployment (Compose/Kubernetes manifests, monitoring, TLS), and
//! `doctor` reports system health.

pub mod artifacts;
pub mod cli;
pub mod deploy;
pub mod doctor;
pub mod errors;
pub mod license;
pub mod ollama;
pub mod probe;
pub mod project;
pub mod python;
pub mod server;
pub mod setup;
pub mod system;

// Re-export commonly used types
pub use errors::{Result, SetupError};
