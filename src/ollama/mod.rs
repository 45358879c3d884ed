//! Ollama daemon integration
//!
//! Client for the local Ollama HTTP API (liveness, model listing, pull
//! streaming) plus daemon bring-up when the API is not reachable.

pub mod client;
pub mod daemon;

pub use client::{ModelInfo, OllamaClient};
pub use daemon::OllamaDaemon;
