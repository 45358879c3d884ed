//! Generated project artifacts
//!
//! Every document the toolkit drops into a project is a typed struct
//! serialized through serde; nothing is assembled by string templating.
//! `write_if_absent` is the idempotency primitive: an existing file is
//! never overwritten, so re-running setup or deploy preserves local
//! edits to config.json and .env.

pub mod local;

pub use local::{CursorManifest, EnvFile, LocalConfig};

use crate::errors::Result;
use std::path::Path;

/// Outcome of an idempotent write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Created,
    SkippedExisting,
}

impl WriteOutcome {
    /// True when the file was created by this call
    pub fn created(&self) -> bool {
        matches!(self, WriteOutcome::Created)
    }
}

/// Write `contents` to `path` unless the file already exists
pub fn write_if_absent(path: &Path, contents: &str) -> Result<WriteOutcome> {
    if path.exists() {
        return Ok(WriteOutcome::SkippedExisting);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, contents)?;
    Ok(WriteOutcome::Created)
}

/// Write `contents` to `path`, replacing any existing file.
///
/// Only for derived artifacts (editor manifests, monitoring documents)
/// that carry no user edits.
pub fn write_replacing(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    std::fs::write(path, contents)?;
    Ok(())
}
