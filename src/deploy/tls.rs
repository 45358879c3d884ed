//! Self-signed TLS material for the nginx terminator
//!
//! Shells out to `openssl req -x509`. A missing openssl binary is not
//! fatal: the deployment proceeds without TLS and the caller warns.

use crate::errors::{Result, SetupError};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Certificate validity in days
const CERT_DAYS: u32 = 365;

/// Locate `openssl` on PATH
pub fn find_openssl() -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;

    std::env::split_paths(&path_var)
        .map(|dir| dir.join("openssl"))
        .find(|candidate| candidate.is_file())
}

/// Generate `server.key` and `server.crt` under `ssl_dir` for `domain`.
///
/// Returns false without touching the filesystem when openssl is not
/// installed. Existing material is left alone.
pub async fn generate_self_signed(ssl_dir: &Path, domain: &str) -> Result<bool> {
    let key = ssl_dir.join("server.key");
    let crt = ssl_dir.join("server.crt");

    if key.is_file() && crt.is_file() {
        return Ok(true);
    }

    let openssl = match find_openssl() {
        Some(path) => path,
        None => return Ok(false),
    };

    std::fs::create_dir_all(ssl_dir)?;

    let output = Command::new(openssl)
        .args([
            "req",
            "-x509",
            "-nodes",
            "-days",
            &CERT_DAYS.to_string(),
            "-newkey",
            "rsa:4096",
            "-keyout",
        ])
        .arg(&key)
        .arg("-out")
        .arg(&crt)
        .arg("-subj")
        .arg(format!("/CN={}", domain))
        .output()
        .await
        .map_err(|e| SetupError::CommandFailed {
            command: "openssl req -x509".to_string(),
            detail: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(SetupError::CommandFailed {
            command: "openssl req -x509".to_string(),
            detail: stderr
                .lines()
                .rev()
                .find(|line| !line.trim().is_empty())
                .unwrap_or("non-zero exit")
                .to_string(),
        });
    }

    Ok(true)
}
