//! Python runtime discovery and virtual environment provisioning
//!
//! The MCP server is Python; setup locates `python3`, gates on the
//! minimum supported version, builds `venv/`, and installs the server
//! dependencies into it.

use crate::errors::{Result, SetupError};
use crate::project::ProjectRoot;
use std::path::PathBuf;
use tokio::process::Command;

/// Minimum supported interpreter version
pub const MIN_PYTHON: (u32, u32) = (3, 8);

/// Package installed when the project ships no requirements.txt
const BASELINE_PACKAGE: &str = "mcp";

/// A located Python runtime
#[derive(Debug, Clone)]
pub struct PythonRuntime {
    binary: PathBuf,
    version: (u32, u32),
}

impl PythonRuntime {
    /// Locate `python3` on PATH and gate on [`MIN_PYTHON`]
    pub async fn locate() -> Result<Self> {
        let binary = PathBuf::from("python3");

        let output = Command::new(&binary)
            .arg("--version")
            .output()
            .await
            .map_err(|_| {
                SetupError::PythonRuntime(
                    "python3 not found on PATH (install Python 3.8 or newer)".to_string(),
                )
            })?;

        if !output.status.success() {
            return Err(SetupError::PythonRuntime(
                "python3 --version failed".to_string(),
            ));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let text = if stdout.trim().is_empty() {
            String::from_utf8_lossy(&output.stderr).trim().to_string()
        } else {
            stdout.trim().to_string()
        };

        let version = parse_version(&text).ok_or_else(|| {
            SetupError::PythonRuntime(format!("could not parse interpreter version: {:?}", text))
        })?;

        if version < MIN_PYTHON {
            return Err(SetupError::PythonRuntime(format!(
                "Python {}.{} found, {}.{} or newer required",
                version.0, version.1, MIN_PYTHON.0, MIN_PYTHON.1
            )));
        }

        Ok(Self { binary, version })
    }

    /// Interpreter version as "major.minor"
    pub fn version_string(&self) -> String {
        format!("{}.{}", self.version.0, self.version.1)
    }

    /// Create `venv/` under the project root.
    ///
    /// Returns false when a venv already exists (nothing is rebuilt).
    pub async fn create_venv(&self, root: &ProjectRoot) -> Result<bool> {
        if root.venv_python().exists() {
            return Ok(false);
        }

        run_checked(
            Command::new(&self.binary)
                .args(["-m", "venv", "venv"])
                .current_dir(root.path()),
            "python3 -m venv venv",
        )
        .await?;

        Ok(true)
    }

    /// Install the server dependencies into the venv.
    ///
    /// Uses requirements.txt when the project ships one, otherwise
    /// installs the baseline MCP package.
    pub async fn install_requirements(&self, root: &ProjectRoot) -> Result<()> {
        let pip = root.venv_pip();

        if root.requirements().is_file() {
            run_checked(
                Command::new(&pip)
                    .args(["install", "-r", "requirements.txt"])
                    .current_dir(root.path()),
                "pip install -r requirements.txt",
            )
            .await?;
        } else {
            run_checked(
                Command::new(&pip)
                    .args(["install", BASELINE_PACKAGE])
                    .current_dir(root.path()),
                "pip install mcp",
            )
            .await?;
        }

        Ok(())
    }

    /// Verify a module imports inside the venv
    pub async fn verify_import(&self, root: &ProjectRoot, module: &str) -> Result<()> {
        let python = root.venv_python();
        let statement = format!("import {}", module);

        run_checked(
            Command::new(&python)
                .args(["-c", &statement])
                .current_dir(root.path()),
            &format!("python -c {:?}", statement),
        )
        .await?;

        Ok(())
    }
}

/// Run a command and map a non-zero exit into `CommandFailed`
async fn run_checked(cmd: &mut Command, what: &str) -> Result<std::process::Output> {
    let output = cmd.output().await.map_err(|e| SetupError::CommandFailed {
        command: what.to_string(),
        detail: e.to_string(),
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let detail = stderr
            .lines()
            .rev()
            .find(|line| !line.trim().is_empty())
            .unwrap_or("non-zero exit")
            .to_string();
        return Err(SetupError::CommandFailed {
            command: what.to_string(),
            detail,
        });
    }

    Ok(output)
}

/// Parse "Python 3.11.4" into (3, 11)
fn parse_version(text: &str) -> Option<(u32, u32)> {
    let rest = text.strip_prefix("Python ")?;
    let mut parts = rest.split('.');
    let major = parts.next()?.trim().parse().ok()?;
    let minor = parts.next()?.trim().parse().ok()?;
    Some((major, minor))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_version() {
        assert_eq!(parse_version("Python 3.11.4"), Some((3, 11)));
        assert_eq!(parse_version("Python 3.8.0"), Some((3, 8)));
        assert_eq!(parse_version("Python 3.12"), Some((3, 12)));
        assert_eq!(parse_version("pypy 7.3"), None);
        assert_eq!(parse_version(""), None);
    }

    #[test]
    fn test_version_gate() {
        assert!((3, 7) < MIN_PYTHON);
        assert!((3, 8) >= MIN_PYTHON);
        assert!((3, 12) >= MIN_PYTHON);
        assert!((2, 7) < MIN_PYTHON);
    }

    #[test]
    fn test_version_string() {
        let runtime = PythonRuntime {
            binary: PathBuf::from("python3"),
            version: (3, 11),
        };
        assert_eq!(runtime.version_string(), "3.11");
    }

    #[tokio::test]
    async fn test_create_venv_skips_existing() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("README.md"), "# test\n").unwrap();
        std::fs::create_dir(dir.path().join("mcp_server")).unwrap();
        let root = ProjectRoot::discover(dir.path()).unwrap();

        // Fake an existing venv interpreter
        std::fs::create_dir_all(root.venv_python().parent().unwrap()).unwrap();
        std::fs::write(root.venv_python(), "").unwrap();

        let runtime = PythonRuntime {
            binary: PathBuf::from("python3"),
            version: (3, 11),
        };

        let created = runtime.create_venv(&root).await.unwrap();
        assert!(!created);
    }
}
