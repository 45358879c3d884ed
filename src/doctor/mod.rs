//! Doctor command - system health checks

use crate::errors::Result;
use crate::ollama::OllamaClient;
use crate::project::ProjectRoot;
use crate::python::PythonRuntime;
use crate::setup::preflight::{DISK_FAIL_GB, MEMORY_WARN_GB};
use crate::system;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warning,
    Fail,
}

impl CheckStatus {
    fn symbol(&self) -> &str {
        match self {
            Self::Pass => "✓",
            Self::Warning => "⚠",
            Self::Fail => "✗",
        }
    }
}

#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct HealthReport {
    pub checks: Vec<HealthCheck>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        !self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    pub fn print(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║ InfraGenius System Health Check                       ║");
        println!("╚═══════════════════════════════════════════════════════╝\n");

        for check in &self.checks {
            let symbol = check.status.symbol();
            let latency = check
                .latency_ms
                .map(|ms| format!(" ({}ms)", ms))
                .unwrap_or_default();

            println!(
                "  {} {:<20} {}{}",
                symbol,
                format!("{}:", check.name),
                check.message,
                latency
            );
        }

        println!();

        if self.is_healthy() {
            println!("  ✓ All checks passed - System is healthy\n");
        } else {
            println!("  ✗ Some checks failed - Run `infragenius setup` or fix manually\n");
        }
    }
}

pub struct Doctor {
    client: OllamaClient,
    model: String,
    project_dir: std::path::PathBuf,
    server_url: String,
}

impl Doctor {
    pub fn new(client: OllamaClient, model: String, project_dir: &Path, server_url: String) -> Self {
        Self {
            client,
            model,
            project_dir: project_dir.to_path_buf(),
            server_url,
        }
    }

    pub async fn run_checks(&self) -> Result<HealthReport> {
        let mut checks = Vec::new();

        checks.push(self.check_ollama_api().await);
        checks.push(self.check_model().await);
        checks.push(self.check_disk_space());
        checks.push(self.check_memory());
        checks.push(self.check_python().await);

        // Project-level checks degrade gracefully outside a checkout
        match ProjectRoot::discover(&self.project_dir) {
            Ok(root) => {
                checks.push(self.check_venv(&root));
                checks.push(self.check_config(&root));
            }
            Err(_) => {
                checks.push(HealthCheck {
                    name: "Project".to_string(),
                    status: CheckStatus::Warning,
                    message: format!(
                        "{} is not an InfraGenius checkout",
                        self.project_dir.display()
                    ),
                    latency_ms: None,
                });
            }
        }

        checks.push(self.check_app_server().await);

        Ok(HealthReport { checks })
    }

    async fn check_ollama_api(&self) -> HealthCheck {
        let start = std::time::Instant::now();

        if self.client.is_running().await {
            let latency = start.elapsed().as_millis() as u64;
            let version = self
                .client
                .version()
                .await
                .unwrap_or_else(|_| "unknown".to_string());

            HealthCheck {
                name: "Ollama API".to_string(),
                status: CheckStatus::Pass,
                message: format!("Running (v{})", version),
                latency_ms: Some(latency),
            }
        } else {
            HealthCheck {
                name: "Ollama API".to_string(),
                status: CheckStatus::Fail,
                message: "Not reachable - Start with: ollama serve".to_string(),
                latency_ms: None,
            }
        }
    }

    async fn check_model(&self) -> HealthCheck {
        match self.client.has_model(&self.model).await {
            Ok(true) => HealthCheck {
                name: "Model".to_string(),
                status: CheckStatus::Pass,
                message: format!("{} installed", self.model),
                latency_ms: None,
            },
            Ok(false) => HealthCheck {
                name: "Model".to_string(),
                status: CheckStatus::Warning,
                message: format!("{} not found - setup pulls it automatically", self.model),
                latency_ms: None,
            },
            Err(_) => HealthCheck {
                name: "Model".to_string(),
                status: CheckStatus::Fail,
                message: "Could not check".to_string(),
                latency_ms: None,
            },
        }
    }

    fn check_disk_space(&self) -> HealthCheck {
        match system::available_disk_gb(&self.project_dir) {
            Some(gb) if gb >= DISK_FAIL_GB => HealthCheck {
                name: "Disk Space".to_string(),
                status: CheckStatus::Pass,
                message: format!("{} GB available", gb),
                latency_ms: None,
            },
            Some(gb) => HealthCheck {
                name: "Disk Space".to_string(),
                status: CheckStatus::Warning,
                message: format!("Low: {} GB (recommend {}GB+)", gb, DISK_FAIL_GB),
                latency_ms: None,
            },
            None => HealthCheck {
                name: "Disk Space".to_string(),
                status: CheckStatus::Warning,
                message: "Could not determine".to_string(),
                latency_ms: None,
            },
        }
    }

    fn check_memory(&self) -> HealthCheck {
        let gb = system::total_memory_gb();

        if gb >= MEMORY_WARN_GB {
            HealthCheck {
                name: "Memory".to_string(),
                status: CheckStatus::Pass,
                message: format!("{} GB", gb),
                latency_ms: None,
            }
        } else {
            HealthCheck {
                name: "Memory".to_string(),
                status: CheckStatus::Warning,
                message: format!("{} GB (recommend {}GB+)", gb, MEMORY_WARN_GB),
                latency_ms: None,
            }
        }
    }

    async fn check_python(&self) -> HealthCheck {
        match PythonRuntime::locate().await {
            Ok(runtime) => HealthCheck {
                name: "Python".to_string(),
                status: CheckStatus::Pass,
                message: format!("{} found", runtime.version_string()),
                latency_ms: None,
            },
            Err(e) => HealthCheck {
                name: "Python".to_string(),
                status: CheckStatus::Fail,
                message: e.to_string(),
                latency_ms: None,
            },
        }
    }

    fn check_venv(&self, root: &ProjectRoot) -> HealthCheck {
        if root.venv_python().is_file() {
            HealthCheck {
                name: "Virtualenv".to_string(),
                status: CheckStatus::Pass,
                message: "venv/ present".to_string(),
                latency_ms: None,
            }
        } else {
            HealthCheck {
                name: "Virtualenv".to_string(),
                status: CheckStatus::Warning,
                message: "venv/ missing - run: infragenius setup".to_string(),
                latency_ms: None,
            }
        }
    }

    fn check_config(&self, root: &ProjectRoot) -> HealthCheck {
        if root.config_json().is_file() {
            HealthCheck {
                name: "Config".to_string(),
                status: CheckStatus::Pass,
                message: "config.json present".to_string(),
                latency_ms: None,
            }
        } else {
            HealthCheck {
                name: "Config".to_string(),
                status: CheckStatus::Warning,
                message: "config.json missing - run: infragenius setup".to_string(),
                latency_ms: None,
            }
        }
    }

    async fn check_app_server(&self) -> HealthCheck {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
        {
            Ok(client) => client,
            Err(_) => {
                return HealthCheck {
                    name: "App Server".to_string(),
                    status: CheckStatus::Warning,
                    message: "Could not build probe client".to_string(),
                    latency_ms: None,
                }
            }
        };

        let start = std::time::Instant::now();
        let url = format!("{}/health", self.server_url);

        match client.get(&url).send().await {
            Ok(response) if response.status().is_success() => HealthCheck {
                name: "App Server".to_string(),
                status: CheckStatus::Pass,
                message: "Healthy".to_string(),
                latency_ms: Some(start.elapsed().as_millis() as u64),
            },
            _ => HealthCheck {
                name: "App Server".to_string(),
                status: CheckStatus::Warning,
                message: "Not running (start with: infragenius setup)".to_string(),
                latency_ms: None,
            },
        }
    }
}
