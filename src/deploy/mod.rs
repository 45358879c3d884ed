//! Professional-tier deployment pipeline
//!
//! Validates the license key first, then generates every artifact
//! (professional config.json, .license marker, Compose or Kubernetes
//! manifests, monitoring configuration, optional TLS material) before
//! invoking the orchestrator. A readiness probe on `/health` closes the
//! docker path; probe failure is a warning, never a rollback.

pub mod compose;
pub mod kubernetes;
pub mod monitoring;
pub mod tls;

pub use compose::ComposeFile;
pub use kubernetes::{Deployment, KubeService};
pub use monitoring::{GrafanaDashboard, PrometheusConfig};

use crate::artifacts::{write_if_absent, write_replacing, WriteOutcome};
use crate::cli::{DeployTarget, MonitoringTier, Verbosity};
use crate::errors::{Result, SetupError};
use crate::license::{LicenseKey, LicenseMarker, PROFESSIONAL_TIER};
use crate::probe::ReadinessProbe;
use crate::project::ProjectRoot;
use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Deadline for the deployed stack to answer `/health`
const STACK_READY_DEADLINE: Duration = Duration::from_secs(60);

/// Professional tier request limits, mirrored into config.json
pub const REQUESTS_PER_MONTH: u64 = 2500;
pub const REQUESTS_PER_HOUR: u64 = 500;
pub const CONCURRENT_REQUESTS: u64 = 10;

/// What the user asked `deploy` to do
#[derive(Debug, Clone)]
pub struct DeployOptions {
    pub license: LicenseKey,
    pub target: DeployTarget,
    pub domain: String,
    pub tier: MonitoringTier,
    pub ssl: bool,
}

/// Professional `config.json` consumed by the deployed server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfessionalConfig {
    pub server: ProServerBlock,
    pub license: ProLicenseBlock,
    pub ollama: ProOllamaBlock,
    pub redis: ProRedisBlock,
    pub cache: ProCacheBlock,
    pub deployment: ProDeploymentBlock,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProServerBlock {
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub connection_pool_size: usize,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProLicenseBlock {
    pub key: String,
    pub tier: String,
    pub requests_per_month: u64,
    pub requests_per_hour: u64,
    pub concurrent_requests: u64,
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProOllamaBlock {
    pub base_url: String,
    pub model: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProRedisBlock {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProCacheBlock {
    pub enabled: bool,
    pub max_entries: usize,
    pub ttl_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProDeploymentBlock {
    pub mode: String,
    pub target: String,
    pub domain: String,
    pub monitoring: String,
    pub ssl: bool,
    pub generated_at: DateTime<Utc>,
}

impl ProfessionalConfig {
    /// Build the professional configuration document.
    ///
    /// Worker, pool, and cache sizes scale with the monitoring tier;
    /// request limits are fixed professional entitlements.
    pub fn new(opts: &DeployOptions, model: &str) -> Self {
        let (workers, pool, cache_entries) = match opts.tier {
            MonitoringTier::Basic => (4, 10, 1000),
            MonitoringTier::Premium => (8, 25, 5000),
            MonitoringTier::Enterprise => (16, 50, 10000),
        };

        Self {
            server: ProServerBlock {
                host: "0.0.0.0".to_string(),
                port: 8000,
                workers,
                connection_pool_size: pool,
                log_level: "info".to_string(),
            },
            license: ProLicenseBlock {
                key: opts.license.as_str().to_string(),
                tier: PROFESSIONAL_TIER.to_string(),
                requests_per_month: REQUESTS_PER_MONTH,
                requests_per_hour: REQUESTS_PER_HOUR,
                concurrent_requests: CONCURRENT_REQUESTS,
                features: vec![
                    "advanced_features".to_string(),
                    "custom_integrations".to_string(),
                    "api_access".to_string(),
                ],
            },
            ollama: ProOllamaBlock {
                base_url: "http://ollama:11434".to_string(),
                model: model.to_string(),
                timeout_seconds: 120,
            },
            redis: ProRedisBlock {
                url: "redis://redis:6379".to_string(),
            },
            cache: ProCacheBlock {
                enabled: true,
                max_entries: cache_entries,
                ttl_seconds: 3600,
            },
            deployment: ProDeploymentBlock {
                mode: PROFESSIONAL_TIER.to_string(),
                target: opts.target.as_str().to_string(),
                domain: opts.domain.clone(),
                monitoring: opts.tier.as_str().to_string(),
                ssl: opts.ssl,
                generated_at: Utc::now(),
            },
        }
    }

    /// Serialize to pretty JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        Ok(format!("{}\n", serde_json::to_string_pretty(self)?))
    }
}

/// Runs the professional deployment pipeline against a project root
pub struct Deployer<'a> {
    root: &'a ProjectRoot,
    model: String,
    verbosity: Verbosity,
}

impl<'a> Deployer<'a> {
    pub fn new(root: &'a ProjectRoot, model: &str, verbosity: Verbosity) -> Self {
        Self {
            root,
            model: model.to_string(),
            verbosity,
        }
    }

    /// Execute the full pipeline for `opts`
    pub async fn run(&self, opts: &DeployOptions) -> Result<()> {
        self.step(&format!(
            "Deploying InfraGenius professional ({}, {} monitoring)",
            opts.target.as_str(),
            opts.tier.as_str()
        ));

        self.generate_artifacts(opts).await?;

        match opts.target {
            DeployTarget::Docker => {
                self.compose_up().await?;
                self.probe_stack().await;
            }
            DeployTarget::Kubernetes => {
                self.kubectl_apply().await?;
            }
            DeployTarget::Cloud => {
                self.step("Cloud target: artifacts generated, nothing invoked");
            }
        }

        self.print_summary(opts);
        Ok(())
    }

    /// Write every generated file. The license gate already passed;
    /// everything lands on disk before any orchestrator runs.
    pub async fn generate_artifacts(&self, opts: &DeployOptions) -> Result<()> {
        let config = ProfessionalConfig::new(opts, &self.model);
        let outcome = write_if_absent(&self.root.config_json(), &config.to_json()?)?;
        self.report_write("config.json", &self.root.config_json(), outcome);

        // The marker reflects the key used on this run, so it is
        // rewritten rather than skipped
        LicenseMarker::new(&opts.license).write(&self.root.license_marker())?;
        self.step(&format!(
            "License marker written ({})",
            opts.license.fingerprint()
        ));

        let compose = ComposeFile::professional(opts.tier, opts.ssl, &opts.domain);
        write_replacing(&self.root.compose_file(), &compose.to_yaml()?)?;
        self.step("docker-compose.prod.yml written");

        let prometheus = PrometheusConfig::for_tier(opts.tier);
        write_replacing(&self.root.prometheus_config(), &prometheus.to_yaml()?)?;
        self.step(&format!(
            "monitoring/prometheus.yml written (scrape every {})",
            prometheus.scrape_interval()
        ));

        if opts.tier >= MonitoringTier::Premium {
            let dashboard = GrafanaDashboard::overview();
            write_replacing(&self.root.grafana_dashboard(), &dashboard.to_json()?)?;
            self.step("monitoring/grafana-dashboard.json written");
        }

        if opts.target == DeployTarget::Kubernetes {
            let deployment = Deployment::professional(&opts.domain);
            write_replacing(&self.root.k8s_dir().join("deployment.yaml"), &deployment.to_yaml()?)?;

            let service = KubeService::professional();
            write_replacing(&self.root.k8s_dir().join("service.yaml"), &service.to_yaml()?)?;
            self.step("k8s/deployment.yaml and k8s/service.yaml written");
        }

        if opts.ssl {
            match tls::generate_self_signed(&self.root.ssl_dir(), &opts.domain).await? {
                true => self.step(&format!("Self-signed certificate for {}", opts.domain)),
                false => self.warn("openssl not found, continuing without TLS material"),
            }
        }

        Ok(())
    }

    /// `docker compose -f docker-compose.prod.yml up -d`
    async fn compose_up(&self) -> Result<()> {
        require_binary("docker")?;
        self.step("Bringing up the Compose stack");

        run_inherit(
            "docker",
            &[
                "compose",
                "-f",
                "docker-compose.prod.yml",
                "up",
                "-d",
                "--remove-orphans",
            ],
            self.root.path(),
        )
        .await
    }

    /// `kubectl apply -f k8s/`
    async fn kubectl_apply(&self) -> Result<()> {
        require_binary("kubectl")?;
        self.step("Applying Kubernetes manifests");

        run_inherit("kubectl", &["apply", "-f", "k8s/"], self.root.path()).await
    }

    /// Wait for the stack's `/health`; failure is a warning with hints
    async fn probe_stack(&self) {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(3))
            .build()
        {
            Ok(client) => client,
            Err(_) => return,
        };

        let probe = ReadinessProbe::new(STACK_READY_DEADLINE);
        match probe
            .wait_for_http(&client, "http://localhost:8000/health", "deployed stack")
            .await
        {
            Ok(elapsed) => self.step(&format!("Stack healthy after {:.1}s", elapsed.as_secs_f64())),
            Err(_) => {
                self.warn("Stack not answering /health yet");
                self.warn("Inspect with: docker compose -f docker-compose.prod.yml logs -f");
            }
        }
    }

    fn print_summary(&self, opts: &DeployOptions) {
        if self.verbosity == Verbosity::Quiet {
            return;
        }

        println!();
        println!("{}", "  InfraGenius professional deployment".bold());
        println!("  License:    {} ({})", opts.license.fingerprint(), PROFESSIONAL_TIER);
        println!("  Target:     {}", opts.target.as_str());
        println!("  Domain:     {}", opts.domain);
        println!();
        println!("  Endpoints:");
        println!("    Health:   http://{}:8000/health", opts.domain);
        println!("    Analyze:  http://{}:8000/analyze", opts.domain);
        println!("    Docs:     http://{}:8000/docs", opts.domain);
        println!("    Metrics:  http://{}:9090", opts.domain);
        if opts.tier >= MonitoringTier::Premium {
            println!("    Grafana:  http://{}:3000", opts.domain);
        }
        println!();

        match opts.target {
            DeployTarget::Docker => {
                println!("  Logs: docker compose -f docker-compose.prod.yml logs -f");
            }
            DeployTarget::Kubernetes => {
                println!("  Pods: kubectl get pods -l app=infragenius");
            }
            DeployTarget::Cloud => {
                println!("  Next steps for your provider:");
                println!("    1. Build and push the image: docker build -t infragenius .");
                println!("    2. Provision Redis and an Ollama-capable node");
                println!("    3. Apply k8s/ manifests or adapt docker-compose.prod.yml");
            }
        }
        println!();
    }

    fn report_write(&self, label: &str, path: &Path, outcome: WriteOutcome) {
        match outcome {
            WriteOutcome::Created => self.step(&format!("{} written", label)),
            WriteOutcome::SkippedExisting => self.step(&format!(
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

    fn warn(&self, msg: &str) {
        eprintln!("{} {}", "warning:".yellow().bold(), msg);
    }
}

/// Locate a binary on PATH or fail the precondition
fn require_binary(name: &str) -> Result<PathBuf> {
    let path_var = std::env::var_os("PATH")
        .ok_or_else(|| SetupError::Precondition("PATH is not set".to_string()))?;

    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| {
            SetupError::Precondition(format!("{} not found on PATH (is it installed?)", name))
        })
}

/// Run a command with inherited stdio, mapping non-zero exit to an error
async fn run_inherit(program: &str, args: &[&str], cwd: &Path) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .current_dir(cwd)
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .await
        .map_err(|e| SetupError::CommandFailed {
            command: format!("{} {}", program, args.join(" ")),
            detail: e.to_string(),
        })?;

    if !status.success() {
        return Err(SetupError::CommandFailed {
            command: format!("{} {}", program, args.join(" ")),
            detail: format!("exit status {}", status.code().unwrap_or(-1)),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const VALID_KEY: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ012345";

    fn test_root(dir: &TempDir) -> ProjectRoot {
        std::fs::write(dir.path().join("README.md"), "# test\n").unwrap();
        std::fs::create_dir(dir.path().join("mcp_server")).unwrap();
        ProjectRoot::discover(dir.path()).unwrap()
    }

    fn opts(target: DeployTarget, tier: MonitoringTier, ssl: bool) -> DeployOptions {
        DeployOptions {
            license: LicenseKey::parse(VALID_KEY).unwrap(),
            target,
            domain: "localhost".to_string(),
            tier,
            ssl,
        }
    }

    #[test]
    fn test_professional_config_carries_key_and_limits() {
        let opts = opts(DeployTarget::Docker, MonitoringTier::Basic, false);
        let config = ProfessionalConfig::new(&opts, "gpt-oss:latest");

        assert_eq!(config.license.key, VALID_KEY);
        assert_eq!(config.license.requests_per_month, 2500);
        assert_eq!(config.license.requests_per_hour, 500);
        assert_eq!(config.license.concurrent_requests, 10);
        assert_eq!(config.license.features.len(), 3);
        assert_eq!(config.redis.url, "redis://redis:6379");
    }

    #[test]
    fn test_tier_scales_pool_and_cache() {
        let basic = ProfessionalConfig::new(
            &opts(DeployTarget::Docker, MonitoringTier::Basic, false),
            "gpt-oss:latest",
        );
        let enterprise = ProfessionalConfig::new(
            &opts(DeployTarget::Docker, MonitoringTier::Enterprise, false),
            "gpt-oss:latest",
        );

        assert_eq!(basic.server.workers, 4);
        assert_eq!(basic.cache.max_entries, 1000);
        assert_eq!(enterprise.server.workers, 16);
        assert_eq!(enterprise.server.connection_pool_size, 50);
        assert_eq!(enterprise.cache.max_entries, 10000);
    }

    #[test]
    fn test_professional_config_round_trips() {
        let opts = opts(DeployTarget::Docker, MonitoringTier::Premium, true);
        let json = ProfessionalConfig::new(&opts, "gpt-oss:latest").to_json().unwrap();

        let parsed: ProfessionalConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.deployment.monitoring, "premium");
        assert!(parsed.deployment.ssl);
    }

    #[tokio::test]
    async fn test_generate_artifacts_basic_docker() {
        let dir = TempDir::new().unwrap();
        let root = test_root(&dir);
        let deployer = Deployer::new(&root, "gpt-oss:latest", Verbosity::Quiet);

        deployer
            .generate_artifacts(&opts(DeployTarget::Docker, MonitoringTier::Basic, false))
            .await
            .unwrap();

        assert!(root.config_json().is_file());
        assert!(root.license_marker().is_file());
        assert!(root.compose_file().is_file());
        assert!(root.prometheus_config().is_file());
        assert!(!root.grafana_dashboard().exists());
        assert!(!root.k8s_dir().exists());
    }

    #[tokio::test]
    async fn test_generate_artifacts_kubernetes_premium() {
        let dir = TempDir::new().unwrap();
        let root = test_root(&dir);
        let deployer = Deployer::new(&root, "gpt-oss:latest", Verbosity::Quiet);

        deployer
            .generate_artifacts(&opts(DeployTarget::Kubernetes, MonitoringTier::Premium, false))
            .await
            .unwrap();

        assert!(root.grafana_dashboard().is_file());
        assert!(root.k8s_dir().join("deployment.yaml").is_file());
        assert!(root.k8s_dir().join("service.yaml").is_file());
    }

    #[tokio::test]
    async fn test_existing_config_json_is_preserved() {
        let dir = TempDir::new().unwrap();
        let root = test_root(&dir);
        std::fs::write(root.config_json(), "{\"user\": \"edited\"}").unwrap();

        let deployer = Deployer::new(&root, "gpt-oss:latest", Verbosity::Quiet);
        deployer
            .generate_artifacts(&opts(DeployTarget::Docker, MonitoringTier::Basic, false))
            .await
            .unwrap();

        let contents = std::fs::read_to_string(root.config_json()).unwrap();
        assert_eq!(contents, "{\"user\": \"edited\"}");
    }

    #[test]
    fn test_require_binary_missing() {
        let err = require_binary("definitely-not-a-real-binary-1234").unwrap_err();
        assert!(matches!(err, SetupError::Precondition(_)));
    }
}
