//! Cross-module checks on the generated professional artifacts

use infragenius::cli::{DeployTarget, MonitoringTier, Verbosity};
use infragenius::deploy::{ComposeFile, DeployOptions, Deployer, PrometheusConfig};
use infragenius::license::LicenseKey;
use infragenius::project::ProjectRoot;
use tempfile::TempDir;

const VALID_KEY: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ012345";

fn project(dir: &TempDir) -> ProjectRoot {
    std::fs::write(dir.path().join("README.md"), "# InfraGenius\n").unwrap();
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
fn compose_service_matrix() {
    let cases = [
        (MonitoringTier::Basic, false, vec!["infragenius", "ollama", "prometheus", "redis"]),
        (
            MonitoringTier::Premium,
            false,
            vec!["grafana", "infragenius", "ollama", "prometheus", "redis"],
        ),
        (
            MonitoringTier::Enterprise,
            false,
            vec!["grafana", "infragenius", "node-exporter", "ollama", "prometheus", "redis"],
        ),
        (
            MonitoringTier::Basic,
            true,
            vec!["infragenius", "nginx", "ollama", "prometheus", "redis"],
        ),
    ];

    for (tier, ssl, expected) in cases {
        let compose = ComposeFile::professional(tier, ssl, "localhost");
        assert_eq!(compose.service_names(), expected, "tier {:?} ssl {}", tier, ssl);
    }
}

#[test]
fn prometheus_interval_tightens_above_basic() {
    assert_eq!(PrometheusConfig::for_tier(MonitoringTier::Basic).scrape_interval(), "30s");
    assert_eq!(PrometheusConfig::for_tier(MonitoringTier::Premium).scrape_interval(), "15s");
    assert_eq!(PrometheusConfig::for_tier(MonitoringTier::Enterprise).scrape_interval(), "15s");
}

#[tokio::test]
async fn generated_json_artifacts_parse_back() {
    let dir = TempDir::new().unwrap();
    let root = project(&dir);
    let deployer = Deployer::new(&root, "gpt-oss:latest", Verbosity::Quiet);

    deployer
        .generate_artifacts(&opts(DeployTarget::Docker, MonitoringTier::Premium, false))
        .await
        .unwrap();

    let config: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(root.config_json()).unwrap()).unwrap();
    assert_eq!(config["license"]["key"], VALID_KEY);
    assert_eq!(config["license"]["requests_per_month"], 2500);
    assert_eq!(config["deployment"]["monitoring"], "premium");

    let marker: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(root.license_marker()).unwrap()).unwrap();
    assert_eq!(marker["tier"], "professional");

    let dashboard: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(root.grafana_dashboard()).unwrap()).unwrap();
    assert!(dashboard["dashboard"]["panels"].is_array());
}

#[tokio::test]
async fn generated_yaml_artifacts_parse_back() {
    let dir = TempDir::new().unwrap();
    let root = project(&dir);
    let deployer = Deployer::new(&root, "gpt-oss:latest", Verbosity::Quiet);

    deployer
        .generate_artifacts(&opts(DeployTarget::Kubernetes, MonitoringTier::Enterprise, false))
        .await
        .unwrap();

    let compose: serde_yaml::Value =
        serde_yaml::from_str(&std::fs::read_to_string(root.compose_file()).unwrap()).unwrap();
    assert!(compose["services"]["node-exporter"].is_mapping());

    let prometheus: serde_yaml::Value =
        serde_yaml::from_str(&std::fs::read_to_string(root.prometheus_config()).unwrap()).unwrap();
    assert_eq!(prometheus["global"]["scrape_interval"], "15s");

    let deployment: serde_yaml::Value = serde_yaml::from_str(
        &std::fs::read_to_string(root.k8s_dir().join("deployment.yaml")).unwrap(),
    )
    .unwrap();
    assert_eq!(deployment["spec"]["replicas"], 2);
}

#[tokio::test]
async fn rerun_rotates_marker_but_keeps_config() {
    let dir = TempDir::new().unwrap();
    let root = project(&dir);
    let deployer = Deployer::new(&root, "gpt-oss:latest", Verbosity::Quiet);

    let first = opts(DeployTarget::Docker, MonitoringTier::Basic, false);
    deployer.generate_artifacts(&first).await.unwrap();
    let config_before = std::fs::read_to_string(root.config_json()).unwrap();
    let marker_before = std::fs::read_to_string(root.license_marker()).unwrap();

    deployer.generate_artifacts(&first).await.unwrap();
    let config_after = std::fs::read_to_string(root.config_json()).unwrap();
    let marker_after = std::fs::read_to_string(root.license_marker()).unwrap();

    // config.json is user-owned after first generation; the marker
    // reflects each run (fresh deployment id)
    assert_eq!(config_before, config_after);
    assert_ne!(marker_before, marker_after);
}
