//! Typed Docker Compose manifest for the professional stack
//!
//! The service set is a function of the monitoring tier and the SSL
//! flag: the base stack is infragenius + ollama + redis + prometheus,
//! premium adds grafana, enterprise adds node-exporter, and SSL adds an
//! nginx terminator in front.

use crate::cli::MonitoringTier;
use crate::errors::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Top-level Compose document
#[derive(Debug, Serialize)]
pub struct ComposeFile {
    version: String,
    services: BTreeMap<String, Service>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    volumes: BTreeMap<String, serde_yaml::Value>,
}

/// One Compose service entry
#[derive(Debug, Default, Serialize)]
pub struct Service {
    #[serde(skip_serializing_if = "Option::is_none")]
    image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    build: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    ports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    environment: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    volumes: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    depends_on: Vec<String>,
    restart: String,
}

impl Service {
    fn restarting() -> Self {
        Self {
            restart: "unless-stopped".to_string(),
            ..Default::default()
        }
    }
}

impl ComposeFile {
    /// Build the professional manifest for a tier/SSL combination
    pub fn professional(tier: MonitoringTier, ssl: bool, domain: &str) -> Self {
        let mut services = BTreeMap::new();
        let mut volumes = BTreeMap::new();

        let mut app = Service::restarting();
        app.build = Some(".".to_string());
        app.ports = vec!["8000:8000".to_string()];
        app.environment = vec![
            "INFRAGENIUS_ENV=production".to_string(),
            "OLLAMA_BASE_URL=http://ollama:11434".to_string(),
            "REDIS_URL=redis://redis:6379".to_string(),
            format!("INFRAGENIUS_DOMAIN={}", domain),
        ];
        app.volumes = vec!["./config.json:/app/config.json:ro".to_string()];
        app.depends_on = vec!["ollama".to_string(), "redis".to_string()];
        services.insert("infragenius".to_string(), app);

        let mut ollama = Service::restarting();
        ollama.image = Some("ollama/ollama:latest".to_string());
        ollama.ports = vec!["11434:11434".to_string()];
        ollama.volumes = vec!["ollama_data:/root/.ollama".to_string()];
        services.insert("ollama".to_string(), ollama);
        volumes.insert("ollama_data".to_string(), serde_yaml::Value::Null);

        let mut redis = Service::restarting();
        redis.image = Some("redis:7-alpine".to_string());
        redis.volumes = vec!["redis_data:/data".to_string()];
        services.insert("redis".to_string(), redis);
        volumes.insert("redis_data".to_string(), serde_yaml::Value::Null);

        let mut prometheus = Service::restarting();
        prometheus.image = Some("prom/prometheus:latest".to_string());
        prometheus.ports = vec!["9090:9090".to_string()];
        prometheus.volumes = vec![
            "./monitoring/prometheus.yml:/etc/prometheus/prometheus.yml:ro".to_string(),
            "prometheus_data:/prometheus".to_string(),
        ];
        services.insert("prometheus".to_string(), prometheus);
        volumes.insert("prometheus_data".to_string(), serde_yaml::Value::Null);

        if tier >= MonitoringTier::Premium {
            let mut grafana = Service::restarting();
            grafana.image = Some("grafana/grafana:latest".to_string());
            grafana.ports = vec!["3000:3000".to_string()];
            grafana.volumes = vec!["grafana_data:/var/lib/grafana".to_string()];
            grafana.depends_on = vec!["prometheus".to_string()];
            services.insert("grafana".to_string(), grafana);
            volumes.insert("grafana_data".to_string(), serde_yaml::Value::Null);
        }

        if tier >= MonitoringTier::Enterprise {
            let mut exporter = Service::restarting();
            exporter.image = Some("prom/node-exporter:latest".to_string());
            exporter.ports = vec!["9100:9100".to_string()];
            services.insert("node-exporter".to_string(), exporter);
        }

        if ssl {
            let mut nginx = Service::restarting();
            nginx.image = Some("nginx:alpine".to_string());
            nginx.ports = vec!["80:80".to_string(), "443:443".to_string()];
            nginx.volumes = vec!["./ssl:/etc/nginx/ssl:ro".to_string()];
            nginx.depends_on = vec!["infragenius".to_string()];
            services.insert("nginx".to_string(), nginx);
        }

        Self {
            version: "3.8".to_string(),
            services,
            volumes,
        }
    }

    /// Service names in the manifest
    pub fn service_names(&self) -> Vec<&str> {
        self.services.keys().map(String::as_str).collect()
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
