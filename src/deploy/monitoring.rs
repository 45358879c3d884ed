//! Monitoring configuration documents
//!
//! Prometheus scrape configuration for every tier plus a Grafana
//! dashboard document at premium and above. Scrape cadence tightens
//! from 30s to 15s above the basic tier.

use crate::cli::MonitoringTier;
use crate::errors::Result;
use serde::Serialize;

/// `monitoring/prometheus.yml`
#[derive(Debug, Serialize)]
pub struct PrometheusConfig {
    global: GlobalConfig,
    scrape_configs: Vec<ScrapeJob>,
}

#[derive(Debug, Serialize)]
struct GlobalConfig {
    scrape_interval: String,
    evaluation_interval: String,
}

#[derive(Debug, Serialize)]
struct ScrapeJob {
    job_name: String,
    static_configs: Vec<StaticConfig>,
}

#[derive(Debug, Serialize)]
struct StaticConfig {
    targets: Vec<String>,
}

impl PrometheusConfig {
    /// Build the scrape configuration for a tier
    pub fn for_tier(tier: MonitoringTier) -> Self {
        let interval = match tier {
            MonitoringTier::Basic => "30s",
            MonitoringTier::Premium | MonitoringTier::Enterprise => "15s",
        };

        let mut scrape_configs = vec![
            ScrapeJob::single("infragenius", "infragenius:8000"),
            ScrapeJob::single("ollama", "ollama:11434"),
            ScrapeJob::single("prometheus", "localhost:9090"),
        ];

        if tier >= MonitoringTier::Enterprise {
            scrape_configs.push(ScrapeJob::single("node-exporter", "node-exporter:9100"));
        }

        Self {
            global: GlobalConfig {
                scrape_interval: interval.to_string(),
                evaluation_interval: interval.to_string(),
            },
            scrape_configs,
        }
    }

    /// Scrape interval in effect
    pub fn scrape_interval(&self) -> &str {
        &self.global.scrape_interval
    }

    /// Job names in scrape order
    pub fn job_names(&self) -> Vec<&str> {
        self.scrape_configs
            .iter()
            .map(|job| job.job_name.as_str())
            .collect()
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl ScrapeJob {
    fn single(name: &str, target: &str) -> Self {
        Self {
            job_name: name.to_string(),
            static_configs: vec![StaticConfig {
                targets: vec![target.to_string()],
            }],
        }
    }
}

/// `monitoring/grafana-dashboard.json`, written at premium and above
#[derive(Debug, Serialize)]
pub struct GrafanaDashboard {
    dashboard: Dashboard,
    overwrite: bool,
}

#[derive(Debug, Serialize)]
struct Dashboard {
    title: String,
    refresh: String,
    #[serde(rename = "schemaVersion")]
    schema_version: u32,
    panels: Vec<Panel>,
}

#[derive(Debug, Serialize)]
struct Panel {
    id: u32,
    title: String,
    #[serde(rename = "type")]
    panel_type: String,
    targets: Vec<PanelTarget>,
}

#[derive(Debug, Serialize)]
struct PanelTarget {
    expr: String,
    #[serde(rename = "legendFormat")]
    legend: String,
}

impl GrafanaDashboard {
    /// Build the InfraGenius overview dashboard
    pub fn overview() -> Self {
        let panels = vec![
            Panel {
                id: 1,
                title: "Request Rate".to_string(),
                panel_type: "graph".to_string(),
                targets: vec![PanelTarget {
                    expr: "rate(infragenius_requests_total[5m])".to_string(),
                    legend: "req/s".to_string(),
                }],
            },
            Panel {
                id: 2,
                title: "Latency p95".to_string(),
                panel_type: "graph".to_string(),
                targets: vec![PanelTarget {
                    expr: "histogram_quantile(0.95, rate(infragenius_request_duration_seconds_bucket[5m]))"
                        .to_string(),
                    legend: "p95".to_string(),
                }],
            },
            Panel {
                id: 3,
                title: "Memory Usage".to_string(),
                panel_type: "graph".to_string(),
                targets: vec![PanelTarget {
                    expr: "process_resident_memory_bytes{job=\"infragenius\"}".to_string(),
                    legend: "rss".to_string(),
                }],
            },
        ];

        Self {
            dashboard: Dashboard {
                title: "InfraGenius Overview".to_string(),
                refresh: "30s".to_string(),
                schema_version: 36,
                panels,
            },
            overwrite: true,
        }
    }

    /// Serialize to pretty JSON with a trailing newline
    pub fn to_json(&self) -> Result<String> {
        Ok(format!("{}\n", serde_json::to_string_pretty(self)?))
    }
}
