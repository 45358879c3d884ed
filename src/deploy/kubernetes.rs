//! Kubernetes manifests for the kubernetes deployment target
//!
//! A Deployment with two replicas plus a LoadBalancer Service, both
//! emitted as typed serde_yaml documents under `k8s/`.

use crate::errors::Result;
use serde::Serialize;
use std::collections::BTreeMap;

/// Replica count for the professional Deployment
pub const REPLICAS: u32 = 2;

/// `k8s/deployment.yaml`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Deployment {
    api_version: String,
    kind: String,
    metadata: Metadata,
    spec: DeploymentSpec,
}

/// `k8s/service.yaml`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KubeService {
    api_version: String,
    kind: String,
    metadata: Metadata,
    spec: ServiceSpec,
}

#[derive(Debug, Serialize)]
struct Metadata {
    name: String,
    labels: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct DeploymentSpec {
    replicas: u32,
    selector: Selector,
    template: PodTemplate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Selector {
    match_labels: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct PodTemplate {
    metadata: TemplateMetadata,
    spec: PodSpec,
}

#[derive(Debug, Serialize)]
struct TemplateMetadata {
    labels: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
struct PodSpec {
    containers: Vec<Container>,
}

#[derive(Debug, Serialize)]
struct Container {
    name: String,
    image: String,
    ports: Vec<ContainerPort>,
    env: Vec<EnvVar>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ContainerPort {
    container_port: u16,
}

#[derive(Debug, Serialize)]
struct EnvVar {
    name: String,
    value: String,
}

#[derive(Debug, Serialize)]
struct ServiceSpec {
    #[serde(rename = "type")]
    service_type: String,
    selector: BTreeMap<String, String>,
    ports: Vec<ServicePort>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ServicePort {
    port: u16,
    target_port: u16,
}

fn app_labels() -> BTreeMap<String, String> {
    let mut labels = BTreeMap::new();
    labels.insert("app".to_string(), "infragenius".to_string());
    labels
}

impl Deployment {
    /// Build the professional Deployment manifest
    pub fn professional(domain: &str) -> Self {
        Self {
            api_version: "apps/v1".to_string(),
            kind: "Deployment".to_string(),
            metadata: Metadata {
                name: "infragenius".to_string(),
                labels: app_labels(),
            },
            spec: DeploymentSpec {
                replicas: REPLICAS,
                selector: Selector {
                    match_labels: app_labels(),
                },
                template: PodTemplate {
                    metadata: TemplateMetadata {
                        labels: app_labels(),
                    },
                    spec: PodSpec {
                        containers: vec![Container {
                            name: "infragenius".to_string(),
                            image: "infragenius:latest".to_string(),
                            ports: vec![ContainerPort {
                                container_port: 8000,
                            }],
                            env: vec![
                                EnvVar {
                                    name: "INFRAGENIUS_ENV".to_string(),
                                    value: "production".to_string(),
                                },
                                EnvVar {
                                    name: "INFRAGENIUS_DOMAIN".to_string(),
                                    value: domain.to_string(),
                                },
                            ],
                        }],
                    },
                },
            },
        }
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

impl KubeService {
    /// Build the LoadBalancer Service manifest
    pub fn professional() -> Self {
        Self {
            api_version: "v1".to_string(),
            kind: "Service".to_string(),
            metadata: Metadata {
                name: "infragenius".to_string(),
                labels: app_labels(),
            },
            spec: ServiceSpec {
                service_type: "LoadBalancer".to_string(),
                selector: app_labels(),
                ports: vec![ServicePort {
                    port: 80,
                    target_port: 8000,
                }],
            },
        }
    }

    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}
