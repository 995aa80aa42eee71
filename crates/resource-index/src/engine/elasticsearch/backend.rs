//! Elasticsearch engine configuration and client.

use std::fmt::Debug;
use std::time::Duration;

use elasticsearch::Elasticsearch;
use elasticsearch::auth::Credentials;
use elasticsearch::cert::CertificateValidation;
use elasticsearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{IndexError, IndexResult, RemoteError};

pub(crate) const SERVICE: &str = "elasticsearch";

/// Authentication configuration for Elasticsearch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ElasticsearchAuth {
    /// Basic username/password authentication.
    Basic {
        /// The username for basic auth.
        username: String,
        /// The password for basic auth.
        password: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token.
        token: String,
    },
}

/// Configuration for the Elasticsearch engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElasticsearchConfig {
    /// Elasticsearch node URLs (e.g., `["http://localhost:9200"]`).
    /// Currently uses the first node (single-node connection pool).
    pub nodes: Vec<String>,

    /// Number of primary shards per index (default: 1).
    #[serde(default = "default_shards")]
    pub number_of_shards: u32,

    /// Number of replica shards per index (default: 1).
    #[serde(default = "default_replicas")]
    pub number_of_replicas: u32,

    /// Refresh interval (default: "1s").
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval: String,

    /// Maximum result window size (default: 10000).
    #[serde(default = "default_max_result_window")]
    pub max_result_window: u32,

    /// Request timeout in milliseconds (default: 30000).
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Optional authentication.
    #[serde(default)]
    pub auth: Option<ElasticsearchAuth>,

    /// Whether to disable certificate validation (default: false).
    /// Only use for development/testing.
    #[serde(default)]
    pub disable_certificate_validation: bool,
}

fn default_shards() -> u32 {
    1
}

fn default_replicas() -> u32 {
    1
}

fn default_refresh_interval() -> String {
    "1s".to_string()
}

fn default_max_result_window() -> u32 {
    10000
}

fn default_request_timeout_ms() -> u64 {
    30000
}

impl Default for ElasticsearchConfig {
    fn default() -> Self {
        Self {
            nodes: vec!["http://localhost:9200".to_string()],
            number_of_shards: default_shards(),
            number_of_replicas: default_replicas(),
            refresh_interval: default_refresh_interval(),
            max_result_window: default_max_result_window(),
            request_timeout_ms: default_request_timeout_ms(),
            auth: None,
            disable_certificate_validation: false,
        }
    }
}

/// Search engine backed by an Elasticsearch cluster.
pub struct ElasticsearchEngine {
    client: Elasticsearch,
    config: ElasticsearchConfig,
}

impl Debug for ElasticsearchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElasticsearchEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

pub(crate) fn remote_error(message: String) -> IndexError {
    IndexError::Remote(RemoteError::InvalidResponse {
        service: SERVICE.to_string(),
        message,
    })
}

pub(crate) fn status_error(status: u16, body: String) -> IndexError {
    IndexError::Remote(RemoteError::Status {
        service: SERVICE.to_string(),
        status,
        body,
    })
}

impl ElasticsearchEngine {
    /// Creates an engine; no request is made until the first operation.
    pub fn new(config: ElasticsearchConfig) -> IndexResult<Self> {
        let client = Self::build_client(&config)?;
        Ok(Self { client, config })
    }

    fn build_client(config: &ElasticsearchConfig) -> IndexResult<Elasticsearch> {
        let url = config
            .nodes
            .first()
            .cloned()
            .unwrap_or_else(|| "http://localhost:9200".to_string());

        let parsed_url: elasticsearch::http::Url = url.parse().map_err(|e| IndexError::Config {
            message: format!("invalid Elasticsearch URL '{}': {}", url, e),
        })?;

        let conn_pool = SingleNodeConnectionPool::new(parsed_url);

        let mut builder = TransportBuilder::new(conn_pool)
            .timeout(Duration::from_millis(config.request_timeout_ms));

        if config.disable_certificate_validation {
            builder = builder.cert_validation(CertificateValidation::None);
        }

        if let Some(ref auth) = config.auth {
            builder = match auth {
                ElasticsearchAuth::Basic { username, password } => {
                    builder.auth(Credentials::Basic(username.clone(), password.clone()))
                }
                ElasticsearchAuth::Bearer { token } => {
                    builder.auth(Credentials::Bearer(token.clone()))
                }
            };
        }

        let transport = builder.build().map_err(|e| {
            IndexError::Remote(RemoteError::Unavailable {
                service: SERVICE.to_string(),
                message: format!("Failed to build transport: {}", e),
            })
        })?;

        Ok(Elasticsearch::new(transport))
    }

    pub(crate) fn client(&self) -> &Elasticsearch {
        &self.client
    }

    /// Returns the engine configuration.
    pub fn config(&self) -> &ElasticsearchConfig {
        &self.config
    }

    /// Checks that the cluster answers and is not red.
    ///
    /// Called before any command touches the cluster.
    pub async fn health_check(&self) -> IndexResult<()> {
        let response = self
            .client
            .cluster()
            .health(elasticsearch::cluster::ClusterHealthParts::None)
            .send()
            .await
            .map_err(|e| {
                IndexError::Remote(RemoteError::Unavailable {
                    service: SERVICE.to_string(),
                    message: format!("Health check failed: {}", e),
                })
            })?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(IndexError::Remote(RemoteError::Unavailable {
                service: SERVICE.to_string(),
                message: format!("Cluster health returned status {}", status),
            }));
        }

        let body = response
            .json::<Value>()
            .await
            .map_err(|e| remote_error(format!("Failed to parse health response: {}", e)))?;
        let cluster_status = check_cluster_status(&body)?;

        tracing::debug!(cluster_status, "Elasticsearch health check passed");
        Ok(())
    }
}

/// Reads the status out of a cluster health body, failing on red.
fn check_cluster_status(body: &Value) -> IndexResult<&str> {
    let cluster_status = body
        .get("status")
        .and_then(|s| s.as_str())
        .unwrap_or("unknown");

    if cluster_status == "red" {
        return Err(IndexError::Remote(RemoteError::Unavailable {
            service: SERVICE.to_string(),
            message: "Cluster status is red".to_string(),
        }));
    }
    Ok(cluster_status)
}
