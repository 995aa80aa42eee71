//! Command-line configuration for the resource indexer.
//!
//! Every option can also be set through an environment variable.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `RIX_SNAPSHOT` | store.json | Canonical store snapshot (JSON) |
//! | `RIX_ENGINE` | elasticsearch | Search engine (`elasticsearch` or `memory`) |
//! | `RIX_ES_NODES` | http://localhost:9200 | Elasticsearch nodes (comma-separated) |
//! | `RIX_ES_USERNAME` | | Elasticsearch basic auth user |
//! | `RIX_ES_PASSWORD` | | Elasticsearch basic auth password |
//! | `RIX_ES_TIMEOUT_MS` | 30000 | Elasticsearch request timeout |
//! | `RIX_INDEX_PREFIX` | rix | Physical index name prefix |
//! | `RIX_WORDS_PER_SEARCH_TERM` | | Word threshold for search terms |
//! | `RIX_BULK_BATCH_SIZE` | | Documents per bulk request |
//! | `RIX_TERM_WRITE_MODE` | individual | `individual` or `bulk` |
//! | `RIX_LANGUAGE` | en-US | Language for relationship labels |
//! | `RIX_LOG_LEVEL` | info | Log level |

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use helios_resource_index::engine::elasticsearch::{ElasticsearchAuth, ElasticsearchConfig};
use helios_resource_index::{IndexConfig, TermWriteMode};

/// Search engine the indexer writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EngineKind {
    /// An Elasticsearch cluster.
    Elasticsearch,
    /// An in-process engine primed from the snapshot; nothing is persisted.
    Memory,
}

/// Indexer subcommands.
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Create the resource, relations and term indices.
    Init,

    /// Index resources and their relationships.
    Index {
        /// Resource ids to index.
        #[arg(required_unless_present = "all", conflicts_with = "all")]
        ids: Vec<String>,

        /// Index every resource in the snapshot.
        #[arg(long)]
        all: bool,
    },

    /// Delete a resource, its relationships and their index documents.
    Delete {
        /// Resource id.
        id: String,
    },

    /// List the relationships and related resources of a resource.
    Related {
        /// Resource id.
        id: String,

        /// Label language (defaults to the configured language).
        #[arg(long)]
        lang: Option<String>,

        /// Offset of the first relationship.
        #[arg(long, default_value = "0")]
        start: usize,

        /// Maximum number of relationships.
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Print the primary display name of a resource.
    Name {
        /// Resource id.
        id: String,
    },
}

/// Resource indexer configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "resource-indexer")]
#[command(about = "Build and maintain resource search indices", version)]
pub struct IndexerConfig {
    /// Canonical store snapshot (JSON).
    #[arg(long, env = "RIX_SNAPSHOT", default_value = "store.json", global = true)]
    pub snapshot: PathBuf,

    /// Search engine.
    #[arg(long, env = "RIX_ENGINE", value_enum, default_value = "elasticsearch", global = true)]
    pub engine: EngineKind,

    /// Elasticsearch node URLs (comma-separated).
    #[arg(long, env = "RIX_ES_NODES", default_value = "http://localhost:9200", global = true)]
    pub es_nodes: String,

    /// Elasticsearch username for basic auth.
    #[arg(long, env = "RIX_ES_USERNAME", global = true)]
    pub es_username: Option<String>,

    /// Elasticsearch password for basic auth.
    #[arg(long, env = "RIX_ES_PASSWORD", global = true, hide_env_values = true)]
    pub es_password: Option<String>,

    /// Elasticsearch request timeout in milliseconds.
    #[arg(long, env = "RIX_ES_TIMEOUT_MS", default_value = "30000", global = true)]
    pub es_timeout_ms: u64,

    /// Physical index name prefix.
    #[arg(long, env = "RIX_INDEX_PREFIX", default_value = "rix", global = true)]
    pub index_prefix: String,

    /// String values with this many words or more produce no search term.
    #[arg(long, env = "RIX_WORDS_PER_SEARCH_TERM", global = true)]
    pub words_per_search_term: Option<usize>,

    /// Documents per bulk request (all in one request when unset).
    #[arg(long, env = "RIX_BULK_BATCH_SIZE", global = true)]
    pub bulk_batch_size: Option<usize>,

    /// How bulk indexing writes search terms (individual, bulk).
    #[arg(long, env = "RIX_TERM_WRITE_MODE", default_value = "individual", global = true)]
    pub term_write_mode: TermWriteMode,

    /// Language for relationship labels.
    #[arg(long, env = "RIX_LANGUAGE", default_value = "en-US", global = true)]
    pub language: String,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "RIX_LOG_LEVEL", default_value = "info", global = true)]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

impl IndexerConfig {
    /// Returns the configured Elasticsearch node URLs.
    pub fn es_node_list(&self) -> Vec<String> {
        self.es_nodes
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Builds the pipeline configuration.
    pub fn index_config(&self) -> IndexConfig {
        let mut config = IndexConfig {
            default_language: self.language.clone(),
            ..IndexConfig::default()
        }
        .with_index_prefix(self.index_prefix.clone())
        .with_term_write_mode(self.term_write_mode);

        if let Some(words) = self.words_per_search_term {
            config = config.with_words_per_search_term(words);
        }
        if let Some(size) = self.bulk_batch_size {
            config = config.with_bulk_batch_size(size);
        }
        config
    }

    /// Builds the Elasticsearch engine configuration.
    pub fn elasticsearch_config(&self) -> ElasticsearchConfig {
        let auth = match (&self.es_username, &self.es_password) {
            (Some(username), Some(password)) => Some(ElasticsearchAuth::Basic {
                username: username.clone(),
                password: password.clone(),
            }),
            _ => None,
        };

        ElasticsearchConfig {
            nodes: self.es_node_list(),
            request_timeout_ms: self.es_timeout_ms,
            auth,
            ..Default::default()
        }
    }

    /// Validates the configuration and returns every error found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.engine == EngineKind::Elasticsearch && self.es_node_list().is_empty() {
            errors.push("At least one Elasticsearch node is required".to_string());
        }

        if self.es_username.is_some() != self.es_password.is_some() {
            errors.push("Elasticsearch username and password must be set together".to_string());
        }

        if self.es_timeout_ms == 0 {
            errors.push("Elasticsearch timeout cannot be 0".to_string());
        }

        if let Command::Related { limit: 0, .. } = self.command {
            errors.push("Related limit cannot be 0".to_string());
        }

        if let Err(e) = self.index_config().validate() {
            errors.push(e.to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
