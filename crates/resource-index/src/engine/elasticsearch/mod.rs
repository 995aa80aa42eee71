//! Elasticsearch search engine.
//!
//! # Index Structure
//!
//! Each logical index of the pipeline maps to one physical index named
//! `{prefix}_{logical}` (e.g. `rix_resource`). Elasticsearch no longer has
//! mapping types, so the type key of a document (its graph id) is stored in
//! the keyword field `_type_key` and applied as a `term` filter.
//!
//! | Kind | Mapped fields |
//! |------|---------------|
//! | resource | resource fields, `strings`, `dates`, `numbers`, `domains`, `geometries`; `tiles` stored only |
//! | relations | relationship record fields as keywords |
//! | term | `term` (text + keyword), `context`; `options` stored only |
//!
//! # Example
//!
//! ```ignore
//! use helios_resource_index::engine::elasticsearch::{ElasticsearchConfig, ElasticsearchEngine};
//!
//! let config = ElasticsearchConfig {
//!     nodes: vec!["http://localhost:9200".to_string()],
//!     ..Default::default()
//! };
//! let engine = ElasticsearchEngine::new(config)?;
//! engine.health_check().await?;
//! ```

mod backend;
pub mod schema;
mod storage;

pub use backend::{ElasticsearchAuth, ElasticsearchConfig, ElasticsearchEngine};
