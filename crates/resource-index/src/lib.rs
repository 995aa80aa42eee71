//! Helios Resource Index
//!
//! This crate turns resources (typed records made of nested attribute
//! containers called tiles) into search documents and search terms, keeps
//! the search index consistent with the canonical store, and answers
//! relationship queries from the indexed relationship records.
//!
//! # Features
//!
//! - **Extensible datatypes**: node values are extracted by handlers looked
//!   up in a [`DatatypeRegistry`] by datatype name
//! - **Single and bulk indexing**: one document plus N term writes per
//!   resource, or batched bulk writes with a per-item report
//! - **Consistent deletes**: relationships and index documents are removed
//!   before the canonical record, and every step can be re-run
//! - **Pluggable collaborators**: the canonical store, search engine, label
//!   resolver and naming-function resolver are injected trait objects
//!
//! Enable the Elasticsearch engine with a feature flag in `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! helios-resource-index = { version = "0.1", features = ["elasticsearch"] }
//! ```
//!
//! # Architecture
//!
//! - [`datatypes`] - Datatype handlers and their registry
//! - [`assembler`] - Builds the search document and terms of a resource
//! - [`indexing`] - Writes documents, terms and relationships to the engine
//! - [`lifecycle`] - Save and delete semantics
//! - [`relations`] - Related-resource queries
//! - [`naming`] - Primary display names
//! - [`store`], [`engine`], [`labels`] - Collaborator interfaces and in-memory implementations
//!
//! # Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use helios_resource_index::{DatatypeRegistry, IndexConfig, IndexingService};
//! use helios_resource_index::engine::MemoryEngine;
//! use helios_resource_index::store::MemoryStore;
//! use helios_resource_index::types::{Resource, Tile};
//! use serde_json::json;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let store = Arc::new(
//!     MemoryStore::new()
//!         .with_node("name", "string")
//!         .with_resource(
//!             Resource::new("R1", "G1")
//!                 .with_tile(Tile::new("T1", "R1").with_value("name", json!("Getty Museum"))),
//!         ),
//! );
//! let engine = Arc::new(MemoryEngine::new());
//!
//! let service = IndexingService::new(
//!     Arc::new(DatatypeRegistry::with_builtin()),
//!     store,
//!     engine.clone(),
//!     IndexConfig::default(),
//! )
//! .unwrap();
//!
//! let outcome = service.index_one(&Resource::new("R1", "G1")).await.unwrap();
//! assert_eq!(outcome.terms_written, 1);
//! assert_eq!(engine.document("rix_resource", "R1").unwrap()["strings"], json!(["Getty Museum"]));
//! # });
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod assembler;
pub mod config;
pub mod datatypes;
pub mod engine;
pub mod error;
pub mod indexing;
pub mod labels;
pub mod lifecycle;
pub mod naming;
pub mod relations;
pub mod store;
pub mod types;

// Re-export commonly used types at crate root
pub use assembler::{AssembledDocument, DocumentAssembler};
pub use config::{IndexConfig, TermWriteMode};
pub use datatypes::{DatatypeHandler, DatatypeRegistry};
pub use error::{IndexError, IndexResult};
pub use indexing::{BulkIndexReport, IndexOutcome, IndexingService};
pub use lifecycle::{DeleteReport, ResourceLifecycle};
pub use naming::{PrimaryNameResolver, UNDEFINED_NAME};
pub use relations::RelationshipResolver;

// Re-export collaborator traits
pub use engine::{DynSearchEngine, SearchEngine};
pub use labels::{DynLabelResolver, LabelResolver};
pub use naming::{FunctionResolver, PrimaryNameFunction};
pub use store::{CanonicalStore, DynCanonicalStore};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
