//! Search engine interface.
//!
//! The search engine is a black-box document store with index, bulk,
//! delete, search and multi-get operations. Documents are addressed by
//! `(index, id)` and carry an optional type key (the graph id for resource
//! documents), stored in the document under [`TYPE_KEY_FIELD`] and usable
//! as a filter.
//!
//! Implementations:
//!
//! | Engine | Feature | Use |
//! |--------|---------|-----|
//! | [`MemoryEngine`] | always | tests and dry runs |
//! | `ElasticsearchEngine` | `elasticsearch` | production |

#[cfg(feature = "elasticsearch")]
pub mod elasticsearch;
mod memory;
mod query;

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::IndexResult;
use crate::types::{SearchTerm, TYPE_KEY_FIELD};

pub use memory::MemoryEngine;
pub use query::{FilterOperator, SearchQuery, TermsFilter};

/// Type alias for a shared search engine.
pub type DynSearchEngine = Arc<dyn SearchEngine>;

/// The kinds of index the pipeline writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Resource search documents.
    Resource,
    /// Relationship records.
    Relations,
    /// Search terms.
    Term,
}

/// One document of a bulk write.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItem {
    /// Physical index.
    pub index: String,
    /// Type key the document is partitioned by.
    pub type_key: Option<String>,
    /// Document id.
    pub id: String,
    /// Document source, type key included.
    pub source: Value,
}

/// The outcome of one bulk item.
#[derive(Debug, Clone, PartialEq)]
pub struct BulkItemResult {
    /// Physical index.
    pub index: String,
    /// Document id.
    pub id: String,
    /// Failure reason, if the item was rejected.
    pub error: Option<String>,
}

impl BulkItemResult {
    /// Creates a successful result.
    pub fn ok(index: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            error: None,
        }
    }

    /// Creates a failed result.
    pub fn failed(index: impl Into<String>, id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            id: id.into(),
            error: Some(error.into()),
        }
    }

    /// Returns true if the item was written.
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// A search hit.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    /// Document id.
    pub id: String,
    /// Type key recorded in the document, if any.
    pub type_key: Option<String>,
    /// Document source.
    pub source: Value,
}

/// A page of search hits.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchHits {
    /// Total matching documents, across all pages.
    pub total: u64,
    /// Hits on the requested page, in engine order.
    pub hits: Vec<SearchHit>,
}

/// Stores `type_key` in a document source.
///
/// Non-object sources are returned unchanged.
pub fn with_type_key(mut source: Value, type_key: Option<&str>) -> Value {
    if let (Some(type_key), Some(obj)) = (type_key, source.as_object_mut()) {
        obj.insert(
            TYPE_KEY_FIELD.to_string(),
            Value::String(type_key.to_string()),
        );
    }
    source
}

/// Returns true if a source belongs to the type key, or no key is requested.
pub(crate) fn type_key_matches(source: &Value, type_key: Option<&str>) -> bool {
    match type_key {
        None => true,
        Some(key) => source.get(TYPE_KEY_FIELD).and_then(Value::as_str) == Some(key),
    }
}

/// Operations the pipeline needs from a search engine.
///
/// All index arguments are physical index names.
#[async_trait]
pub trait SearchEngine: Send + Sync {
    /// Returns a human-readable name for this engine.
    fn engine_name(&self) -> &'static str;

    /// Creates the index if it does not exist, with the mapping for its kind.
    async fn ensure_index(&self, index: &str, kind: IndexKind) -> IndexResult<()>;

    /// Writes a document, replacing any document with the same id.
    async fn index_document(
        &self,
        index: &str,
        type_key: Option<&str>,
        id: &str,
        document: Value,
    ) -> IndexResult<()>;

    /// Writes a search term, keyed by its term id.
    async fn index_term(&self, index: &str, term: &SearchTerm) -> IndexResult<()> {
        self.index_document(index, None, &term.term_id, term.to_source())
            .await
    }

    /// Wraps a document as a bulk item.
    fn create_bulk_item(
        &self,
        index: &str,
        type_key: Option<&str>,
        id: &str,
        data: Value,
    ) -> BulkItem {
        BulkItem {
            index: index.to_string(),
            type_key: type_key.map(str::to_string),
            id: id.to_string(),
            source: with_type_key(data, type_key),
        }
    }

    /// Writes many documents in one request.
    ///
    /// Returns one result per item, in item order. Item failures are
    /// reported in the results; only a failed request is an error.
    async fn bulk_index(&self, items: Vec<BulkItem>) -> IndexResult<Vec<BulkItemResult>>;

    /// Deletes a document. Returns false if it did not exist.
    async fn delete_document(
        &self,
        index: &str,
        type_key: Option<&str>,
        id: &str,
    ) -> IndexResult<bool>;

    /// Runs a query, restricted to a type key when one is given.
    ///
    /// A missing index yields no hits.
    async fn search(
        &self,
        index: &str,
        type_key: Option<&str>,
        query: &SearchQuery,
    ) -> IndexResult<SearchHits>;

    /// Fetches document sources by id, in id order, skipping missing ids.
    async fn multi_get(
        &self,
        index: &str,
        type_key: Option<&str>,
        ids: &[String],
    ) -> IndexResult<Vec<Value>>;
}
