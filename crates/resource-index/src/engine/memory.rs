//! In-memory search engine.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::{Map, Value};

use crate::error::{IndexResult, RemoteError};
use crate::types::TYPE_KEY_FIELD;

use super::{
    BulkItem, BulkItemResult, IndexKind, SearchEngine, SearchHit, SearchHits, SearchQuery,
    type_key_matches, with_type_key,
};

#[derive(Debug, Default)]
struct EngineState {
    /// Index name to documents by id, in insertion order.
    indices: HashMap<String, Map<String, Value>>,
    kinds: HashMap<String, IndexKind>,
    failing_indices: HashSet<String>,
    rejected_ids: HashSet<String>,
    bulk_requests: usize,
    bulk_request_limit: Option<usize>,
}

/// A [`SearchEngine`] holding documents in memory.
///
/// Search returns hits in insertion order, which stands in for the
/// engine's default order. Writes can be made to fail per index or per
/// document id, and bulk requests past a limit can be refused, to exercise
/// failure paths.
#[derive(Debug, Default)]
pub struct MemoryEngine {
    state: RwLock<EngineState>,
}

fn rejected(index: &str, id: &str) -> RemoteError {
    RemoteError::Status {
        service: "memory".to_string(),
        status: 503,
        body: format!("write to {}/{} rejected", index, id),
    }
}

impl MemoryEngine {
    /// Creates an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every write to `index` fail.
    pub fn fail_writes_to(&self, index: impl Into<String>) {
        self.state.write().failing_indices.insert(index.into());
    }

    /// Makes every write of document `id` fail, in any index.
    pub fn reject_document(&self, id: impl Into<String>) {
        self.state.write().rejected_ids.insert(id.into());
    }

    /// Makes every bulk request after the first `accepted` fail outright.
    pub fn fail_bulk_requests_after(&self, accepted: usize) {
        self.state.write().bulk_request_limit = Some(accepted);
    }

    /// Returns a stored document source.
    pub fn document(&self, index: &str, id: &str) -> Option<Value> {
        self.state
            .read()
            .indices
            .get(index)
            .and_then(|docs| docs.get(id))
            .cloned()
    }

    /// Returns the ids stored in an index, in insertion order.
    pub fn document_ids(&self, index: &str) -> Vec<String> {
        self.state
            .read()
            .indices
            .get(index)
            .map(|docs| docs.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Returns the number of documents in an index.
    pub fn count(&self, index: &str) -> usize {
        self.state
            .read()
            .indices
            .get(index)
            .map(Map::len)
            .unwrap_or(0)
    }

    /// Returns how many bulk requests were received.
    pub fn bulk_requests(&self) -> usize {
        self.state.read().bulk_requests
    }

    /// Returns the kind an index was created with.
    pub fn index_kind(&self, index: &str) -> Option<IndexKind> {
        self.state.read().kinds.get(index).copied()
    }

    fn write_allowed(state: &EngineState, index: &str, id: &str) -> bool {
        !state.failing_indices.contains(index) && !state.rejected_ids.contains(id)
    }
}

#[async_trait]
impl SearchEngine for MemoryEngine {
    fn engine_name(&self) -> &'static str {
        "memory"
    }

    async fn ensure_index(&self, index: &str, kind: IndexKind) -> IndexResult<()> {
        let mut state = self.state.write();
        state.kinds.entry(index.to_string()).or_insert(kind);
        state.indices.entry(index.to_string()).or_default();
        Ok(())
    }

    async fn index_document(
        &self,
        index: &str,
        type_key: Option<&str>,
        id: &str,
        document: Value,
    ) -> IndexResult<()> {
        let mut state = self.state.write();
        if !Self::write_allowed(&state, index, id) {
            return Err(rejected(index, id).into());
        }
        state
            .indices
            .entry(index.to_string())
            .or_default()
            .insert(id.to_string(), with_type_key(document, type_key));
        Ok(())
    }

    async fn bulk_index(&self, items: Vec<BulkItem>) -> IndexResult<Vec<BulkItemResult>> {
        let mut state = self.state.write();
        state.bulk_requests += 1;
        if state
            .bulk_request_limit
            .is_some_and(|limit| state.bulk_requests > limit)
        {
            return Err(RemoteError::Unavailable {
                service: "memory".to_string(),
                message: format!("bulk request {} refused", state.bulk_requests),
            }
            .into());
        }

        let mut results = Vec::with_capacity(items.len());
        for item in items {
            if !Self::write_allowed(&state, &item.index, &item.id) {
                let reason = rejected(&item.index, &item.id).to_string();
                results.push(BulkItemResult::failed(item.index, item.id, reason));
                continue;
            }
            state
                .indices
                .entry(item.index.clone())
                .or_default()
                .insert(item.id.clone(), item.source);
            results.push(BulkItemResult::ok(item.index, item.id));
        }
        Ok(results)
    }

    async fn delete_document(
        &self,
        index: &str,
        _type_key: Option<&str>,
        id: &str,
    ) -> IndexResult<bool> {
        // Ids are unique per index, so the type key does not narrow the delete
        Ok(self
            .state
            .write()
            .indices
            .get_mut(index)
            .and_then(|docs| docs.shift_remove(id))
            .is_some())
    }

    async fn search(
        &self,
        index: &str,
        type_key: Option<&str>,
        query: &SearchQuery,
    ) -> IndexResult<SearchHits> {
        let state = self.state.read();
        let Some(docs) = state.indices.get(index) else {
            return Ok(SearchHits::default());
        };

        let matching: Vec<(&String, &Value)> = docs
            .iter()
            .filter(|(_, source)| type_key_matches(source, type_key) && query.matches(source))
            .collect();

        let hits = matching
            .iter()
            .skip(query.start)
            .take(query.limit)
            .map(|(id, source)| SearchHit {
                id: (*id).clone(),
                type_key: source
                    .get(TYPE_KEY_FIELD)
                    .and_then(Value::as_str)
                    .map(str::to_string),
                source: (*source).clone(),
            })
            .collect();

        Ok(SearchHits {
            total: matching.len() as u64,
            hits,
        })
    }

    async fn multi_get(
        &self,
        index: &str,
        type_key: Option<&str>,
        ids: &[String],
    ) -> IndexResult<Vec<Value>> {
        let state = self.state.read();
        let Some(docs) = state.indices.get(index) else {
            return Ok(Vec::new());
        };

        Ok(ids
            .iter()
            .filter_map(|id| docs.get(id))
            .filter(|source| type_key_matches(source, type_key))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::TermsFilter;
    use serde_json::json;

    #[tokio::test]
    async fn test_index_and_get() {
        let engine = MemoryEngine::new();
        engine
            .index_document("rix_resource", Some("G1"), "R1", json!({"graph_id": "G1"}))
            .await
            .unwrap();

        let doc = engine.document("rix_resource", "R1").unwrap();
        assert_eq!(doc["_type_key"], "G1");

        let docs = engine
            .multi_get("rix_resource", Some("G2"), &["R1".to_string()])
            .await
            .unwrap();
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn test_search_paginates_in_insertion_order() {
        let engine = MemoryEngine::new();
        for (id, tag) in [("A", "x"), ("B", "y"), ("C", "x"), ("D", "x")] {
            engine
                .index_document("idx", None, id, json!({"tag": tag}))
                .await
                .unwrap();
        }

        let query = SearchQuery::any_of(vec![TermsFilter::new("tag", "x")]).paginate(1, 1);
        let hits = engine.search("idx", None, &query).await.unwrap();
        assert_eq!(hits.total, 3);
        assert_eq!(hits.hits.len(), 1);
        assert_eq!(hits.hits[0].id, "C");
    }

    #[tokio::test]
    async fn test_search_missing_index_is_empty() {
        let engine = MemoryEngine::new();
        let hits = engine
            .search("nope", None, &SearchQuery::default())
            .await
            .unwrap();
        assert_eq!(hits.total, 0);
    }

    #[tokio::test]
    async fn test_bulk_reports_rejected_items() {
        let engine = MemoryEngine::new();
        engine.reject_document("R2");

        let items = vec![
            engine.create_bulk_item("idx", Some("G1"), "R1", json!({})),
            engine.create_bulk_item("idx", Some("G1"), "R2", json!({})),
        ];
        let results = engine.bulk_index(items).await.unwrap();

        assert!(results[0].is_ok());
        assert!(!results[1].is_ok());
        assert_eq!(engine.count("idx"), 1);
        assert_eq!(engine.bulk_requests(), 1);
    }

    #[tokio::test]
    async fn test_bulk_requests_past_limit_fail() {
        let engine = MemoryEngine::new();
        engine.fail_bulk_requests_after(1);

        let first = vec![engine.create_bulk_item("idx", None, "A", json!({}))];
        assert!(engine.bulk_index(first).await.is_ok());

        let second = vec![engine.create_bulk_item("idx", None, "B", json!({}))];
        let err = engine.bulk_index(second).await.unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(engine.document_ids("idx"), vec!["A"]);
        assert_eq!(engine.bulk_requests(), 2);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let engine = MemoryEngine::new();
        engine
            .index_document("idx", None, "R1", json!({}))
            .await
            .unwrap();
        assert!(engine.delete_document("idx", None, "R1").await.unwrap());
        assert!(!engine.delete_document("idx", None, "R1").await.unwrap());
        assert!(!engine.delete_document("other", None, "R1").await.unwrap());
    }

    #[tokio::test]
    async fn test_failing_index() {
        let engine = MemoryEngine::new();
        engine.fail_writes_to("rix_term");
        let err = engine
            .index_document("rix_term", None, "T1_N1", json!({}))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
