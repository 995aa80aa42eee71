//! SearchEngine implementation for Elasticsearch.

use async_trait::async_trait;
use elasticsearch::http::request::JsonBody;
use elasticsearch::{BulkParts, DeleteParts, IndexParts, MgetParts, SearchParts};
use serde_json::{Value, json};

use crate::engine::{
    BulkItem, BulkItemResult, IndexKind, SearchEngine, SearchHit, SearchHits, SearchQuery,
    type_key_matches, with_type_key,
};
use crate::error::IndexResult;
use crate::types::TYPE_KEY_FIELD;

use super::backend::{ElasticsearchEngine, remote_error, status_error};
use super::schema;

/// Builds the alternating action/source lines of a bulk request.
pub(crate) fn bulk_body(items: &[BulkItem]) -> Vec<JsonBody<Value>> {
    let mut body: Vec<JsonBody<Value>> = Vec::with_capacity(items.len() * 2);
    for item in items {
        body.push(JsonBody::new(json!({
            "index": { "_index": item.index, "_id": item.id }
        })));
        body.push(JsonBody::new(item.source.clone()));
    }
    body
}

/// Reads per-item outcomes from a bulk response, in item order.
pub(crate) fn parse_bulk_response(items: &[BulkItem], body: &Value) -> Vec<BulkItemResult> {
    let reported = body
        .get("items")
        .and_then(Value::as_array)
        .cloned()
        .unwrap_or_default();

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let action = reported.get(i).and_then(|r| r.get("index"));
            match action {
                None => BulkItemResult::failed(&item.index, &item.id, "missing from bulk response"),
                Some(action) => match action.get("error") {
                    Some(error) => {
                        let reason = error
                            .get("reason")
                            .and_then(Value::as_str)
                            .map(str::to_string)
                            .unwrap_or_else(|| error.to_string());
                        BulkItemResult::failed(&item.index, &item.id, reason)
                    }
                    None => BulkItemResult::ok(&item.index, &item.id),
                },
            }
        })
        .collect()
}

/// Reads hits and the total from a search response.
pub(crate) fn parse_search_response(body: &Value) -> SearchHits {
    let total = body
        .get("hits")
        .and_then(|h| h.get("total"))
        .and_then(|t| t.get("value").or(Some(t)))
        .and_then(Value::as_u64)
        .unwrap_or(0);

    let hits = body
        .get("hits")
        .and_then(|h| h.get("hits"))
        .and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| {
                    let id = hit.get("_id").and_then(Value::as_str)?;
                    let source = hit.get("_source")?.clone();
                    Some(SearchHit {
                        id: id.to_string(),
                        type_key: source
                            .get(TYPE_KEY_FIELD)
                            .and_then(Value::as_str)
                            .map(str::to_string),
                        source,
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    SearchHits { total, hits }
}

#[async_trait]
impl SearchEngine for ElasticsearchEngine {
    fn engine_name(&self) -> &'static str {
        "elasticsearch"
    }

    async fn ensure_index(&self, index: &str, kind: IndexKind) -> IndexResult<()> {
        schema::ensure_index(self, index, kind).await
    }

    async fn index_document(
        &self,
        index: &str,
        type_key: Option<&str>,
        id: &str,
        document: Value,
    ) -> IndexResult<()> {
        let response = self
            .client()
            .index(IndexParts::IndexId(index, id))
            .body(with_type_key(document, type_key))
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body));
        }

        tracing::debug!(index, id, "Indexed document");
        Ok(())
    }

    async fn bulk_index(&self, items: Vec<BulkItem>) -> IndexResult<Vec<BulkItemResult>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client()
            .bulk(BulkParts::None)
            .body(bulk_body(&items))
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| remote_error(format!("Failed to parse bulk response: {}", e)))?;

        let results = parse_bulk_response(&items, &body);
        tracing::debug!(
            items = results.len(),
            failed = results.iter().filter(|r| !r.is_ok()).count(),
            "Bulk request completed"
        );
        Ok(results)
    }

    async fn delete_document(
        &self,
        index: &str,
        _type_key: Option<&str>,
        id: &str,
    ) -> IndexResult<bool> {
        let response = self
            .client()
            .delete(DeleteParts::IndexId(index, id))
            .send()
            .await?;

        let status = response.status_code();
        if status.as_u16() == 404 {
            return Ok(false);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status.as_u16(), body));
        }
        Ok(true)
    }

    async fn search(
        &self,
        index: &str,
        type_key: Option<&str>,
        query: &SearchQuery,
    ) -> IndexResult<SearchHits> {
        let response = self
            .client()
            .search(SearchParts::Index(&[index]))
            .body(query.to_dsl(type_key))
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.contains("index_not_found_exception") {
                return Ok(SearchHits::default());
            }
            return Err(status_error(status.as_u16(), body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| remote_error(format!("Failed to parse search response: {}", e)))?;

        Ok(parse_search_response(&body))
    }

    async fn multi_get(
        &self,
        index: &str,
        type_key: Option<&str>,
        ids: &[String],
    ) -> IndexResult<Vec<Value>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client()
            .mget(MgetParts::Index(index))
            .body(json!({ "ids": ids }))
            .send()
            .await?;

        let status = response.status_code();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if body.contains("index_not_found_exception") {
                return Ok(Vec::new());
            }
            return Err(status_error(status.as_u16(), body));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| remote_error(format!("Failed to parse mget response: {}", e)))?;

        Ok(body
            .get("docs")
            .and_then(Value::as_array)
            .map(|docs| {
                docs.iter()
                    .filter(|d| d.get("found").and_then(Value::as_bool).unwrap_or(false))
                    .filter_map(|d| d.get("_source").cloned())
                    .filter(|source| type_key_matches(source, type_key))
                    .collect()
            })
            .unwrap_or_default())
    }
}
