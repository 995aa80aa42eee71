//! Elasticsearch index settings and mappings.

use elasticsearch::indices::{IndicesCreateParts, IndicesExistsParts};
use serde_json::{Value, json};

use crate::engine::IndexKind;
use crate::error::IndexResult;
use crate::types::TYPE_KEY_FIELD;

use super::backend::{ElasticsearchConfig, ElasticsearchEngine, status_error};

/// Index settings shared by every kind.
fn index_settings(config: &ElasticsearchConfig) -> Value {
    json!({
        "number_of_shards": config.number_of_shards,
        "number_of_replicas": config.number_of_replicas,
        "index.max_result_window": config.max_result_window,
        "refresh_interval": config.refresh_interval,
        "analysis": {
            "normalizer": {
                "lowercase_normalizer": {
                    "type": "custom",
                    "filter": ["lowercase"]
                }
            }
        }
    })
}

fn properties(kind: IndexKind) -> Value {
    match kind {
        IndexKind::Resource => json!({
            TYPE_KEY_FIELD: { "type": "keyword" },
            "resourceinstanceid": { "type": "keyword" },
            "graph_id": { "type": "keyword" },
            "resourceinstancesecurity": { "type": "keyword" },

            // Tiles are returned with the document but never searched
            "tiles": { "type": "object", "enabled": false },

            "strings": {
                "type": "text",
                "analyzer": "standard",
                "fields": {
                    "keyword": { "type": "keyword", "ignore_above": 256 },
                    "lowercase": {
                        "type": "keyword",
                        "normalizer": "lowercase_normalizer",
                        "ignore_above": 256
                    }
                }
            },
            "dates": {
                "type": "date",
                "format": "strict_date_optional_time||epoch_millis||yyyy||yyyy-MM||yyyy-MM-dd"
            },
            "numbers": { "type": "double" },
            "domains": { "type": "keyword" },
            "geometries": { "type": "object", "enabled": false }
        }),
        IndexKind::Relations => json!({
            TYPE_KEY_FIELD: { "type": "keyword" },
            "resourcexid": { "type": "keyword" },
            "resourceinstanceidfrom": { "type": "keyword" },
            "resourceinstanceidto": { "type": "keyword" },
            "relationshiptype": { "type": "keyword" },
            "notes": { "type": "text" },
            "datestarted": { "type": "keyword" },
            "dateended": { "type": "keyword" }
        }),
        IndexKind::Term => json!({
            "term": {
                "type": "text",
                "analyzer": "standard",
                "fields": {
                    "keyword": { "type": "keyword" }
                }
            },
            "context": { "type": "keyword" },
            "options": { "type": "object", "enabled": false }
        }),
    }
}

/// Creates the settings and mapping body for an index kind.
pub fn create_index_mapping(config: &ElasticsearchConfig, kind: IndexKind) -> Value {
    json!({
        "settings": index_settings(config),
        "mappings": {
            "properties": properties(kind)
        }
    })
}

/// Ensures an index exists, creating it with the mapping for its kind.
pub async fn ensure_index(
    engine: &ElasticsearchEngine,
    index: &str,
    kind: IndexKind,
) -> IndexResult<()> {
    let exists_response = engine
        .client()
        .indices()
        .exists(IndicesExistsParts::Index(&[index]))
        .send()
        .await?;

    if exists_response.status_code().is_success() {
        return Ok(());
    }

    let mapping = create_index_mapping(engine.config(), kind);

    let response = engine
        .client()
        .indices()
        .create(IndicesCreateParts::Index(index))
        .body(mapping)
        .send()
        .await?;

    let status = response.status_code();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        // Lost a creation race with another writer
        if body.contains("resource_already_exists_exception") {
            return Ok(());
        }
        return Err(status_error(status.as_u16(), body));
    }

    tracing::info!(index, kind = ?kind, "Created Elasticsearch index");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_mapping_structure() {
        let config = ElasticsearchConfig::default();
        let mapping = create_index_mapping(&config, IndexKind::Resource);

        assert_eq!(mapping["settings"]["number_of_shards"], 1);
        assert_eq!(mapping["settings"]["refresh_interval"], "1s");

        let props = &mapping["mappings"]["properties"];
        assert_eq!(props["_type_key"]["type"], "keyword");
        assert_eq!(props["strings"]["type"], "text");
        assert_eq!(props["numbers"]["type"], "double");
        assert_eq!(props["tiles"]["enabled"], false);
    }

    #[test]
    fn test_relations_mapping_uses_keywords() {
        let mapping = create_index_mapping(&ElasticsearchConfig::default(), IndexKind::Relations);
        let props = &mapping["mappings"]["properties"];
        assert_eq!(props["resourceinstanceidfrom"]["type"], "keyword");
        assert_eq!(props["resourceinstanceidto"]["type"], "keyword");
    }

    #[test]
    fn test_term_mapping() {
        let mapping = create_index_mapping(&ElasticsearchConfig::default(), IndexKind::Term);
        let props = &mapping["mappings"]["properties"];
        assert_eq!(props["term"]["fields"]["keyword"]["type"], "keyword");
        assert!(props.get("_type_key").is_none());
    }
}
