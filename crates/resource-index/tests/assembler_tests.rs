//! Document assembly tests.

mod common;

use serde_json::json;

use common::*;
use helios_resource_index::IndexConfig;
use helios_resource_index::types::Resource;

#[tokio::test]
async fn test_getty_scenario() {
    let pipeline = Pipeline::new(store_with_nodes());
    let resource = getty_resource();

    let assembled = pipeline
        .indexing
        .documents_to_index(&resource, false)
        .await
        .unwrap();

    assert_eq!(assembled.document.strings, vec!["Getty Museum"]);
    assert_eq!(assembled.terms.len(), 1);
    assert_eq!(assembled.terms[0].term, "Getty Museum");
    assert_eq!(assembled.terms[0].term_id, "T1_N1");
    assert_eq!(assembled.terms[0].context, "");
    assert_eq!(assembled.terms[0].options, json!({}));
}

#[tokio::test]
async fn test_empty_values_never_reach_buckets() {
    let pipeline = Pipeline::new(store_with_nodes());
    let resource = Resource::new("R1", MUSEUM_GRAPH).with_tile(tile(
        "T1",
        "R1",
        &[
            ("node-string", json!("")),
            ("node-concept", json!(null)),
            ("node-concept-list", json!([])),
            ("node-geojson-feature-collection", json!({})),
            ("node-number", json!(null)),
            ("node-date", json!("")),
        ],
    ));

    let assembled = pipeline
        .indexing
        .documents_to_index(&resource, false)
        .await
        .unwrap();

    assert!(assembled.document.buckets_empty());
    assert!(assembled.terms.is_empty());
}

#[tokio::test]
async fn test_every_bucket_is_filled() {
    let pipeline = Pipeline::new(store_with_nodes());
    let resource = Resource::new("R1", MUSEUM_GRAPH).with_tile(tile(
        "T1",
        "R1",
        &[
            ("node-string", json!("Villa")),
            ("node-number", json!(3)),
            ("node-date", json!("1974-01-16")),
            ("node-boolean", json!(true)),
            ("node-concept", json!("c-museum")),
            ("node-domain-value-list", json!(["d-1", "d-2"])),
            ("node-geojson-feature-collection", point_collection(-118.47, 34.08)),
            ("node-file-list", json!([{"name": "plan.pdf"}])),
            ("node-resource-instance", json!("R2")),
        ],
    ));

    let doc = pipeline
        .indexing
        .documents_to_index(&resource, false)
        .await
        .unwrap()
        .document;

    assert_eq!(doc.strings, vec!["Villa"]);
    assert_eq!(doc.numbers, vec![3.0]);
    assert_eq!(doc.dates, vec!["1974-01-16"]);
    assert_eq!(doc.domains, vec![json!("c-museum"), json!("d-1"), json!("d-2")]);
    assert_eq!(doc.geometries.len(), 1);
    assert_eq!(doc.tiles.len(), 1);
    assert_eq!(doc.resource_id(), Some("R1"));
    assert_eq!(doc.graph_id(), Some(MUSEUM_GRAPH));
}

#[tokio::test]
async fn test_bucket_order_follows_tiles_then_nodes() {
    let pipeline = Pipeline::new(store_with_nodes());
    let resource = Resource::new("R1", MUSEUM_GRAPH)
        .with_tile(tile(
            "T1",
            "R1",
            &[("N2", json!("second node")), ("N1", json!("first node"))],
        ))
        .with_tile(tile("T2", "R1", &[("N1", json!("second tile"))]));

    let assembled = pipeline
        .indexing
        .documents_to_index(&resource, false)
        .await
        .unwrap();

    assert_eq!(
        assembled.document.strings,
        vec!["second node", "first node", "second tile"]
    );
    let term_ids: Vec<_> = assembled.terms.iter().map(|t| t.term_id.as_str()).collect();
    assert_eq!(term_ids, vec!["T1_N2", "T1_N1", "T2_N1"]);
}

#[tokio::test]
async fn test_term_emitted_only_below_word_threshold() {
    let config = IndexConfig::default().with_words_per_search_term(3);
    let pipeline = Pipeline::with_config(store_with_nodes(), config);
    let resource = Resource::new("R1", MUSEUM_GRAPH).with_tile(tile(
        "T1",
        "R1",
        &[
            ("N1", json!("Getty Museum")),
            ("N2", json!("The J Paul Getty Museum")),
        ],
    ));

    let assembled = pipeline
        .indexing
        .documents_to_index(&resource, false)
        .await
        .unwrap();

    // Both values are indexed; only the short one becomes a term
    assert_eq!(assembled.document.strings.len(), 2);
    assert_eq!(assembled.terms.len(), 1);
    assert_eq!(assembled.terms[0].term_id, "T1_N1");
}

#[tokio::test]
async fn test_zero_word_threshold_emits_no_terms() {
    let config = IndexConfig::default().with_words_per_search_term(0);
    let pipeline = Pipeline::with_config(store_with_nodes(), config);
    let resource = named_resource("R1", "Getty");

    let assembled = pipeline
        .indexing
        .documents_to_index(&resource, false)
        .await
        .unwrap();

    assert_eq!(assembled.document.strings, vec!["Getty"]);
    assert!(assembled.terms.is_empty());
}

#[tokio::test]
async fn test_fetch_tiles_reads_the_store() {
    let store = store_with_nodes().with_resource(getty_resource());
    let pipeline = Pipeline::new(store);

    // The in-memory copy has no tiles; the stored one does
    let bare = Resource::new("R1", MUSEUM_GRAPH);
    let fetched = pipeline
        .indexing
        .documents_to_index(&bare, true)
        .await
        .unwrap();
    let attached = pipeline
        .indexing
        .documents_to_index(&bare, false)
        .await
        .unwrap();

    assert_eq!(fetched.document.strings, vec!["Getty Museum"]);
    assert!(attached.document.buckets_empty());
}

#[tokio::test]
async fn test_undefined_node_fails_assembly() {
    let pipeline = Pipeline::new(store_with_nodes());
    let resource =
        Resource::new("R1", MUSEUM_GRAPH).with_tile(tile("T1", "R1", &[("N404", json!("x"))]));

    let err = pipeline
        .indexing
        .documents_to_index(&resource, false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("N404"));
    assert!(!err.is_retryable());
}
