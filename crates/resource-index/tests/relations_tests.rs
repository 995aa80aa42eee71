//! Related-resource query tests.

mod common;

use serde_json::Value;

use common::*;
use helios_resource_index::IndexConfig;
use helios_resource_index::labels::StaticLabelResolver;

async fn museum_network(pipeline: &Pipeline) {
    pipeline
        .indexing
        .index_many(&[
            named_resource("R1", "Getty Museum"),
            named_resource("R2", "Getty Villa"),
            named_resource("R3", "Getty Center"),
            named_resource("R4", "Unrelated Museum"),
        ])
        .await
        .unwrap();
    pipeline.add_relationship(relationship("X1", "R1", "R2")).await;
    pipeline.add_relationship(relationship("X2", "R3", "R1")).await;
    pipeline.add_relationship(relationship("X3", "R2", "R4")).await;
}

fn related_ids(related: &[Value]) -> Vec<&str> {
    let mut ids: Vec<&str> = related
        .iter()
        .filter_map(|doc| doc["resourceinstanceid"].as_str())
        .collect();
    ids.sort_unstable();
    ids
}

#[tokio::test]
async fn test_related_resources_from_either_end() {
    let pipeline = Pipeline::new(store_with_nodes());
    museum_network(&pipeline).await;

    let related = pipeline
        .relations
        .related_resources("R1", "en-US", 0, 10)
        .await
        .unwrap();

    assert_eq!(related.total, 2);
    assert_eq!(related.resource_relationships.len(), 2);
    assert_eq!(related_ids(&related.related_resources), vec!["R2", "R3"]);
}

#[tokio::test]
async fn test_related_resources_never_include_self() {
    let pipeline = Pipeline::new(store_with_nodes());
    museum_network(&pipeline).await;
    pipeline.add_relationship(relationship("X9", "R1", "R1")).await;

    let related = pipeline
        .relations
        .related_resources("R1", "en-US", 0, 10)
        .await
        .unwrap();

    assert_eq!(related.total, 3);
    assert_eq!(related_ids(&related.related_resources), vec!["R2", "R3"]);
}

#[tokio::test]
async fn test_related_resources_missing_documents_are_skipped() {
    let pipeline = Pipeline::new(store_with_nodes());
    pipeline.add_relationship(relationship("X1", "R1", "R404")).await;

    let related = pipeline
        .relations
        .related_resources("R1", "en-US", 0, 10)
        .await
        .unwrap();

    assert_eq!(related.total, 1);
    assert!(related.related_resources.is_empty());
}

#[tokio::test]
async fn test_related_resources_without_relationships() {
    let pipeline = Pipeline::new(store_with_nodes());
    museum_network(&pipeline).await;

    let related = pipeline
        .relations
        .related_resources("R404", "en-US", 0, 10)
        .await
        .unwrap();

    assert_eq!(related.total, 0);
    assert!(related.resource_relationships.is_empty());
    assert!(related.related_resources.is_empty());
}

#[tokio::test]
async fn test_relationship_labels_resolve_by_language() {
    let labels = StaticLabelResolver::new()
        .with_label("rel-type-related", "en", "is related to")
        .with_label("rel-type-related", "de", "ist verwandt mit");
    let pipeline = Pipeline::build(store_with_nodes(), labels, IndexConfig::default());
    museum_network(&pipeline).await;

    let english = pipeline
        .relations
        .related_resources("R1", "en-US", 0, 10)
        .await
        .unwrap();
    let german = pipeline
        .relations
        .related_resources("R1", "de", 0, 10)
        .await
        .unwrap();

    assert!(
        english
            .resource_relationships
            .iter()
            .all(|r| r.preflabel == "is related to")
    );
    assert_eq!(german.resource_relationships[0].preflabel, "ist verwandt mit");
}

#[tokio::test]
async fn test_unlabelled_relationship_type_keeps_raw_value() {
    let pipeline = Pipeline::new(store_with_nodes());
    museum_network(&pipeline).await;

    let related = pipeline
        .relations
        .related_resources("R2", "en-US", 0, 10)
        .await
        .unwrap();

    assert_eq!(related.total, 2);
    for relationship in &related.resource_relationships {
        assert_eq!(relationship.preflabel, "rel-type-related");
    }
}

#[tokio::test]
async fn test_relationship_pages() {
    let pipeline = Pipeline::new(store_with_nodes());
    for i in 0..7 {
        pipeline
            .add_relationship(relationship(&format!("X{}", i), "R1", &format!("T{}", i)))
            .await;
    }

    let first = pipeline
        .relations
        .relationship_page("R1", "en-US", 0, 5)
        .await
        .unwrap();
    let second = pipeline
        .relations
        .relationship_page("R1", "en-US", 5, 5)
        .await
        .unwrap();

    assert_eq!(first.total, 7);
    assert_eq!(first.relationships.len(), 5);
    assert_eq!(second.total, 7);
    assert_eq!(second.relationships.len(), 2);
    assert_eq!(second.relationships[0].record.resourcexid, "X5");
}

#[tokio::test]
async fn test_all_relationships_crosses_pages() {
    let config = IndexConfig {
        relationship_page_size: 3,
        ..IndexConfig::default()
    };
    let pipeline = Pipeline::with_config(store_with_nodes(), config);
    for i in 0..10 {
        pipeline
            .add_relationship(relationship(&format!("X{}", i), &format!("S{}", i), "R1"))
            .await;
    }

    let all = pipeline
        .relations
        .all_relationships("R1", "en-US")
        .await
        .unwrap();

    assert_eq!(all.len(), 10);
    let mut ids: Vec<_> = all.iter().map(|r| r.record.resourcexid.clone()).collect();
    ids.dedup();
    assert_eq!(ids.len(), 10);
}
