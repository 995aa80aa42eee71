//! Save and delete tests.

mod common;

use std::sync::Arc;

use serde_json::json;

use common::*;
use helios_resource_index::naming::StaticFunctionResolver;
use helios_resource_index::store::CanonicalStore;
use helios_resource_index::types::{Resource, Tile};
use helios_resource_index::{PrimaryNameResolver, UNDEFINED_NAME};

async fn indexed_network(pipeline: &Pipeline) {
    for resource in [
        named_resource("R1", "Getty Museum"),
        named_resource("R2", "Getty Villa"),
        named_resource("R3", "Getty Center"),
    ] {
        pipeline.lifecycle.save(&resource).await.unwrap();
    }
    pipeline.add_relationship(relationship("X1", "R1", "R2")).await;
    pipeline.add_relationship(relationship("X2", "R3", "R1")).await;
    pipeline.add_relationship(relationship("X3", "R2", "R3")).await;
}

#[tokio::test]
async fn test_delete_removes_resource_relationships_and_documents() {
    let pipeline = Pipeline::new(store_with_nodes());
    indexed_network(&pipeline).await;

    let report = pipeline
        .lifecycle
        .delete(&Resource::new("R1", MUSEUM_GRAPH))
        .await
        .unwrap();

    assert_eq!(report.relationships_found, 2);
    assert_eq!(report.relationships_deleted, 2);
    assert_eq!(report.relation_documents_deleted, 2);
    assert!(report.document_deleted);
    assert!(report.resource_deleted);

    assert!(!pipeline.store.contains_resource("R1"));
    assert!(!pipeline.store.contains_relationship("X1"));
    assert!(!pipeline.store.contains_relationship("X2"));
    assert!(pipeline.store.contains_relationship("X3"));
    assert!(
        pipeline
            .engine
            .document(&pipeline.resource_index(), "R1")
            .is_none()
    );
    assert_eq!(
        pipeline.engine.document_ids(&pipeline.relations_index()),
        vec!["X3"]
    );

    // Neighbours no longer see the deleted resource
    let related = pipeline
        .relations
        .related_resources("R2", "en-US", 0, 10)
        .await
        .unwrap();
    assert_eq!(related.total, 1);
}

#[tokio::test]
async fn test_delete_can_be_rerun() {
    let pipeline = Pipeline::new(store_with_nodes());
    indexed_network(&pipeline).await;
    let resource = Resource::new("R1", MUSEUM_GRAPH);

    pipeline.lifecycle.delete(&resource).await.unwrap();
    let again = pipeline.lifecycle.delete(&resource).await.unwrap();

    assert_eq!(again.relationships_found, 0);
    assert!(!again.document_deleted);
    assert!(!again.resource_deleted);
}

#[tokio::test]
async fn test_delete_after_partial_failure_finishes_the_job() {
    let pipeline = Pipeline::new(store_with_nodes());
    indexed_network(&pipeline).await;

    // A previous attempt removed one relationship record but not its document
    pipeline.store.delete_relationship("X1").await.unwrap();

    let report = pipeline
        .lifecycle
        .delete(&Resource::new("R1", MUSEUM_GRAPH))
        .await
        .unwrap();

    assert_eq!(report.relationships_found, 2);
    assert_eq!(report.relationships_deleted, 1);
    assert_eq!(report.relation_documents_deleted, 2);
    assert!(report.resource_deleted);
}

#[tokio::test]
async fn test_delete_removes_more_relationships_than_one_page() {
    let pipeline = Pipeline::new(store_with_nodes());
    pipeline
        .lifecycle
        .save(&named_resource("R1", "Getty Museum"))
        .await
        .unwrap();
    for i in 0..40 {
        pipeline
            .add_relationship(relationship(&format!("X{}", i), "R1", &format!("S{}", i)))
            .await;
    }

    let report = pipeline
        .lifecycle
        .delete(&Resource::new("R1", MUSEUM_GRAPH))
        .await
        .unwrap();

    assert_eq!(report.relationships_found, 40);
    assert_eq!(report.relationships_deleted, 40);
    assert_eq!(pipeline.engine.count(&pipeline.relations_index()), 0);
}

#[tokio::test]
async fn test_save_assigns_ids_and_indexes() {
    let pipeline = Pipeline::new(store_with_nodes());
    let resource = Resource::new("", MUSEUM_GRAPH)
        .with_tile(Tile::new("", "").with_value("N1", json!("Getty Museum")));

    let saved = pipeline.lifecycle.save(&resource).await.unwrap();

    let id = saved.resource.id.clone();
    assert!(uuid::Uuid::parse_str(&id).is_ok());
    let tile = &saved.resource.tiles[0];
    assert!(uuid::Uuid::parse_str(&tile.id).is_ok());
    assert_eq!(tile.resource_id, id);

    assert!(pipeline.store.contains_resource(&id));
    assert_eq!(saved.index.terms_written, 1);
    let doc = pipeline
        .engine
        .document(&pipeline.resource_index(), &id)
        .unwrap();
    assert_eq!(doc["strings"], json!(["Getty Museum"]));
    assert_eq!(doc["_type_key"], MUSEUM_GRAPH);
}

#[tokio::test]
async fn test_save_keeps_existing_ids() {
    let pipeline = Pipeline::new(store_with_nodes());

    let saved = pipeline.lifecycle.save(&getty_resource()).await.unwrap();

    assert_eq!(saved.resource.id, "R1");
    assert_eq!(saved.resource.tiles[0].id, "T1");
    assert_eq!(pipeline.store.tiles_for_resource("R1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_primary_name_of_saved_resource() {
    let pipeline = Pipeline::new(store_with_nodes());
    pipeline.lifecycle.save(&getty_resource()).await.unwrap();

    let functions = StaticFunctionResolver::new()
        .with_function(MUSEUM_GRAPH, json!({"string_template": "<N1>"}));
    let names = PrimaryNameResolver::new(Arc::new(functions), pipeline.store.clone());

    let name = names
        .primary_name(&Resource::new("R1", MUSEUM_GRAPH))
        .await
        .unwrap();
    assert_eq!(name, "Getty Museum");
}

#[tokio::test]
async fn test_primary_name_with_two_functions_is_undefined() {
    let pipeline = Pipeline::new(store_with_nodes());
    pipeline.lifecycle.save(&getty_resource()).await.unwrap();

    let functions = StaticFunctionResolver::new()
        .with_function(MUSEUM_GRAPH, json!({"string_template": "<N1>"}))
        .with_function(MUSEUM_GRAPH, json!({"string_template": "<N2>"}));
    let names = PrimaryNameResolver::new(Arc::new(functions), pipeline.store.clone());

    let name = names
        .primary_name(&Resource::new("R1", MUSEUM_GRAPH))
        .await
        .unwrap();
    assert_eq!(name, UNDEFINED_NAME);
}
