//! Harness wiring the pipeline to in-memory collaborators.

use std::sync::Arc;

use helios_resource_index::engine::MemoryEngine;
use helios_resource_index::labels::StaticLabelResolver;
use helios_resource_index::store::{CanonicalStore, MemoryStore};
use helios_resource_index::types::RelationshipRecord;
use helios_resource_index::{
    DatatypeRegistry, IndexConfig, IndexingService, RelationshipResolver, ResourceLifecycle,
};

/// Every pipeline component over one store and one engine.
pub struct Pipeline {
    pub store: Arc<MemoryStore>,
    pub engine: Arc<MemoryEngine>,
    pub indexing: IndexingService,
    pub relations: RelationshipResolver,
    pub lifecycle: ResourceLifecycle,
}

impl Pipeline {
    /// Wires a pipeline with default configuration and no labels.
    pub fn new(store: MemoryStore) -> Self {
        Self::with_config(store, IndexConfig::default())
    }

    /// Wires a pipeline with a configuration and no labels.
    pub fn with_config(store: MemoryStore, config: IndexConfig) -> Self {
        Self::build(store, StaticLabelResolver::new(), config)
    }

    /// Wires a pipeline with every collaborator given.
    pub fn build(store: MemoryStore, labels: StaticLabelResolver, config: IndexConfig) -> Self {
        let store = Arc::new(store);
        let engine = Arc::new(MemoryEngine::new());

        let indexing = IndexingService::new(
            Arc::new(DatatypeRegistry::with_builtin()),
            store.clone(),
            engine.clone(),
            config.clone(),
        )
        .expect("valid test configuration");
        let relations = RelationshipResolver::new(engine.clone(), Arc::new(labels), config);
        let lifecycle = ResourceLifecycle::new(
            indexing.clone(),
            relations.clone(),
            store.clone(),
            engine.clone(),
        );

        Self {
            store,
            engine,
            indexing,
            relations,
            lifecycle,
        }
    }

    /// Indexes every relationship record held by the store.
    pub async fn index_stored_relationships(&self) {
        for record in self.store.relationships().await.unwrap() {
            self.indexing.index_relationship(&record).await.unwrap();
        }
    }

    /// Saves a relationship in the store and indexes it.
    pub async fn add_relationship(&self, record: RelationshipRecord) {
        self.store.save_relationship(&record).await.unwrap();
        self.indexing.index_relationship(&record).await.unwrap();
    }

    /// Physical name of the resource index.
    pub fn resource_index(&self) -> String {
        self.indexing.resource_index()
    }

    /// Physical name of the relations index.
    pub fn relations_index(&self) -> String {
        self.indexing.relations_index()
    }

    /// Physical name of the term index.
    pub fn term_index(&self) -> String {
        self.indexing.term_index()
    }
}
