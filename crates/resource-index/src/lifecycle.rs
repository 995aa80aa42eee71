//! Resource lifecycle: save and delete, keeping the search indices
//! consistent with the canonical store.
//!
//! Callers must serialize lifecycle operations per resource id.

use uuid::Uuid;

use crate::engine::DynSearchEngine;
use crate::error::IndexResult;
use crate::indexing::{IndexOutcome, IndexingService};
use crate::relations::RelationshipResolver;
use crate::store::DynCanonicalStore;
use crate::types::Resource;

/// What a delete removed.
///
/// Every count may be zero when the delete is re-run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteReport {
    /// The deleted resource.
    pub resource_id: String,
    /// Relationship records found touching the resource.
    pub relationships_found: usize,
    /// Relationship records removed from the canonical store.
    pub relationships_deleted: usize,
    /// Relationship documents removed from the relations index.
    pub relation_documents_deleted: usize,
    /// Whether the resource document was removed from the resource index.
    pub document_deleted: bool,
    /// Whether the resource was removed from the canonical store.
    pub resource_deleted: bool,
}

/// The result of saving a resource.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// The resource as stored, ids assigned.
    pub resource: Resource,
    /// The indexing outcome.
    pub index: IndexOutcome,
}

/// Owns create and delete semantics for resources.
#[derive(Clone)]
pub struct ResourceLifecycle {
    indexing: IndexingService,
    relations: RelationshipResolver,
    store: DynCanonicalStore,
    engine: DynSearchEngine,
}

impl std::fmt::Debug for ResourceLifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceLifecycle")
            .field("indexing", &self.indexing)
            .field("relations", &self.relations)
            .finish_non_exhaustive()
    }
}

impl ResourceLifecycle {
    /// Creates a lifecycle manager.
    pub fn new(
        indexing: IndexingService,
        relations: RelationshipResolver,
        store: DynCanonicalStore,
        engine: DynSearchEngine,
    ) -> Self {
        Self {
            indexing,
            relations,
            store,
            engine,
        }
    }

    /// Persists a resource and its tiles, then indexes it.
    ///
    /// A resource or tile without an id is given a fresh UUID.
    pub async fn save(&self, resource: &Resource) -> IndexResult<SaveOutcome> {
        let mut resource = resource.clone();
        if resource.id.is_empty() {
            resource.id = Uuid::new_v4().to_string();
        }
        for tile in &mut resource.tiles {
            if tile.id.is_empty() {
                tile.id = Uuid::new_v4().to_string();
            }
            tile.resource_id = resource.id.clone();
        }

        self.store.save_resource(&resource).await?;
        let index = self.indexing.index_one(&resource).await?;

        tracing::info!(resource_id = %resource.id, tiles = resource.tiles.len(), "Saved resource");
        Ok(SaveOutcome { resource, index })
    }

    /// Deletes a resource, its relationships, and their index documents.
    ///
    /// Order: collect every relationship touching the resource, remove each
    /// from the canonical store and the relations index, remove the resource
    /// document from the resource index, then remove the resource from the
    /// canonical store. Records and documents that are already gone are
    /// skipped, so a failed delete can be re-run.
    pub async fn delete(&self, resource: &Resource) -> IndexResult<DeleteReport> {
        let config = self.indexing.config();
        let relationships = self
            .relations
            .all_relationships(&resource.id, &config.default_language)
            .await?;

        let mut report = DeleteReport {
            resource_id: resource.id.clone(),
            relationships_found: relationships.len(),
            ..DeleteReport::default()
        };

        let relations_index = self.indexing.relations_index();
        for relationship in &relationships {
            let xid = &relationship.record.resourcexid;
            if self.store.delete_relationship(xid).await? {
                report.relationships_deleted += 1;
            }
            if self
                .engine
                .delete_document(&relations_index, None, xid)
                .await?
            {
                report.relation_documents_deleted += 1;
            }
        }

        report.document_deleted = self
            .engine
            .delete_document(
                &self.indexing.resource_index(),
                Some(&resource.graph_id),
                &resource.id,
            )
            .await?;

        report.resource_deleted = self.store.delete_resource(&resource.id).await?;

        tracing::info!(
            resource_id = %resource.id,
            relationships = report.relationships_found,
            document_deleted = report.document_deleted,
            resource_deleted = report.resource_deleted,
            "Deleted resource"
        );
        Ok(report)
    }
}
