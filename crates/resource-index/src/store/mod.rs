//! Canonical store interface.
//!
//! The canonical store is the system of record for resources, tiles, node
//! definitions and relationship records. The indexing pipeline only reads
//! tiles and node datatypes from it, and removes records from it during
//! delete. The persistent implementation lives outside this crate; a
//! [`MemoryStore`] is provided for tests and snapshot-driven tooling.

mod memory;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::IndexResult;
use crate::types::{RelationshipRecord, Resource, Tile};

pub use memory::{MemoryStore, StoreSnapshot};

/// Type alias for a shared canonical store.
pub type DynCanonicalStore = Arc<dyn CanonicalStore>;

/// Access to the canonical (relational) store.
///
/// Deletes report whether something was removed and never fail on a
/// missing record, so that lifecycle operations can be re-run.
#[async_trait]
pub trait CanonicalStore: Send + Sync {
    /// Returns a human-readable name for this store.
    fn store_name(&self) -> &'static str;

    /// Returns the tiles owned by a resource, in storage order.
    ///
    /// An unknown resource has no tiles.
    async fn tiles_for_resource(&self, resource_id: &str) -> IndexResult<Vec<Tile>>;

    /// Returns the datatype name declared by a node.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NodeNotFound`](crate::error::StoreError::NodeNotFound)
    /// if the node is not defined.
    async fn node_datatype(&self, node_id: &str) -> IndexResult<String>;

    /// Loads a resource without its tiles.
    async fn load_resource(&self, resource_id: &str) -> IndexResult<Option<Resource>>;

    /// Returns the ids of all stored resources.
    async fn resource_ids(&self) -> IndexResult<Vec<String>>;

    /// Persists a resource and the tiles attached to it.
    ///
    /// Existing tiles of the resource are replaced.
    async fn save_resource(&self, resource: &Resource) -> IndexResult<()>;

    /// Deletes a resource and its tiles. Returns false if it did not exist.
    async fn delete_resource(&self, resource_id: &str) -> IndexResult<bool>;

    /// Returns all relationship records.
    async fn relationships(&self) -> IndexResult<Vec<RelationshipRecord>>;

    /// Persists a relationship record.
    async fn save_relationship(&self, record: &RelationshipRecord) -> IndexResult<()>;

    /// Deletes a relationship record. Returns false if it did not exist.
    async fn delete_relationship(&self, relationship_id: &str) -> IndexResult<bool>;
}
