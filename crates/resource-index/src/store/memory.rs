//! In-memory canonical store backed by a JSON snapshot.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{IndexResult, StoreError};
use crate::types::{RelationshipRecord, Resource, Tile};

use super::CanonicalStore;

/// Serialized contents of a canonical store.
///
/// Besides the store's own records, a snapshot may carry the label and
/// naming-function tables that tooling needs to wire the label and
/// primary-name resolvers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Node id to datatype name.
    #[serde(default)]
    pub nodes: HashMap<String, String>,

    /// Resources, with their tiles attached.
    #[serde(default)]
    pub resources: Vec<Resource>,

    /// Relationship records.
    #[serde(default)]
    pub relationships: Vec<RelationshipRecord>,

    /// Value id to language to label.
    #[serde(default)]
    pub labels: HashMap<String, HashMap<String, String>>,

    /// Graph id to configured primary-name function configs.
    #[serde(default)]
    pub primary_name_functions: HashMap<String, Vec<Value>>,
}

impl StoreSnapshot {
    /// Reads a snapshot from a JSON file.
    pub fn read_from(path: impl AsRef<Path>) -> IndexResult<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Writes the snapshot to a JSON file, pretty-printed.
    pub fn write_to(&self, path: impl AsRef<Path>) -> IndexResult<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), raw)?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct StoreState {
    nodes: HashMap<String, String>,
    resources: BTreeMap<String, Resource>,
    relationships: BTreeMap<String, RelationshipRecord>,
}

/// A [`CanonicalStore`] kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<StoreState>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding the records of a snapshot.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> Self {
        let mut state = StoreState {
            nodes: snapshot.nodes,
            ..StoreState::default()
        };
        for resource in snapshot.resources {
            state.resources.insert(resource.id.clone(), claim_tiles(resource));
        }
        for record in snapshot.relationships {
            state
                .relationships
                .insert(record.resourcexid.clone(), record);
        }

        Self {
            state: RwLock::new(state),
        }
    }

    /// Defines a node and its datatype.
    pub fn with_node(self, node_id: impl Into<String>, datatype: impl Into<String>) -> Self {
        self.state.write().nodes.insert(node_id.into(), datatype.into());
        self
    }

    /// Adds a resource with its attached tiles.
    pub fn with_resource(self, resource: Resource) -> Self {
        self.state
            .write()
            .resources
            .insert(resource.id.clone(), claim_tiles(resource));
        self
    }

    /// Adds a relationship record.
    pub fn with_relationship(self, record: RelationshipRecord) -> Self {
        self.state
            .write()
            .relationships
            .insert(record.resourcexid.clone(), record);
        self
    }

    /// Returns true if the resource is stored.
    pub fn contains_resource(&self, resource_id: &str) -> bool {
        self.state.read().resources.contains_key(resource_id)
    }

    /// Returns true if the relationship is stored.
    pub fn contains_relationship(&self, relationship_id: &str) -> bool {
        self.state.read().relationships.contains_key(relationship_id)
    }

    /// Copies the store's records into `snapshot`, keeping its label and
    /// naming tables.
    pub fn export_into(&self, snapshot: &mut StoreSnapshot) {
        let state = self.state.read();
        snapshot.nodes = state.nodes.clone();
        snapshot.resources = state.resources.values().cloned().collect();
        snapshot.relationships = state.relationships.values().cloned().collect();
    }
}

fn claim_tiles(mut resource: Resource) -> Resource {
    for tile in &mut resource.tiles {
        tile.resource_id = resource.id.clone();
    }
    resource
}

#[async_trait]
impl CanonicalStore for MemoryStore {
    fn store_name(&self) -> &'static str {
        "memory"
    }

    async fn tiles_for_resource(&self, resource_id: &str) -> IndexResult<Vec<Tile>> {
        Ok(self
            .state
            .read()
            .resources
            .get(resource_id)
            .map(|r| r.tiles.clone())
            .unwrap_or_default())
    }

    async fn node_datatype(&self, node_id: &str) -> IndexResult<String> {
        self.state
            .read()
            .nodes
            .get(node_id)
            .cloned()
            .ok_or_else(|| {
                StoreError::NodeNotFound {
                    node_id: node_id.to_string(),
                }
                .into()
            })
    }

    async fn load_resource(&self, resource_id: &str) -> IndexResult<Option<Resource>> {
        Ok(self
            .state
            .read()
            .resources
            .get(resource_id)
            .map(|r| Resource {
                tiles: Vec::new(),
                ..r.clone()
            }))
    }

    async fn resource_ids(&self) -> IndexResult<Vec<String>> {
        Ok(self.state.read().resources.keys().cloned().collect())
    }

    async fn save_resource(&self, resource: &Resource) -> IndexResult<()> {
        self.state
            .write()
            .resources
            .insert(resource.id.clone(), claim_tiles(resource.clone()));
        Ok(())
    }

    async fn delete_resource(&self, resource_id: &str) -> IndexResult<bool> {
        Ok(self.state.write().resources.remove(resource_id).is_some())
    }

    async fn relationships(&self) -> IndexResult<Vec<RelationshipRecord>> {
        Ok(self.state.read().relationships.values().cloned().collect())
    }

    async fn save_relationship(&self, record: &RelationshipRecord) -> IndexResult<()> {
        self.state
            .write()
            .relationships
            .insert(record.resourcexid.clone(), record.clone());
        Ok(())
    }

    async fn delete_relationship(&self, relationship_id: &str) -> IndexResult<bool> {
        Ok(self
            .state
            .write()
            .relationships
            .remove(relationship_id)
            .is_some())
    }
}
