//! Resources and the tiles they own.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A resource instance: a typed record of the graph `graph_id`, whose data
/// lives in an ordered collection of [`Tile`]s.
///
/// Tiles may be attached in memory (bulk indexing requires this) or left
/// empty and fetched from the canonical store when needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Unique resource id.
    #[serde(rename = "resourceinstanceid")]
    pub id: String,

    /// Graph (resource type) id; partitions the resource index.
    pub graph_id: String,

    /// Security classification.
    #[serde(rename = "resourceinstancesecurity", default)]
    pub security: Option<String>,

    /// Tiles attached in memory.
    #[serde(default)]
    pub tiles: Vec<Tile>,
}

impl Resource {
    /// Creates a resource with no attached tiles.
    pub fn new(id: impl Into<String>, graph_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            graph_id: graph_id.into(),
            security: None,
            tiles: Vec::new(),
        }
    }

    /// Sets the security classification.
    pub fn with_security(mut self, security: impl Into<String>) -> Self {
        self.security = Some(security.into());
        self
    }

    /// Attaches a tile, claiming it for this resource.
    pub fn with_tile(mut self, mut tile: Tile) -> Self {
        tile.resource_id = self.id.clone();
        self.tiles.push(tile);
        self
    }

    /// Replaces the attached tiles.
    pub fn with_tiles(mut self, tiles: Vec<Tile>) -> Self {
        self.tiles = tiles;
        self
    }

    /// Serializes the resource's own fields, without tiles.
    pub fn fields(&self) -> Map<String, Value> {
        let mut fields = Map::new();
        fields.insert(
            "resourceinstanceid".to_string(),
            Value::String(self.id.clone()),
        );
        fields.insert("graph_id".to_string(), Value::String(self.graph_id.clone()));
        fields.insert(
            "resourceinstancesecurity".to_string(),
            self.security
                .as_ref()
                .map(|s| Value::String(s.clone()))
                .unwrap_or(Value::Null),
        );
        fields
    }
}

/// A container of node values owned by exactly one resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    /// Unique tile id.
    #[serde(rename = "tileid")]
    pub id: String,

    /// Owning resource id.
    #[serde(rename = "resourceinstance_id", default)]
    pub resource_id: String,

    /// Nodegroup the tile belongs to.
    #[serde(default)]
    pub nodegroup_id: Option<String>,

    /// Node id to raw node value, in insertion order.
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl Tile {
    /// Creates an empty tile.
    pub fn new(id: impl Into<String>, resource_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            resource_id: resource_id.into(),
            nodegroup_id: None,
            data: Map::new(),
        }
    }

    /// Sets the nodegroup.
    pub fn with_nodegroup(mut self, nodegroup_id: impl Into<String>) -> Self {
        self.nodegroup_id = Some(nodegroup_id.into());
        self
    }

    /// Adds a node value; values keep the order they were added in.
    pub fn with_value(mut self, node_id: impl Into<String>, value: Value) -> Self {
        self.data.insert(node_id.into(), value);
        self
    }

    /// Returns the raw value stored for a node.
    pub fn value(&self, node_id: &str) -> Option<&Value> {
        self.data.get(node_id)
    }
}

/// Returns true for values that carry nothing to index: null, empty string,
/// empty list, or empty mapping.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}
