//! Search documents and search terms produced by an indexing pass.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::resource::{Resource, Tile};

/// Field holding the type key (graph id) a document is partitioned by.
pub const TYPE_KEY_FIELD: &str = "_type_key";

/// The canonical search document for one resource.
///
/// Holds the resource's serialized fields, the embedded tiles, and five typed
/// value buckets filled by the datatype handlers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Serialized resource fields (`resourceinstanceid`, `graph_id`, ...).
    #[serde(flatten)]
    pub fields: Map<String, Value>,

    /// Tiles the buckets were extracted from.
    #[serde(default)]
    pub tiles: Vec<Tile>,

    /// String values.
    #[serde(default)]
    pub strings: Vec<String>,

    /// Date values, normalised.
    #[serde(default)]
    pub dates: Vec<String>,

    /// Domain and concept values.
    #[serde(default)]
    pub domains: Vec<Value>,

    /// GeoJSON geometries.
    #[serde(default)]
    pub geometries: Vec<Value>,

    /// Numeric values.
    #[serde(default)]
    pub numbers: Vec<f64>,
}

impl SearchDocument {
    /// Creates the document skeleton for a resource with empty buckets.
    pub fn skeleton(resource: &Resource, tiles: &[Tile]) -> Self {
        Self {
            fields: resource.fields(),
            tiles: tiles.to_vec(),
            ..Self::default()
        }
    }

    /// Returns the resource id recorded in the document.
    pub fn resource_id(&self) -> Option<&str> {
        self.fields.get("resourceinstanceid").and_then(Value::as_str)
    }

    /// Returns the graph id recorded in the document.
    pub fn graph_id(&self) -> Option<&str> {
        self.fields.get("graph_id").and_then(Value::as_str)
    }

    /// Returns true if every bucket is empty.
    pub fn buckets_empty(&self) -> bool {
        self.strings.is_empty()
            && self.dates.is_empty()
            && self.domains.is_empty()
            && self.geometries.is_empty()
            && self.numbers.is_empty()
    }

    /// Serializes the document into the JSON source sent to the engine.
    pub fn to_source(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

/// A term-suggestion entry for a short string node value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchTerm {
    /// Literal text.
    pub term: String,
    /// `{tileid}_{nodeid}`.
    pub term_id: String,
    /// Free-form context.
    #[serde(default)]
    pub context: String,
    /// Free-form options.
    #[serde(default)]
    pub options: Value,
}

impl SearchTerm {
    /// Creates the term for a node value of a tile.
    pub fn for_node(term: impl Into<String>, tile_id: &str, node_id: &str) -> Self {
        Self {
            term: term.into(),
            term_id: format!("{}_{}", tile_id, node_id),
            context: String::new(),
            options: json!({}),
        }
    }

    /// The body written to the term index.
    pub fn to_source(&self) -> Value {
        json!({
            "term": self.term,
            "context": self.context,
            "options": self.options,
        })
    }
}
