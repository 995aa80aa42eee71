//! Fixture resources, tiles and relationships.

use serde_json::{Value, json};

use helios_resource_index::store::MemoryStore;
use helios_resource_index::types::{RelationshipRecord, Resource, Tile};

/// Graph id used by museum fixtures.
pub const MUSEUM_GRAPH: &str = "graph-museum";

/// Graph id used by person fixtures.
pub const PERSON_GRAPH: &str = "graph-person";

/// A store with one node per built-in datatype.
///
/// Node ids are the datatype names with `node-` prepended.
pub fn store_with_nodes() -> MemoryStore {
    [
        "string",
        "number",
        "date",
        "boolean",
        "concept",
        "concept-list",
        "domain-value",
        "domain-value-list",
        "geojson-feature-collection",
        "file-list",
        "resource-instance",
    ]
    .into_iter()
    .fold(MemoryStore::new(), |store, datatype| {
        store.with_node(format!("node-{}", datatype), datatype)
    })
    .with_node("N1", "string")
    .with_node("N2", "string")
}

/// A tile with the given node values.
pub fn tile(id: &str, resource_id: &str, values: &[(&str, Value)]) -> Tile {
    values
        .iter()
        .fold(Tile::new(id, resource_id), |tile, (node, value)| {
            tile.with_value(*node, value.clone())
        })
}

/// R1 with tile T1: N1 = "Getty Museum", N2 = "".
pub fn getty_resource() -> Resource {
    Resource::new("R1", MUSEUM_GRAPH).with_tile(tile(
        "T1",
        "R1",
        &[("N1", json!("Getty Museum")), ("N2", json!(""))],
    ))
}

/// A museum resource with a single string name.
pub fn named_resource(id: &str, name: &str) -> Resource {
    Resource::new(id, MUSEUM_GRAPH).with_tile(tile(
        &format!("{}-name", id),
        id,
        &[("N1", json!(name))],
    ))
}

/// A GeoJSON feature collection with one point.
pub fn point_collection(lon: f64, lat: f64) -> Value {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [lon, lat] },
            "properties": {}
        }]
    })
}

/// A relationship record.
pub fn relationship(id: &str, from: &str, to: &str) -> RelationshipRecord {
    RelationshipRecord::new(id, from, to, "rel-type-related")
}
