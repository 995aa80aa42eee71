//! Core data types: resources, tiles, search documents, relationships.

mod document;
mod relationship;
mod resource;

pub use document::{SearchDocument, SearchTerm, TYPE_KEY_FIELD};
pub use relationship::{RelatedResources, RelationshipRecord, ResolvedRelationship};
pub use resource::{Resource, Tile, is_empty_value};
