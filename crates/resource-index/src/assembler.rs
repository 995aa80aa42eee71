//! Document assembly.
//!
//! Turns a resource and its tiles into the canonical [`SearchDocument`] and
//! the [`SearchTerm`]s used for term suggestion.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::config::IndexConfig;
use crate::datatypes::{DatatypeRegistry, STRING_DATATYPE};
use crate::error::{DatatypeError, IndexResult};
use crate::store::DynCanonicalStore;
use crate::types::{Resource, SearchDocument, SearchTerm, Tile, is_empty_value};

/// The output of one assembly pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssembledDocument {
    /// The search document.
    pub document: SearchDocument,
    /// Terms for string node values, in tile then node order.
    pub terms: Vec<SearchTerm>,
}

/// Builds search documents from resources.
///
/// Node datatypes are looked up in the canonical store once per node per
/// call; nothing is cached across calls.
#[derive(Clone)]
pub struct DocumentAssembler {
    registry: Arc<DatatypeRegistry>,
    store: DynCanonicalStore,
    config: IndexConfig,
}

impl std::fmt::Debug for DocumentAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentAssembler")
            .field("registry", &self.registry)
            .field("store", &self.store.store_name())
            .field("config", &self.config)
            .finish()
    }
}

impl DocumentAssembler {
    /// Creates an assembler.
    pub fn new(
        registry: Arc<DatatypeRegistry>,
        store: DynCanonicalStore,
        config: IndexConfig,
    ) -> Self {
        Self {
            registry,
            store,
            config,
        }
    }

    /// Returns the datatype registry.
    pub fn registry(&self) -> &DatatypeRegistry {
        &self.registry
    }

    /// Assembles the document and terms for a resource from the given tiles.
    ///
    /// Empty node values (null, `""`, `[]`, `{}`) contribute nothing.
    /// Buckets are filled in tile order, then in node order within a tile.
    ///
    /// # Errors
    ///
    /// Fails with `UnknownDatatype` if a node's datatype has no handler, and
    /// with `NodeNotFound` if a node is not defined in the canonical store.
    pub async fn assemble(
        &self,
        resource: &Resource,
        tiles: &[Tile],
    ) -> IndexResult<AssembledDocument> {
        let mut document = SearchDocument::skeleton(resource, tiles);
        let mut terms = Vec::new();
        let mut datatypes: HashMap<String, String> = HashMap::new();

        for tile in tiles {
            for (node_id, value) in &tile.data {
                let datatype = match datatypes.get(node_id) {
                    Some(datatype) => datatype.clone(),
                    None => {
                        let datatype = self.store.node_datatype(node_id).await?;
                        datatypes.insert(node_id.clone(), datatype.clone());
                        datatype
                    }
                };

                if is_empty_value(value) {
                    continue;
                }

                let handler = self.registry.handler_for(&datatype).map_err(|e| match e {
                    DatatypeError::UnknownDatatype { datatype, .. } => {
                        DatatypeError::UnknownDatatype {
                            datatype,
                            node_id: node_id.clone(),
                        }
                    }
                    other => other,
                })?;
                handler.append_to_document(&mut document, value);

                if datatype == STRING_DATATYPE
                    && let Value::String(text) = value
                    && self.config.allows_term(text)
                {
                    terms.push(SearchTerm::for_node(text.clone(), &tile.id, node_id));
                }
            }
        }

        tracing::debug!(
            resource_id = %resource.id,
            tiles = tiles.len(),
            terms = terms.len(),
            "Assembled search document"
        );

        Ok(AssembledDocument { document, terms })
    }
}
