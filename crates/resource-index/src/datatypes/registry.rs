//! Datatype Registry.
//!
//! Maps datatype keys to handler trait objects chosen at startup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::DatatypeError;

use super::DatatypeHandler;
use super::handlers::{
    BooleanDatatype, DateDatatype, DomainDatatype, DomainListDatatype, GeoJsonDatatype,
    NonIndexedDatatype, NumberDatatype, StringDatatype,
};

/// Registry of datatype handlers, keyed by datatype name.
#[derive(Clone, Default)]
pub struct DatatypeRegistry {
    handlers: HashMap<String, Arc<dyn DatatypeHandler>>,
}

impl DatatypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in datatypes.
    pub fn with_builtin() -> Self {
        let builtin: Vec<Arc<dyn DatatypeHandler>> = vec![
            Arc::new(StringDatatype),
            Arc::new(NumberDatatype),
            Arc::new(DateDatatype),
            Arc::new(BooleanDatatype),
            Arc::new(DomainDatatype::new("concept")),
            Arc::new(DomainDatatype::new("domain-value")),
            Arc::new(DomainListDatatype::new("concept-list")),
            Arc::new(DomainListDatatype::new("domain-value-list")),
            Arc::new(GeoJsonDatatype),
            Arc::new(NonIndexedDatatype::new("file-list")),
            Arc::new(NonIndexedDatatype::new("resource-instance")),
        ];

        let mut registry = Self::new();
        for handler in builtin {
            registry
                .handlers
                .insert(handler.name().to_string(), handler);
        }
        registry
    }

    /// Returns the number of registered datatypes.
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if no datatype is registered.
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Registers a handler under its own name.
    pub fn register(&mut self, handler: Arc<dyn DatatypeHandler>) -> Result<(), DatatypeError> {
        let name = handler.name().to_string();
        if self.handlers.contains_key(&name) {
            return Err(DatatypeError::DuplicateDatatype { datatype: name });
        }
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Registers a handler, replacing any handler with the same name.
    pub fn replace(&mut self, handler: Arc<dyn DatatypeHandler>) -> Option<Arc<dyn DatatypeHandler>> {
        self.handlers.insert(handler.name().to_string(), handler)
    }

    /// Returns the handler for a datatype.
    pub fn handler_for(&self, datatype: &str) -> Result<Arc<dyn DatatypeHandler>, DatatypeError> {
        self.handlers
            .get(datatype)
            .cloned()
            .ok_or_else(|| DatatypeError::UnknownDatatype {
                datatype: datatype.to_string(),
                node_id: String::new(),
            })
    }

    /// Returns true if a handler is registered for the datatype.
    pub fn contains(&self, datatype: &str) -> bool {
        self.handlers.contains_key(datatype)
    }

    /// Returns all registered datatype names, sorted.
    pub fn datatypes(&self) -> Vec<String> {
        let mut names: Vec<_> = self.handlers.keys().cloned().collect();
        names.sort();
        names
    }
}

impl std::fmt::Debug for DatatypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatatypeRegistry")
            .field("datatypes", &self.datatypes())
            .finish()
    }
}
