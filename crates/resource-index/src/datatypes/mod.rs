//! Datatype handlers and their registry.
//!
//! Every node declares a datatype name. When a document is assembled the
//! name is looked up in the [`DatatypeRegistry`] and the matching
//! [`DatatypeHandler`] appends the node value to the document's typed
//! buckets.
//!
//! The set of datatypes is open: deployments register additional handlers
//! at startup, and the assembler never needs to change.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use helios_resource_index::datatypes::{DatatypeHandler, DatatypeRegistry};
//! use helios_resource_index::types::SearchDocument;
//! use serde_json::Value;
//!
//! #[derive(Debug)]
//! struct UrlDatatype;
//!
//! impl DatatypeHandler for UrlDatatype {
//!     fn name(&self) -> &str {
//!         "url"
//!     }
//!
//!     fn append_to_document(&self, document: &mut SearchDocument, value: &Value) {
//!         if let Some(url) = value.get("url").and_then(Value::as_str) {
//!             document.strings.push(url.to_string());
//!         }
//!     }
//! }
//!
//! let mut registry = DatatypeRegistry::with_builtin();
//! registry.register(Arc::new(UrlDatatype)).unwrap();
//! assert!(registry.handler_for("url").is_ok());
//! ```

mod handlers;
mod registry;

use std::fmt::Debug;

use serde_json::Value;

use crate::types::SearchDocument;

pub use handlers::{
    BooleanDatatype, DateDatatype, DomainDatatype, DomainListDatatype, GeoJsonDatatype,
    NonIndexedDatatype, NumberDatatype, StringDatatype,
};
pub use registry::DatatypeRegistry;

/// Datatype key whose values produce search terms.
pub const STRING_DATATYPE: &str = "string";

/// Extracts indexable values of one datatype into a search document.
///
/// Implementations are pure with respect to the raw value: the only side
/// effect allowed is mutating the document's buckets. Values of a shape the
/// handler cannot use are skipped.
pub trait DatatypeHandler: Send + Sync + Debug {
    /// The datatype key nodes declare (e.g. `"string"`, `"date"`).
    fn name(&self) -> &str;

    /// Appends the extracted values of `value` to the document's buckets.
    fn append_to_document(&self, document: &mut SearchDocument, value: &Value);
}
