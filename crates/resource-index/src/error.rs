//! Error types for the indexing pipeline.
//!
//! Errors are grouped by where they originate: datatype configuration,
//! remote collaborators (search engine, canonical store transport), lookups
//! in the canonical store, local file access, and serialization. Partial bulk failures are not
//! errors; they are reported item by item in
//! [`BulkIndexReport`](crate::indexing::BulkIndexReport).

// Error enum variant fields are self-documenting via their #[error(...)] messages
#![allow(missing_docs)]

use thiserror::Error;

/// The primary error type for all indexing operations.
#[derive(Error, Debug)]
pub enum IndexError {
    /// Datatype configuration faults
    #[error(transparent)]
    Datatype(#[from] DatatypeError),

    /// Remote service failures (search engine or canonical store transport)
    #[error(transparent)]
    Remote(#[from] RemoteError),

    /// Canonical store lookup errors
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Invalid configuration
    #[error("invalid configuration: {message}")]
    Config { message: String },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization { message: String },

    /// Local file access failed (snapshot read or write)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IndexError {
    /// Returns true if the caller may retry the failed operation as-is.
    ///
    /// Only remote failures are retryable. Datatype faults are configuration
    /// problems and will fail the same way again, as will a missing or
    /// unreadable local file.
    pub fn is_retryable(&self) -> bool {
        matches!(self, IndexError::Remote(_))
    }

    /// Returns true if this error is an unknown-datatype configuration fault.
    pub fn is_unknown_datatype(&self) -> bool {
        matches!(
            self,
            IndexError::Datatype(DatatypeError::UnknownDatatype { .. })
        )
    }
}

/// Errors raised by the datatype registry.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DatatypeError {
    /// No handler is registered for the datatype.
    #[error("unknown datatype '{datatype}' (node {node_id})")]
    UnknownDatatype { datatype: String, node_id: String },

    /// A handler for the datatype is already registered.
    #[error("datatype '{datatype}' is already registered")]
    DuplicateDatatype { datatype: String },
}

/// Failures talking to a remote collaborator.
#[derive(Error, Debug)]
pub enum RemoteError {
    /// The service could not be reached.
    #[error("{service} unavailable: {message}")]
    Unavailable { service: String, message: String },

    /// The request could not be sent or its body could not be read.
    #[error("{service} request failed: {message}")]
    Request {
        service: String,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The service answered with an error status.
    #[error("{service} returned status {status}: {body}")]
    Status {
        service: String,
        status: u16,
        body: String,
    },

    /// The service answered with a body this crate cannot interpret.
    #[error("invalid response from {service}: {message}")]
    InvalidResponse { service: String, message: String },
}

/// Lookup errors from the canonical store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The node is not defined in the canonical store.
    #[error("node not found: {node_id}")]
    NodeNotFound { node_id: String },

    /// The resource is not present in the canonical store.
    #[error("resource not found: {resource_id}")]
    ResourceNotFound { resource_id: String },
}

/// Result type alias for indexing operations.
pub type IndexResult<T> = Result<T, IndexError>;

impl From<serde_json::Error> for IndexError {
    fn from(err: serde_json::Error) -> Self {
        IndexError::Serialization {
            message: err.to_string(),
        }
    }
}

#[cfg(feature = "elasticsearch")]
impl From<elasticsearch::Error> for IndexError {
    fn from(err: elasticsearch::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            return IndexError::Remote(RemoteError::Unavailable {
                service: "elasticsearch".to_string(),
                message,
            });
        }
        IndexError::Remote(RemoteError::Request {
            service: "elasticsearch".to_string(),
            message,
            source: Some(Box::new(err)),
        })
    }
}
