//! Error types for conversion graphs, AMF components and config output.

use ocio_aces_discover::DiscoverError;
use thiserror::Error;

/// Result type for graph operations.
pub type GraphResult<T> = Result<T, GraphError>;

/// Errors that can occur while querying graphs and building configs.
#[derive(Debug, Error)]
pub enum GraphError {
    /// No conversion path exists between two nodes.
    #[error("no conversion path from '{from}' to '{to}'")]
    NoPath {
        /// Source node.
        from: String,
        /// Target node.
        to: String,
    },

    /// Node is not part of the graph.
    #[error("node not found: {node}")]
    NodeNotFound {
        /// Requested node name.
        node: String,
    },

    /// A declared AMF relation references an unknown transform.
    #[error("no transform matches declared AMF relation '{id}'")]
    MissingRelation {
        /// Referenced identifier.
        id: String,
    },

    /// AMF relation file schema version is not supported.
    #[error("unsupported AMF relation schema version: {version}")]
    UnsupportedSchema {
        /// Declared schema version.
        version: String,
    },

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Discovery or classification error.
    #[error(transparent)]
    Discover(#[from] DiscoverError),
}
