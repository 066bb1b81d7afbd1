//! Error types for the operation-network engine

use thiserror::Error;

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors that can occur while building or running an operation network
#[derive(Debug, Error)]
pub enum EngineError {
    /// A node referenced by name is not in the graph
    #[error("node '{0}' not found in graph")]
    NodeNotFound(String),

    /// A port referenced by name is not on the node
    #[error("port '{port}' not found on node '{node}'")]
    PortNotFound { node: String, port: String },

    /// A link referenced by id is not in the graph
    #[error("link '{0}' not found in graph")]
    LinkNotFound(String),

    /// An explicit node name collides with an existing node
    #[error("a node named '{0}' already exists in the graph")]
    DuplicateNodeName(String),

    /// A bind targeted a port that is already attached to a link
    #[error("port '{port}' on node '{node}' is already attached to a link")]
    PortOccupied { node: String, port: String },

    /// A bind would close a cycle, or depth assignment found one
    #[error("operation network contains a cycle")]
    CycleDetected,

    /// An operation raised during execution; aborts the rest of the run
    #[error("operation execution failed: {0}")]
    OperationFailed(String),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EngineError {
    /// Create an operation failure with a message
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::OperationFailed(msg.into())
    }
}
