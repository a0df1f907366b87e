use crate::node::NodeId;
use thiserror::Error;

/// Errors produced by flow editing operations
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("Parent node not found: {0}")]
    InvalidParent(NodeId),

    #[error("Edge endpoint not valid: {0}")]
    InvalidEndpoint(NodeId),

    #[error("Cannot connect node {0} to itself")]
    SelfConnection(NodeId),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    /// Never surfaced by `delete_nodes`, which refuses silently
    #[error("Trigger node cannot be deleted: {0}")]
    ProtectedNodeDeletion(NodeId),

    #[error("Invalid drag payload: {0}")]
    InvalidDragPayload(String),

    #[error("Auto-writing entry not found: {0}")]
    UnknownAutoWriting(u32),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, FlowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = FlowError::InvalidParent(NodeId::new("node-x"));
        assert_eq!(err.to_string(), "Parent node not found: node-x");

        let err = FlowError::UnknownAutoWriting(42);
        assert_eq!(err.to_string(), "Auto-writing entry not found: 42");
    }

    #[test]
    fn test_json_error_conversion() {
        let parse: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let err: FlowError = parse.unwrap_err().into();
        assert!(matches!(err, FlowError::Json(_)));
    }
}
