//! Error types shared by node implementations

use thiserror::Error;

/// Result type alias using NodeCoreError
pub type Result<T> = std::result::Result<T, NodeCoreError>;

/// Errors that can occur inside a node, independent of any remote backend
#[derive(Debug, Error)]
pub enum NodeCoreError {
    /// Missing required input
    #[error("Missing required input: {0}")]
    MissingInput(String),

    /// Invalid input type
    #[error("Invalid input type for '{port}': expected {expected}")]
    InvalidInputType { port: String, expected: String },

    /// A required configuration field is absent
    #[error("Missing configuration: {0}")]
    Configuration(String),

    /// Node execution failed
    #[error("Node execution failed: {0}")]
    ExecutionFailed(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl NodeCoreError {
    /// Create an execution failed error with a message
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = NodeCoreError::MissingInput("entries".to_string());
        assert_eq!(err.to_string(), "Missing required input: entries");

        let err = NodeCoreError::InvalidInputType {
            port: "entries".to_string(),
            expected: "array of data elements".to_string(),
        };
        assert!(err.to_string().contains("entries"));
        assert!(err.to_string().contains("array of data elements"));
    }

    #[test]
    fn test_from_serde_json() {
        let json_err = serde_json::from_str::<u32>("not a number").unwrap_err();
        let err: NodeCoreError = json_err.into();
        assert!(matches!(err, NodeCoreError::Serialization(_)));
    }
}
