//! Core enumerations for node metadata
//!
//! These types describe how ports and nodes are presented and scheduled
//! by the editor. The serialized names are part of the editor protocol.

use serde::{Deserialize, Serialize};

/// The data type of a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PortDataType {
    /// Accepts any type
    Any,
    /// Text string
    String,
    /// Boolean value
    Boolean,
    /// Numeric value
    Number,
    /// JSON object
    Json,
    /// A typed platform data element
    Element,
    /// A named, typed parameter (element plus parameter name)
    Parameter,
}

impl PortDataType {
    /// Check if this type can connect to another type
    pub fn is_compatible_with(&self, other: &PortDataType) -> bool {
        if matches!(self, PortDataType::Any) || matches!(other, PortDataType::Any) {
            return true;
        }

        // Elements and parameters travel as JSON through the editor
        if matches!(self, PortDataType::Json)
            && matches!(other, PortDataType::Element | PortDataType::Parameter)
        {
            return true;
        }
        if matches!(other, PortDataType::Json)
            && matches!(self, PortDataType::Element | PortDataType::Parameter)
        {
            return true;
        }

        self == other
    }
}

/// Category of a node, for palette grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeCategory {
    /// Input nodes (payload wrapping, external data)
    Input,
    /// Output nodes (payload unwrapping, display)
    Output,
    /// Processing nodes (remote platform calls)
    Processing,
}

/// Execution mode for a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Execute once per incoming unit of work
    Batch,
    /// Execute reactively when inputs change
    Reactive,
    /// Requires explicit trigger to execute
    Manual,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_port_data_type_compatibility() {
        assert!(PortDataType::Any.is_compatible_with(&PortDataType::String));
        assert!(PortDataType::String.is_compatible_with(&PortDataType::Any));
        assert!(PortDataType::Json.is_compatible_with(&PortDataType::Element));
        assert!(PortDataType::Parameter.is_compatible_with(&PortDataType::Json));
        assert!(!PortDataType::Number.is_compatible_with(&PortDataType::String));
    }

    #[test]
    fn test_serialized_names() {
        let json = serde_json::to_string(&PortDataType::Element).unwrap();
        assert_eq!(json, "\"element\"");

        let json = serde_json::to_string(&NodeCategory::Processing).unwrap();
        assert_eq!(json, "\"processing\"");
    }
}
