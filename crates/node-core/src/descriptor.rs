//! Node descriptor trait and metadata types
//!
//! A node implementation describes its own ports, category and label by
//! implementing [`NodeDescriptor`]. Descriptors are collected at link time
//! via `inventory`, so the editor's palette is a pure function of which
//! node crates are linked in.

use serde::{Deserialize, Serialize};

use crate::types::{ExecutionMode, NodeCategory, PortDataType};

/// Trait for nodes that can describe their metadata
///
/// Implementing this trait lets a node provide its metadata for UI
/// rendering and connection validation without a separate registry entry.
pub trait NodeDescriptor {
    /// Get the static metadata for this node type
    fn descriptor() -> NodeMetadata
    where
        Self: Sized;
}

/// Complete metadata for a node type
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetadata {
    /// Unique type identifier (e.g., "submit-data")
    pub node_type: String,
    /// Category for UI grouping
    pub category: NodeCategory,
    /// Human-readable label
    pub label: String,
    /// Description of what the node does
    pub description: String,
    /// Input port definitions
    pub inputs: Vec<PortMetadata>,
    /// Output port definitions
    pub outputs: Vec<PortMetadata>,
    /// Execution mode
    pub execution_mode: ExecutionMode,
}

/// Metadata for a port (input or output)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortMetadata {
    /// Port identifier (used in context keys)
    pub id: String,
    /// Human-readable label
    pub label: String,
    /// Data type
    pub data_type: PortDataType,
    /// Whether this input is required
    pub required: bool,
}

impl PortMetadata {
    /// Create a new port metadata
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        data_type: PortDataType,
        required: bool,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            data_type,
            required,
        }
    }

    /// Create a required port
    pub fn required(
        id: impl Into<String>,
        label: impl Into<String>,
        data_type: PortDataType,
    ) -> Self {
        Self::new(id, label, data_type, true)
    }

    /// Create an optional port
    pub fn optional(
        id: impl Into<String>,
        label: impl Into<String>,
        data_type: PortDataType,
    ) -> Self {
        Self::new(id, label, data_type, false)
    }
}

/// Link-time registration of a node descriptor.
///
/// The wrapped value is a const function pointer so registrations can be
/// submitted from static context:
///
/// ```ignore
/// inventory::submit!(node_core::DescriptorFn(MyNode::descriptor));
/// ```
pub struct DescriptorFn(pub fn() -> NodeMetadata);

inventory::collect!(DescriptorFn);
