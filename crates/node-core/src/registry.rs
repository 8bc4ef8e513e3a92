//! Node type registry for palette listing and type lookup
//!
//! Maps node type strings to their metadata. Built-in nodes register
//! their descriptors via `inventory`, so [`NodeRegistry::with_builtins`]
//! picks up every node crate linked into the final binary.

use std::collections::HashMap;

use crate::descriptor::{DescriptorFn, NodeMetadata};
use crate::types::NodeCategory;

/// Registry of node types with their metadata
pub struct NodeRegistry {
    entries: HashMap<String, NodeMetadata>,
}

impl NodeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Create a registry pre-populated with all link-time registered nodes
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        for descriptor in inventory::iter::<DescriptorFn> {
            registry.register((descriptor.0)());
        }
        registry
    }

    /// Register a node type
    ///
    /// If the node type is already registered, the entry is replaced.
    pub fn register(&mut self, metadata: NodeMetadata) {
        self.entries.insert(metadata.node_type.clone(), metadata);
    }

    /// Get metadata for a node type
    pub fn get_metadata(&self, node_type: &str) -> Option<&NodeMetadata> {
        self.entries.get(node_type)
    }

    /// Get all registered metadata
    pub fn all_metadata(&self) -> Vec<&NodeMetadata> {
        self.entries.values().collect()
    }

    /// Get metadata grouped by category
    pub fn metadata_by_category(&self) -> HashMap<NodeCategory, Vec<&NodeMetadata>> {
        let mut grouped: HashMap<NodeCategory, Vec<&NodeMetadata>> = HashMap::new();
        for entry in self.entries.values() {
            grouped.entry(entry.category).or_default().push(entry);
        }
        grouped
    }

    /// Check if a node type is registered
    pub fn has_node_type(&self, node_type: &str) -> bool {
        self.entries.contains_key(node_type)
    }

    /// List all registered node type strings
    pub fn node_types(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    /// Merge another registry into this one
    ///
    /// Entries from `other` override entries in `self` if they share the
    /// same node_type.
    pub fn merge(&mut self, other: NodeRegistry) {
        self.entries.extend(other.entries);
    }
}

impl Default for NodeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
