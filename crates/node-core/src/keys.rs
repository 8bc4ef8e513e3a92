//! Context key conventions for port values
//!
//! Nodes communicate through the shared graph context, storing inputs and
//! outputs under well-defined key patterns:
//!
//! - Inputs: `{node_id}.input.{port}`
//! - Outputs: `{node_id}.output.{port}`
//! - Metadata: `{node_id}.meta.{field}`

/// Helper for building context keys
pub struct ContextKeys;

impl ContextKeys {
    /// Build an input key: `{node_id}.input.{port}`
    pub fn input(node_id: &str, port: &str) -> String {
        format!("{}.input.{}", node_id, port)
    }

    /// Build an output key: `{node_id}.output.{port}`
    pub fn output(node_id: &str, port: &str) -> String {
        format!("{}.output.{}", node_id, port)
    }

    /// Build a metadata key: `{node_id}.meta.{field}`
    pub fn meta(node_id: &str, field: &str) -> String {
        format!("{}.meta.{}", node_id, field)
    }
}
