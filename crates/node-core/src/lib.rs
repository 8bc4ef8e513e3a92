//! Node Core - Shared contracts for Ferrule flow-editor adapter nodes
//!
//! This crate defines everything the editor and the node implementations
//! agree on, without pulling in any node's runtime dependencies:
//!
//! - Node and port metadata (`NodeMetadata`, `PortMetadata`) with link-time
//!   collection via `inventory`
//! - The `NodeRegistry` for palette listing and type lookup
//! - `ContextKeys` conventions for port values in the shared context
//! - The `StatusSink` abstraction for the per-node status indicator
//! - The shared `NodeCoreError` type

pub mod descriptor;
pub mod error;
pub mod keys;
pub mod registry;
pub mod status;
pub mod types;

// Re-export key types
pub use descriptor::{DescriptorFn, NodeDescriptor, NodeMetadata, PortMetadata};
pub use error::{NodeCoreError, Result};
pub use keys::ContextKeys;
pub use registry::NodeRegistry;
pub use status::{
    NodeStatus, NullStatusSink, StatusError, StatusSeverity, StatusSink, StatusUpdate,
    VecStatusSink,
};
pub use types::{ExecutionMode, NodeCategory, PortDataType};
