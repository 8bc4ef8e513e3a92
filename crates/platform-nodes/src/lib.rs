//! Platform Nodes
//!
//! Adapter nodes that connect a Ferrule flow to the remote ML platform.
//! Each node is a `graph_flow::Task`; incoming units of work trigger a
//! remote call, and the node's editor status indicator tracks the outcome.
//!
//! # Categories
//!
//! - **Processing**: `evaluate` (model invocation), backed by the shared
//!   status reconciler
//! - **Output**: `submit-data` (dataset insertion, also reconciled) and
//!   `single-output`, which unwraps a data element from a nested payload
//! - **Input**: `single-input` wraps a raw payload into a typed parameter

pub mod data;
pub mod dataset;
pub mod model;
pub mod reconcile;

#[cfg(test)]
pub(crate) mod testing;

// Re-export the node types for convenience
pub use data::{SingleInputTask, SingleOutputTask};
pub use dataset::SubmitDataTask;
pub use model::EvaluateTask;
pub use reconcile::{AdapterKind, Reconciler, ResourceRef};
