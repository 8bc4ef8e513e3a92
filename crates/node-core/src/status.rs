//! Per-node status indicator reporting
//!
//! Every node owns a small colored indicator in the editor with a short
//! text label. Status updates are pushed through a [`StatusSink`], which
//! abstracts over the transport (editor channel, mpsc, etc.). The display
//! is last-write-wins per node.

use serde::{Deserialize, Serialize};

/// Severity of a status update, rendered as the indicator color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusSeverity {
    /// Informational / in progress (blue)
    Info,
    /// Ready for the next unit of work (green)
    Ready,
    /// Something went wrong (red)
    Error,
}

/// A status tuple shown next to a node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeStatus {
    /// Indicator color
    pub severity: StatusSeverity,
    /// Short human-readable label
    pub text: String,
}

impl NodeStatus {
    /// Create an informational status
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            severity: StatusSeverity::Info,
            text: text.into(),
        }
    }

    /// Create a ready status
    pub fn ready(text: impl Into<String>) -> Self {
        Self {
            severity: StatusSeverity::Ready,
            text: text.into(),
        }
    }

    /// Create an error status
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            severity: StatusSeverity::Error,
            text: text.into(),
        }
    }
}

/// A status update addressed to one node's indicator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    /// The node whose indicator should change
    pub node_id: String,
    /// The new status
    pub status: NodeStatus,
}

/// Error when delivering a status update fails
#[derive(Debug, Clone)]
pub struct StatusError {
    pub message: String,
}

impl std::fmt::Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Status error: {}", self.message)
    }
}

impl std::error::Error for StatusError {}

impl StatusError {
    pub fn channel_closed() -> Self {
        Self {
            message: "Channel closed".to_string(),
        }
    }
}

/// Trait for delivering node status updates
///
/// This abstracts over the transport mechanism, allowing nodes to be
/// used in different host contexts.
pub trait StatusSink: Send + Sync {
    /// Set the status of a node's indicator
    ///
    /// Returns an error if the update could not be delivered (e.g.,
    /// channel closed).
    fn set(&self, update: StatusUpdate) -> Result<(), StatusError>;
}

/// A no-op status sink that discards all updates
///
/// Useful for testing or when the indicator isn't rendered.
pub struct NullStatusSink;

impl StatusSink for NullStatusSink {
    fn set(&self, _update: StatusUpdate) -> Result<(), StatusError> {
        Ok(())
    }
}

/// A vector-based status sink that collects updates
///
/// Useful for testing to verify emissions and last-write-wins behavior.
pub struct VecStatusSink {
    updates: std::sync::Mutex<Vec<StatusUpdate>>,
}

impl VecStatusSink {
    pub fn new() -> Self {
        Self {
            updates: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Get all collected updates in delivery order
    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates.lock().unwrap().clone()
    }

    /// Get the currently visible status for a node (last write wins)
    pub fn current(&self, node_id: &str) -> Option<NodeStatus> {
        self.updates
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|u| u.node_id == node_id)
            .map(|u| u.status.clone())
    }

    /// Clear all collected updates
    pub fn clear(&self) {
        self.updates.lock().unwrap().clear();
    }
}

impl Default for VecStatusSink {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusSink for VecStatusSink {
    fn set(&self, update: StatusUpdate) -> Result<(), StatusError> {
        self.updates.lock().unwrap().push(update);
        Ok(())
    }
}
