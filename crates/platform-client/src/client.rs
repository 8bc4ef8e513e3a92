//! The `PlatformClient` trait and resource description types
//!
//! Nodes depend on this trait rather than on the HTTP implementation, so
//! tests can substitute in-memory fakes with scripted responses.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::data::{DataElement, Parameter};
use crate::error::Result;
use crate::execution::EvaluateOutcome;

/// The two kinds of resources the nodes reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Dataset,
    Model,
}

impl ResourceKind {
    /// Lowercase noun for status text ("dataset" / "model")
    pub fn noun(&self) -> &'static str {
        match self {
            Self::Dataset => "dataset",
            Self::Model => "model",
        }
    }

    /// Capitalized noun for status text ("Dataset" / "Model")
    pub fn title(&self) -> &'static str {
        match self {
            Self::Dataset => "Dataset",
            Self::Model => "Model",
        }
    }
}

/// Access level the credential grants on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessLevel {
    #[serde(rename = "read")]
    Read,
    #[serde(rename = "readwrite")]
    ReadWrite,
}

impl AccessLevel {
    pub fn can_write(&self) -> bool {
        matches!(self, Self::ReadWrite)
    }
}

/// Description of one resource, as returned by a describe lookup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInfo {
    /// Opaque resource identifier
    pub id: String,
    /// Human-readable name
    pub name: String,
    /// Access granted to the caller
    pub access: AccessLevel,
}

/// Typed async access to the remote ML platform
///
/// All methods take the credential per call; the per-invocation override
/// semantics of the nodes mean the effective credential can change between
/// calls on the same client.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// Describe resources by identifier
    ///
    /// Identifiers with no matching resource are simply absent from the
    /// result; that is not an error.
    async fn describe_resources(
        &self,
        kind: ResourceKind,
        ids: &[String],
        credential: Option<&str>,
    ) -> Result<Vec<ResourceInfo>>;

    /// Add entries to a dataset
    async fn add_entries(
        &self,
        dataset_id: &str,
        entries: &[DataElement],
        credential: Option<&str>,
    ) -> Result<serde_json::Value>;

    /// Add entries to a dataset's review queue
    async fn add_entries_to_review(
        &self,
        dataset_id: &str,
        entries: &[DataElement],
        credential: Option<&str>,
    ) -> Result<serde_json::Value>;

    /// Run an evaluation against a model, optionally pinned to a snapshot
    async fn evaluate(
        &self,
        model_id: &str,
        params: &[Parameter],
        snapshot_id: Option<&str>,
        credential: Option<&str>,
    ) -> Result<EvaluateOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_nouns() {
        assert_eq!(ResourceKind::Dataset.noun(), "dataset");
        assert_eq!(ResourceKind::Model.title(), "Model");
    }

    #[test]
    fn test_access_level_wire_names() {
        let access: AccessLevel = serde_json::from_str("\"readwrite\"").unwrap();
        assert!(access.can_write());

        let access: AccessLevel = serde_json::from_str("\"read\"").unwrap();
        assert!(!access.can_write());
    }

    #[test]
    fn test_resource_info_deserialization() {
        let info: ResourceInfo = serde_json::from_str(
            r#"{"id":"d6f8f9a0-0000-0000-0000-000000000000","name":"Sensor readings","access":"readwrite"}"#,
        )
        .unwrap();
        assert_eq!(info.name, "Sensor readings");
        assert!(info.access.can_write());
    }
}
