//! Submit Data Task
//!
//! Appends a batch of data elements to a platform dataset. The node's
//! status display tracks both the memoized dataset-name lookup and the
//! submission itself through a [`Reconciler`].

use std::sync::Arc;

use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Task, TaskResult};
use node_core::{
    ContextKeys, ExecutionMode, NodeCategory, NodeDescriptor, NodeMetadata, NodeStatus,
    PortDataType, PortMetadata, StatusSink,
};
use platform_client::{ApiError, DataElement, PlatformClient, PlatformError};
use serde::{Deserialize, Serialize};

use crate::reconcile::{AdapterKind, Reconciler, ResourceRef, TEXT_COMM_FAILURE};

/// Configuration for the submit-data task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitDataConfig {
    /// Target dataset identifier
    pub dataset_id: Option<String>,
    /// Credential for the platform, if not supplied per invocation
    pub api_key: Option<String>,
    /// Route entries through the needs-review queue (on when unset)
    pub needs_review: Option<bool>,
}

/// Errors from one submission attempt
#[derive(Debug, thiserror::Error)]
pub enum SubmitDataError {
    #[error("No dataset specified")]
    NoDataset,
    #[error("no entries were provided on input '{0}'")]
    MissingEntries(&'static str),
    #[error("the entries input is not a list of data elements: {0}")]
    InvalidEntries(#[source] serde_json::Error),
    #[error("Got zero entries to add")]
    EmptyBatch,
    #[error("the add entries call failed, with error: {0}")]
    Rejected(ApiError),
    #[error("the add entries to review call failed, with error: {0}")]
    ReviewRejected(ApiError),
    #[error(transparent)]
    Platform(PlatformError),
}

/// Submit Data Task
///
/// # Inputs (from context)
/// - `{task_id}.input.entries` - The batch of data elements to append
/// - `{task_id}.input.dataset_id` (optional) - Overrides the configured dataset
/// - `{task_id}.input.api_key` (optional) - Overrides the configured credential
/// - `{task_id}.input.needs_review` (optional) - Overrides the review routing
///
/// # Outputs (to context)
/// - `{task_id}.output.result` - The platform's response to the append
pub struct SubmitDataTask {
    task_id: String,
    config: SubmitDataConfig,
    reconciler: Reconciler,
}

impl SubmitDataTask {
    /// Port ID for the entries input
    pub const PORT_ENTRIES: &'static str = "entries";
    /// Port ID for the dataset override input
    pub const PORT_DATASET_ID: &'static str = "dataset_id";
    /// Port ID for the credential override input
    pub const PORT_API_KEY: &'static str = "api_key";
    /// Port ID for the review-routing override input
    pub const PORT_NEEDS_REVIEW: &'static str = "needs_review";
    /// Port ID for the result output
    pub const PORT_RESULT: &'static str = "result";

    /// Create a submit-data task for one node
    pub fn new(
        task_id: impl Into<String>,
        config: SubmitDataConfig,
        client: Arc<dyn PlatformClient>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        let task_id = task_id.into();
        let reconciler = Reconciler::new(&task_id, AdapterKind::SubmitData, client, sink);
        Self {
            task_id,
            config,
            reconciler,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    pub(crate) fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Kick off the initial name lookup for a configured dataset
    ///
    /// Called once when the node comes up; unconfigured nodes stay
    /// blank until a trigger supplies the dataset.
    pub async fn prime(&self) {
        if let Some(resource) = self.configured_resource() {
            self.reconciler
                .project(NodeStatus::info("Looking for dataset.."));
            self.reconciler.resolve(&resource).await;
        }
    }

    /// The statically configured dataset reference, if any
    ///
    /// Name resolution always targets this reference. Per-invocation
    /// overrides redirect the append itself, but must not bind the
    /// cached name to a resource the node is not configured for.
    fn configured_resource(&self) -> Option<ResourceRef> {
        let id = self.config.dataset_id.as_deref().filter(|s| !s.is_empty())?;
        Some(ResourceRef::new(
            id,
            self.config.api_key.clone().filter(|s| !s.is_empty()),
        ))
    }

    /// Append one batch of entries to the dataset
    ///
    /// The full operational core of the node: resolves inputs and
    /// overrides, performs the remote append and drives the status
    /// display through every outcome.
    pub async fn submit(&self, context: &Context) -> Result<serde_json::Value, SubmitDataError> {
        let dataset_id = match self.effective(context, Self::PORT_DATASET_ID).await {
            Some(id) => id,
            None => match self.config.dataset_id.as_deref().filter(|s| !s.is_empty()) {
                Some(id) => id.to_string(),
                None => {
                    self.reconciler
                        .project(NodeStatus::error("No dataset specified"));
                    return Err(SubmitDataError::NoDataset);
                }
            },
        };
        let api_key = match self.effective(context, Self::PORT_API_KEY).await {
            Some(key) => Some(key),
            None => self.config.api_key.clone().filter(|s| !s.is_empty()),
        };
        let resource = ResourceRef::new(dataset_id, api_key);

        let entries_key = ContextKeys::input(&self.task_id, Self::PORT_ENTRIES);
        let raw: serde_json::Value = match context.get(&entries_key).await {
            Some(value) => value,
            None => {
                self.reconciler
                    .project(NodeStatus::error("Failed to add data: Invalid input"));
                return Err(SubmitDataError::MissingEntries(Self::PORT_ENTRIES));
            }
        };
        let entries: Vec<DataElement> = match serde_json::from_value(raw) {
            Ok(entries) => entries,
            Err(err) => {
                self.reconciler
                    .project(NodeStatus::error("Failed to add data: Invalid input"));
                return Err(SubmitDataError::InvalidEntries(err));
            }
        };
        if entries.is_empty() {
            self.reconciler.project(NodeStatus::error(
                "Failed to add data: Got zero entries to add",
            ));
            return Err(SubmitDataError::EmptyBatch);
        }

        let needs_review_key = ContextKeys::input(&self.task_id, Self::PORT_NEEDS_REVIEW);
        let needs_review: bool = match context.get(&needs_review_key).await {
            Some(value) => value,
            None => self.config.needs_review.unwrap_or(true),
        };

        // Resolution targets the configured dataset, never the override;
        // a memoized no-op once the name is known or lookups are suppressed
        let configured = self.configured_resource();
        if let Some(configured) = &configured {
            self.reconciler.resolve(configured).await;
        }

        let guard = self.reconciler.begin_operation();
        let outcome = if needs_review {
            self.reconciler
                .client()
                .add_entries_to_review(&resource.id, &entries, resource.credential.as_deref())
                .await
        } else {
            self.reconciler
                .client()
                .add_entries(&resource.id, &entries, resource.credential.as_deref())
                .await
        };
        drop(guard);

        match outcome {
            Ok(result) => {
                let result_key = ContextKeys::output(&self.task_id, Self::PORT_RESULT);
                context.set(&result_key, result.clone()).await;
                self.reconciler.finish_success(configured.as_ref()).await;
                log::debug!(
                    "SubmitDataTask {}: appended {} entries",
                    self.task_id,
                    entries.len()
                );
                Ok(result)
            }
            Err(PlatformError::Api(err)) => {
                let text = if err.is_not_found() {
                    "Add data failed: Dataset not found".to_string()
                } else {
                    format!("Add data failed: {}", err)
                };
                self.reconciler.project(NodeStatus::error(text));
                Err(if needs_review {
                    SubmitDataError::ReviewRejected(err)
                } else {
                    SubmitDataError::Rejected(err)
                })
            }
            Err(err @ PlatformError::InvalidRequest(_)) => {
                self.reconciler
                    .project(NodeStatus::error("Failed to add data: Invalid input"));
                Err(SubmitDataError::Platform(err))
            }
            Err(err @ PlatformError::Transport(_)) => {
                self.reconciler.project(NodeStatus::error(TEXT_COMM_FAILURE));
                Err(SubmitDataError::Platform(err))
            }
            Err(err) => {
                self.reconciler
                    .project(NodeStatus::error("Failed to add data"));
                Err(SubmitDataError::Platform(err))
            }
        }
    }

    /// Non-empty string override from the given input port
    async fn effective(&self, context: &Context, port: &str) -> Option<String> {
        let key = ContextKeys::input(&self.task_id, port);
        context
            .get::<String>(&key)
            .await
            .filter(|s| !s.is_empty())
    }
}

impl NodeDescriptor for SubmitDataTask {
    fn descriptor() -> NodeMetadata {
        NodeMetadata {
            node_type: "submit-data".to_string(),
            category: NodeCategory::Output,
            label: "Submit Data".to_string(),
            description: "Appends data elements to a platform dataset".to_string(),
            inputs: vec![
                PortMetadata::required(Self::PORT_ENTRIES, "Entries", PortDataType::Json),
                PortMetadata::optional(Self::PORT_DATASET_ID, "Dataset ID", PortDataType::String),
                PortMetadata::optional(Self::PORT_API_KEY, "API Key", PortDataType::String),
                PortMetadata::optional(
                    Self::PORT_NEEDS_REVIEW,
                    "Needs Review",
                    PortDataType::Boolean,
                ),
            ],
            outputs: vec![PortMetadata::optional(
                Self::PORT_RESULT,
                "Result",
                PortDataType::Json,
            )],
            execution_mode: ExecutionMode::Batch,
        }
    }
}

#[async_trait]
impl Task for SubmitDataTask {
    fn id(&self) -> &str {
        &self.task_id
    }

    async fn run(&self, context: Context) -> graph_flow::Result<TaskResult> {
        let result = self
            .submit(&context)
            .await
            .map_err(|err| GraphError::TaskExecutionFailed(err.to_string()))?;
        Ok(TaskResult::new(Some(result.to_string()), NextAction::Continue))
    }
}

inventory::submit!(node_core::DescriptorFn(SubmitDataTask::descriptor));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockClient;
    use node_core::{StatusSeverity, VecStatusSink};
    use platform_client::{AccessLevel, ResourceKind};
    use serde_json::json;

    const DATASET_ID: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";

    fn task(config: SubmitDataConfig) -> (SubmitDataTask, Arc<MockClient>, Arc<VecStatusSink>) {
        let client = MockClient::new();
        let sink = Arc::new(VecStatusSink::new());
        let task = SubmitDataTask::new(
            "submit1",
            config,
            client.clone() as Arc<dyn PlatformClient>,
            sink.clone() as Arc<dyn StatusSink>,
        );
        (task, client, sink)
    }

    fn configured() -> SubmitDataConfig {
        SubmitDataConfig {
            dataset_id: Some(DATASET_ID.to_string()),
            api_key: Some("key".to_string()),
            needs_review: Some(false),
        }
    }

    async fn context_with_entries(task_id: &str, entries: serde_json::Value) -> Context {
        let context = Context::new();
        let key = ContextKeys::input(task_id, SubmitDataTask::PORT_ENTRIES);
        context.set(&key, entries).await;
        context
    }

    fn one_entry() -> serde_json::Value {
        json!([{"type": "string", "value": "hello"}])
    }

    #[tokio::test]
    async fn test_successful_submission() {
        let (task, client, sink) = task(configured());
        client.push_describe(Ok(vec![MockClient::resource(
            DATASET_ID,
            "Sensor readings",
            AccessLevel::ReadWrite,
        )]));
        client.push_add(Ok(json!({"appended": 1})));
        let context = context_with_entries("submit1", one_entry()).await;

        let result = task.submit(&context).await.unwrap();
        assert_eq!(result, json!({"appended": 1}));

        assert_eq!(client.add_call_count(), 1);
        assert_eq!(client.review_call_count(), 0);
        let (dataset, entries, credential) = client.last_add.lock().unwrap().clone().unwrap();
        assert_eq!(dataset, DATASET_ID);
        assert_eq!(entries, vec![DataElement::String("hello".to_string())]);
        assert_eq!(credential.as_deref(), Some("key"));

        let output_key = ContextKeys::output("submit1", SubmitDataTask::PORT_RESULT);
        let stored: serde_json::Value = context.get(&output_key).await.unwrap();
        assert_eq!(stored, json!({"appended": 1}));

        assert_eq!(
            sink.current("submit1").unwrap().text,
            "Ready to add data to \"Sensor readings\""
        );
    }

    #[tokio::test]
    async fn test_review_routing_is_the_default() {
        let (task, client, _sink) = task(SubmitDataConfig {
            dataset_id: Some(DATASET_ID.to_string()),
            api_key: None,
            needs_review: None,
        });
        let context = context_with_entries("submit1", one_entry()).await;

        task.submit(&context).await.unwrap();
        assert_eq!(client.review_call_count(), 1);
        assert_eq!(client.add_call_count(), 0);
    }

    #[tokio::test]
    async fn test_review_override_from_input() {
        let (task, client, _sink) = task(configured());
        let context = context_with_entries("submit1", one_entry()).await;
        let key = ContextKeys::input("submit1", SubmitDataTask::PORT_NEEDS_REVIEW);
        context.set(&key, true).await;

        task.submit(&context).await.unwrap();
        assert_eq!(client.review_call_count(), 1);
        assert_eq!(client.add_call_count(), 0);
    }

    #[tokio::test]
    async fn test_no_dataset_specified() {
        let (task, client, sink) = task(SubmitDataConfig::default());
        let context = context_with_entries("submit1", one_entry()).await;

        let err = task.submit(&context).await.unwrap_err();
        assert!(matches!(err, SubmitDataError::NoDataset));
        assert_eq!(client.add_call_count(), 0);
        assert_eq!(client.review_call_count(), 0);
        let status = sink.current("submit1").unwrap();
        assert_eq!(status.severity, StatusSeverity::Error);
        assert_eq!(status.text, "No dataset specified");
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected_before_the_remote_call() {
        let (task, client, sink) = task(configured());
        let context = context_with_entries("submit1", json!([])).await;

        let err = task.submit(&context).await.unwrap_err();
        assert!(matches!(err, SubmitDataError::EmptyBatch));
        assert_eq!(client.add_call_count(), 0);
        assert_eq!(
            sink.current("submit1").unwrap().text,
            "Failed to add data: Got zero entries to add"
        );
    }

    #[tokio::test]
    async fn test_missing_entries_input() {
        let (task, _client, sink) = task(configured());
        let context = Context::new();

        let err = task.submit(&context).await.unwrap_err();
        assert!(matches!(err, SubmitDataError::MissingEntries(_)));
        assert_eq!(
            sink.current("submit1").unwrap().text,
            "Failed to add data: Invalid input"
        );
    }

    #[tokio::test]
    async fn test_malformed_entries_input() {
        let (task, client, _sink) = task(configured());
        let context =
            context_with_entries("submit1", json!([{"type": "no-such-kind", "value": 1}])).await;

        let err = task.submit(&context).await.unwrap_err();
        assert!(matches!(err, SubmitDataError::InvalidEntries(_)));
        assert_eq!(client.add_call_count(), 0);
    }

    #[tokio::test]
    async fn test_dataset_not_found_status() {
        let (task, client, sink) = task(configured());
        client.push_describe(Ok(vec![MockClient::resource(
            DATASET_ID,
            "Sensor readings",
            AccessLevel::ReadWrite,
        )]));
        client.push_add(Err(PlatformError::Api(ApiError::new("dataset_not_found"))));
        let context = context_with_entries("submit1", one_entry()).await;

        let err = task.submit(&context).await.unwrap_err();
        assert!(matches!(err, SubmitDataError::Rejected(_)));
        assert_eq!(
            sink.current("submit1").unwrap().text,
            "Add data failed: Dataset not found"
        );
        assert!(!task.reconciler().is_in_flight());
    }

    #[tokio::test]
    async fn test_review_rejection_is_distinguished() {
        let (task, client, sink) = task(SubmitDataConfig {
            dataset_id: Some(DATASET_ID.to_string()),
            api_key: Some("key".to_string()),
            needs_review: Some(true),
        });
        client.push_describe(Ok(vec![]));
        client.push_review(Err(PlatformError::Api(ApiError::new("quota_exceeded"))));
        let context = context_with_entries("submit1", one_entry()).await;

        let err = task.submit(&context).await.unwrap_err();
        assert!(matches!(err, SubmitDataError::ReviewRejected(_)));
        assert_eq!(
            sink.current("submit1").unwrap().text,
            "Add data failed: quota_exceeded"
        );
    }

    #[tokio::test]
    async fn test_transport_failure_status() {
        let (task, client, sink) = task(configured());
        client.push_describe(Ok(vec![]));
        client.push_add(Err(PlatformError::Transport("timed out".to_string())));
        let context = context_with_entries("submit1", one_entry()).await;

        let err = task.submit(&context).await.unwrap_err();
        assert!(matches!(err, SubmitDataError::Platform(_)));
        assert_eq!(sink.current("submit1").unwrap().text, TEXT_COMM_FAILURE);
    }

    #[tokio::test]
    async fn test_input_overrides_take_precedence() {
        let (task, client, _sink) = task(configured());
        let other = "aaaaaaaa-0000-0000-0000-000000000000";
        let context = context_with_entries("submit1", one_entry()).await;
        let id_key = ContextKeys::input("submit1", SubmitDataTask::PORT_DATASET_ID);
        context.set(&id_key, other.to_string()).await;
        let key_key = ContextKeys::input("submit1", SubmitDataTask::PORT_API_KEY);
        context.set(&key_key, "override-key".to_string()).await;

        task.submit(&context).await.unwrap();
        let (dataset, _, credential) = client.last_add.lock().unwrap().clone().unwrap();
        assert_eq!(dataset, other);
        assert_eq!(credential.as_deref(), Some("override-key"));
    }

    #[tokio::test]
    async fn test_override_does_not_bind_the_name_cache() {
        // Resolution sticks to the configured dataset even when an
        // invocation redirects the append elsewhere
        let (task, client, sink) = task(configured());
        client.push_describe(Ok(vec![MockClient::resource(
            DATASET_ID,
            "Primary set",
            AccessLevel::ReadWrite,
        )]));
        let other = "aaaaaaaa-0000-0000-0000-000000000000";
        let context = context_with_entries("submit1", one_entry()).await;
        let id_key = ContextKeys::input("submit1", SubmitDataTask::PORT_DATASET_ID);
        context.set(&id_key, other.to_string()).await;

        task.submit(&context).await.unwrap();

        let (_, ids, _) = client.last_describe.lock().unwrap().clone().unwrap();
        assert_eq!(ids, vec![DATASET_ID.to_string()]);
        assert_eq!(task.reconciler().cached_name().as_deref(), Some("Primary set"));
        assert_eq!(
            sink.current("submit1").unwrap().text,
            "Ready to add data to \"Primary set\""
        );
    }

    #[tokio::test]
    async fn test_override_only_invocation_never_resolves() {
        // With no configured dataset there is nothing to name
        let (task, client, sink) = task(SubmitDataConfig::default());
        let context = context_with_entries("submit1", one_entry()).await;
        let id_key = ContextKeys::input("submit1", SubmitDataTask::PORT_DATASET_ID);
        context.set(&id_key, DATASET_ID.to_string()).await;

        task.submit(&context).await.unwrap();

        assert_eq!(client.describe_call_count(), 0);
        assert!(task.reconciler().cached_name().is_none());
        assert_eq!(sink.current("submit1").unwrap().text, "Ready to add data");
    }

    #[tokio::test]
    async fn test_empty_string_override_is_ignored() {
        let (task, client, _sink) = task(configured());
        let context = context_with_entries("submit1", one_entry()).await;
        let id_key = ContextKeys::input("submit1", SubmitDataTask::PORT_DATASET_ID);
        context.set(&id_key, String::new()).await;

        task.submit(&context).await.unwrap();
        let (dataset, _, _) = client.last_add.lock().unwrap().clone().unwrap();
        assert_eq!(dataset, DATASET_ID);
    }

    #[tokio::test]
    async fn test_prime_looks_up_the_configured_dataset() {
        let (task, client, sink) = task(configured());
        client.push_describe(Ok(vec![MockClient::resource(
            DATASET_ID,
            "Sensor readings",
            AccessLevel::ReadWrite,
        )]));

        task.prime().await;

        let updates = sink.updates();
        assert_eq!(updates[0].status.text, "Looking for dataset..");
        assert_eq!(
            sink.current("submit1").unwrap().text,
            "Ready to add data to \"Sensor readings\""
        );
        let (kind, ids, _) = client.last_describe.lock().unwrap().clone().unwrap();
        assert_eq!(kind, ResourceKind::Dataset);
        assert_eq!(ids, vec![DATASET_ID.to_string()]);
    }

    #[tokio::test]
    async fn test_prime_is_a_no_op_without_configuration() {
        let (task, client, sink) = task(SubmitDataConfig::default());
        task.prime().await;
        assert_eq!(client.describe_call_count(), 0);
        assert!(sink.updates().is_empty());
    }

    #[tokio::test]
    async fn test_run_maps_errors_to_task_failures() {
        let (task, _client, _sink) = task(SubmitDataConfig::default());
        let context = Context::new();

        let err = task.run(context).await.unwrap_err();
        match err {
            GraphError::TaskExecutionFailed(message) => {
                assert_eq!(message, "No dataset specified")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_descriptor_shape() {
        let meta = SubmitDataTask::descriptor();
        assert_eq!(meta.node_type, "submit-data");
        assert_eq!(meta.category, NodeCategory::Output);
        assert!(meta.inputs.iter().any(|p| p.id == "entries" && p.required));
    }
}
