//! Evaluate Task
//!
//! Runs a batch of named parameters through a platform model and
//! forwards the model's output. A failed evaluation is walked with
//! [`classify`] to surface the component that actually failed.

use std::sync::Arc;

use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Task, TaskResult};
use node_core::{
    ContextKeys, ExecutionMode, NodeCategory, NodeDescriptor, NodeMetadata, NodeStatus,
    PortDataType, PortMetadata, StatusSink,
};
use platform_client::{
    ApiError, EvaluateOutcome, ExecutionError, Parameter, PlatformClient, PlatformError,
    SuccessfulEvaluation,
};
use serde::{Deserialize, Serialize};

use crate::reconcile::{
    classify, describe_failure, AdapterKind, ClassifyError, Reconciler, ResourceRef,
    TEXT_COMM_FAILURE,
};

/// Configuration for the evaluate task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluateConfig {
    /// Model identifier
    pub model_id: Option<String>,
    /// Pin evaluations to a specific model snapshot
    pub snapshot_id: Option<String>,
    /// Credential for the platform, if not supplied per invocation
    pub api_key: Option<String>,
}

/// Errors from one evaluation attempt
#[derive(Debug, thiserror::Error)]
pub enum EvaluateError {
    #[error("No model specified")]
    NoModel,
    #[error("no parameters were provided on input '{0}'")]
    MissingParams(&'static str),
    #[error("the params input is not a list of named parameters: {0}")]
    InvalidParams(#[source] serde_json::Error),
    #[error("the evaluation failed to start, with error: {0}")]
    NotStarted(ApiError),
    /// The evaluation ran and a model component failed
    #[error("{}", describe_failure(.0))]
    Failed(ExecutionError),
    #[error(transparent)]
    Malformed(#[from] ClassifyError),
    #[error(transparent)]
    Platform(PlatformError),
}

/// Evaluate Task
///
/// # Inputs (from context)
/// - `{task_id}.input.params` - Named parameters for the model
/// - `{task_id}.input.model_id` (optional) - Overrides the configured model
/// - `{task_id}.input.snapshot_id` (optional) - Overrides the snapshot pin
/// - `{task_id}.input.api_key` (optional) - Overrides the configured credential
///
/// # Outputs (to context)
/// - `{task_id}.output.output` - The model's output parameters
/// - `{task_id}.output.details` - Execution details (timings etc.)
pub struct EvaluateTask {
    task_id: String,
    config: EvaluateConfig,
    reconciler: Reconciler,
}

impl EvaluateTask {
    /// Port ID for the parameters input
    pub const PORT_PARAMS: &'static str = "params";
    /// Port ID for the model override input
    pub const PORT_MODEL_ID: &'static str = "model_id";
    /// Port ID for the snapshot override input
    pub const PORT_SNAPSHOT_ID: &'static str = "snapshot_id";
    /// Port ID for the credential override input
    pub const PORT_API_KEY: &'static str = "api_key";
    /// Port ID for the model output
    pub const PORT_OUTPUT: &'static str = "output";
    /// Port ID for the execution details output
    pub const PORT_DETAILS: &'static str = "details";

    /// Create an evaluate task for one node
    pub fn new(
        task_id: impl Into<String>,
        config: EvaluateConfig,
        client: Arc<dyn PlatformClient>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        let task_id = task_id.into();
        let reconciler = Reconciler::new(&task_id, AdapterKind::Evaluate, client, sink);
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

    /// Kick off the initial name lookup for the configured model
    ///
    /// Unlike a dataset, a model is required up front, so an
    /// unconfigured node reports the problem immediately.
    pub async fn prime(&self) {
        match self.configured_resource() {
            Some(resource) => {
                self.reconciler
                    .project(NodeStatus::info("Looking for model.."));
                self.reconciler.resolve(&resource).await;
            }
            None => self
                .reconciler
                .project(NodeStatus::error("No model specified")),
        }
    }

    /// The statically configured model reference, if any
    ///
    /// Name resolution always targets this reference. Per-invocation
    /// overrides redirect the evaluation itself, but must not bind the
    /// cached name to a resource the node is not configured for.
    fn configured_resource(&self) -> Option<ResourceRef> {
        let id = self.config.model_id.as_deref().filter(|s| !s.is_empty())?;
        Some(ResourceRef::new(
            id,
            self.config.api_key.clone().filter(|s| !s.is_empty()),
        ))
    }

    /// Evaluate one batch of parameters against the model
    pub async fn evaluate(
        &self,
        context: &Context,
    ) -> Result<SuccessfulEvaluation, EvaluateError> {
        let model_id = match self.effective(context, Self::PORT_MODEL_ID).await {
            Some(id) => id,
            None => match self.config.model_id.as_deref().filter(|s| !s.is_empty()) {
                Some(id) => id.to_string(),
                None => {
                    self.reconciler
                        .project(NodeStatus::error("No model specified"));
                    return Err(EvaluateError::NoModel);
                }
            },
        };
        let snapshot_id = match self.effective(context, Self::PORT_SNAPSHOT_ID).await {
            Some(id) => Some(id),
            None => self.config.snapshot_id.clone().filter(|s| !s.is_empty()),
        };
        let api_key = match self.effective(context, Self::PORT_API_KEY).await {
            Some(key) => Some(key),
            None => self.config.api_key.clone().filter(|s| !s.is_empty()),
        };
        let resource = ResourceRef::new(model_id, api_key);

        let params_key = ContextKeys::input(&self.task_id, Self::PORT_PARAMS);
        let raw: serde_json::Value = match context.get(&params_key).await {
            Some(value) => value,
            None => {
                self.reconciler.project(NodeStatus::error(
                    "Evaluation failed to start: Invalid input",
                ));
                return Err(EvaluateError::MissingParams(Self::PORT_PARAMS));
            }
        };
        let params: Vec<Parameter> = match serde_json::from_value(raw) {
            Ok(params) => params,
            Err(err) => {
                self.reconciler.project(NodeStatus::error(
                    "Evaluation failed to start: Invalid input",
                ));
                return Err(EvaluateError::InvalidParams(err));
            }
        };

        // Resolution targets the configured model, never the override
        let configured = self.configured_resource();
        if let Some(configured) = &configured {
            self.reconciler.resolve(configured).await;
        }

        let guard = self.reconciler.begin_operation();
        let outcome = self
            .reconciler
            .client()
            .evaluate(
                &resource.id,
                &params,
                snapshot_id.as_deref(),
                resource.credential.as_deref(),
            )
            .await;
        drop(guard);

        match outcome {
            Ok(EvaluateOutcome::Success(success)) => {
                let output_key = ContextKeys::output(&self.task_id, Self::PORT_OUTPUT);
                context.set(&output_key, success.output.clone()).await;
                let details_key = ContextKeys::output(&self.task_id, Self::PORT_DETAILS);
                context
                    .set(&details_key, success.execution_details.clone())
                    .await;
                self.reconciler.finish_success(configured.as_ref()).await;
                log::debug!(
                    "EvaluateTask {}: completed with {} output parameters",
                    self.task_id,
                    success.output.len()
                );
                Ok(success)
            }
            Ok(EvaluateOutcome::Failed(failed)) => {
                self.reconciler
                    .project(NodeStatus::error("Evaluation failed"));
                match classify(&failed.execution_details) {
                    Ok(error) => Err(EvaluateError::Failed(error.clone())),
                    Err(err) => Err(EvaluateError::Malformed(err)),
                }
            }
            Err(PlatformError::Api(err)) => {
                self.reconciler
                    .project(NodeStatus::error("Evaluation failed to start"));
                Err(EvaluateError::NotStarted(err))
            }
            Err(err @ PlatformError::InvalidRequest(_)) => {
                self.reconciler.project(NodeStatus::error(
                    "Evaluation failed to start: Invalid input",
                ));
                Err(EvaluateError::Platform(err))
            }
            Err(err @ PlatformError::Transport(_)) => {
                self.reconciler.project(NodeStatus::error(TEXT_COMM_FAILURE));
                Err(EvaluateError::Platform(err))
            }
            Err(err) => {
                self.reconciler
                    .project(NodeStatus::error("Failed to evaluate"));
                Err(EvaluateError::Platform(err))
            }
        }
    }

    async fn effective(&self, context: &Context, port: &str) -> Option<String> {
        let key = ContextKeys::input(&self.task_id, port);
        context
            .get::<String>(&key)
            .await
            .filter(|s| !s.is_empty())
    }
}

impl NodeDescriptor for EvaluateTask {
    fn descriptor() -> NodeMetadata {
        NodeMetadata {
            node_type: "evaluate".to_string(),
            category: NodeCategory::Processing,
            label: "Evaluate".to_string(),
            description: "Runs parameters through a platform model".to_string(),
            inputs: vec![
                PortMetadata::required(Self::PORT_PARAMS, "Parameters", PortDataType::Json),
                PortMetadata::optional(Self::PORT_MODEL_ID, "Model ID", PortDataType::String),
                PortMetadata::optional(
                    Self::PORT_SNAPSHOT_ID,
                    "Snapshot ID",
                    PortDataType::String,
                ),
                PortMetadata::optional(Self::PORT_API_KEY, "API Key", PortDataType::String),
            ],
            outputs: vec![
                PortMetadata::optional(Self::PORT_OUTPUT, "Output", PortDataType::Json),
                PortMetadata::optional(Self::PORT_DETAILS, "Details", PortDataType::Json),
            ],
            execution_mode: ExecutionMode::Batch,
        }
    }
}

#[async_trait]
impl Task for EvaluateTask {
    fn id(&self) -> &str {
        &self.task_id
    }

    async fn run(&self, context: Context) -> graph_flow::Result<TaskResult> {
        let success = self
            .evaluate(&context)
            .await
            .map_err(|err| GraphError::TaskExecutionFailed(err.to_string()))?;
        let response = serde_json::to_string(&success.output)
            .map_err(|err| GraphError::TaskExecutionFailed(err.to_string()))?;
        Ok(TaskResult::new(Some(response), NextAction::Continue))
    }
}

inventory::submit!(node_core::DescriptorFn(EvaluateTask::descriptor));
