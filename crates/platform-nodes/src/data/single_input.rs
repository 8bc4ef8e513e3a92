//! Single Input Task
//!
//! Wraps a single raw payload into a one-element parameter list of the
//! requested kind, ready to be fed to an evaluation or a dataset append.

use std::sync::Arc;

use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Task, TaskResult};
use node_core::{
    ContextKeys, ExecutionMode, NodeCategory, NodeDescriptor, NodeMetadata, NodeStatus,
    PortDataType, PortMetadata, StatusSink, StatusUpdate,
};
use platform_client::{DataElement, ElementError, Parameter};
use serde::{Deserialize, Serialize};

/// Configuration for the single-input task
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleInputConfig {
    /// Element kind to produce, one of [`platform_client::ELEMENT_KINDS`]
    pub data_type: Option<String>,
    /// Name of the produced parameter
    pub parameter_name: Option<String>,
}

/// Errors from one conversion
#[derive(Debug, thiserror::Error)]
pub enum SingleInputError {
    #[error("Data type not specified")]
    NoDataType,
    #[error("Parameter name not specified")]
    NoParameterName,
    #[error("no payload was provided on input '{0}'")]
    MissingPayload(&'static str),
    #[error(transparent)]
    Element(#[from] ElementError),
}

/// Single Input Task
///
/// # Inputs (from context)
/// - `{task_id}.input.value` - The raw payload to wrap
/// - `{task_id}.input.data_type` (optional) - Overrides the configured kind
/// - `{task_id}.input.parameter_name` (optional) - Overrides the parameter name
///
/// # Outputs (to context)
/// - `{task_id}.output.params` - A one-element parameter list
pub struct SingleInputTask {
    task_id: String,
    config: SingleInputConfig,
    sink: Arc<dyn StatusSink>,
}

impl SingleInputTask {
    /// Port ID for the raw payload input
    pub const PORT_VALUE: &'static str = "value";
    /// Port ID for the kind override input
    pub const PORT_DATA_TYPE: &'static str = "data_type";
    /// Port ID for the parameter-name override input
    pub const PORT_PARAMETER_NAME: &'static str = "parameter_name";
    /// Port ID for the parameter-list output
    pub const PORT_PARAMS: &'static str = "params";

    /// Create a single-input task for one node
    pub fn new(
        task_id: impl Into<String>,
        config: SingleInputConfig,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            config,
            sink,
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    fn project(&self, status: NodeStatus) {
        let update = StatusUpdate {
            node_id: self.task_id.clone(),
            status,
        };
        if let Err(err) = self.sink.set(update) {
            log::warn!("status update for node {} dropped: {}", self.task_id, err);
        }
    }

    /// Wrap one payload into a parameter list
    pub async fn convert(&self, context: &Context) -> Result<Vec<Parameter>, SingleInputError> {
        let kind = match self.effective(context, Self::PORT_DATA_TYPE).await {
            Some(kind) => kind,
            None => match self.config.data_type.as_deref().filter(|s| !s.is_empty()) {
                Some(kind) => kind.to_string(),
                None => {
                    self.project(NodeStatus::error("Data type not specified"));
                    return Err(SingleInputError::NoDataType);
                }
            },
        };
        let name = match self.effective(context, Self::PORT_PARAMETER_NAME).await {
            Some(name) => name,
            None => match self
                .config
                .parameter_name
                .as_deref()
                .filter(|s| !s.is_empty())
            {
                Some(name) => name.to_string(),
                None => {
                    self.project(NodeStatus::error("Parameter name not specified"));
                    return Err(SingleInputError::NoParameterName);
                }
            },
        };

        let value_key = ContextKeys::input(&self.task_id, Self::PORT_VALUE);
        let value: serde_json::Value = context
            .get(&value_key)
            .await
            .ok_or(SingleInputError::MissingPayload(Self::PORT_VALUE))?;

        let element = DataElement::from_json(&kind, &value)?;
        let params = vec![Parameter::new(name, element)];

        let params_key = ContextKeys::output(&self.task_id, Self::PORT_PARAMS);
        context.set(&params_key, params.clone()).await;
        Ok(params)
    }

    async fn effective(&self, context: &Context, port: &str) -> Option<String> {
        let key = ContextKeys::input(&self.task_id, port);
        context
            .get::<String>(&key)
            .await
            .filter(|s| !s.is_empty())
    }
}

impl NodeDescriptor for SingleInputTask {
    fn descriptor() -> NodeMetadata {
        NodeMetadata {
            node_type: "single-input".to_string(),
            category: NodeCategory::Input,
            label: "Single Input".to_string(),
            description: "Wraps one value into a typed parameter list".to_string(),
            inputs: vec![
                PortMetadata::required(Self::PORT_VALUE, "Value", PortDataType::Any),
                PortMetadata::optional(Self::PORT_DATA_TYPE, "Data Type", PortDataType::String),
                PortMetadata::optional(
                    Self::PORT_PARAMETER_NAME,
                    "Parameter Name",
                    PortDataType::String,
                ),
            ],
            outputs: vec![PortMetadata::optional(
                Self::PORT_PARAMS,
                "Parameters",
                PortDataType::Json,
            )],
            execution_mode: ExecutionMode::Reactive,
        }
    }
}

#[async_trait]
impl Task for SingleInputTask {
    fn id(&self) -> &str {
        &self.task_id
    }

    async fn run(&self, context: Context) -> graph_flow::Result<TaskResult> {
        let params = self
            .convert(&context)
            .await
            .map_err(|err| GraphError::TaskExecutionFailed(err.to_string()))?;
        let response = serde_json::to_string(&params)
            .map_err(|err| GraphError::TaskExecutionFailed(err.to_string()))?;
        Ok(TaskResult::new(Some(response), NextAction::Continue))
    }
}

inventory::submit!(node_core::DescriptorFn(SingleInputTask::descriptor));
