//! Single Output Task
//!
//! Finds the first typed data element inside a nested payload and
//! unwraps it into a plain value plus its kind label. Model outputs
//! arrive as parameter lists of varying shape, so the search walks the
//! payload structurally instead of assuming one.

use async_trait::async_trait;
use graph_flow::{Context, GraphError, NextAction, Task, TaskResult};
use node_core::{
    ContextKeys, ExecutionMode, NodeCategory, NodeDescriptor, NodeMetadata, PortDataType,
    PortMetadata,
};
use platform_client::DataElement;

/// How deep into the payload the element search descends
const MAX_SCAN_DEPTH: usize = 5;

/// Errors from one extraction
#[derive(Debug, thiserror::Error)]
pub enum SingleOutputError {
    #[error("no payload was provided on input '{0}'")]
    MissingPayload(&'static str),
    #[error("No data element found in the payload")]
    NoElement,
}

/// Single Output Task
///
/// # Inputs (from context)
/// - `{task_id}.input.payload` - Any payload that may contain a typed element
///
/// # Outputs (to context)
/// - `{task_id}.output.value` - The unwrapped plain value
/// - `{task_id}.output.data_type` - The element's kind label
pub struct SingleOutputTask {
    task_id: String,
}

impl SingleOutputTask {
    /// Port ID for the payload input
    pub const PORT_PAYLOAD: &'static str = "payload";
    /// Port ID for the unwrapped value output
    pub const PORT_VALUE: &'static str = "value";
    /// Port ID for the kind label output
    pub const PORT_DATA_TYPE: &'static str = "data_type";

    /// Create a single-output task for one node
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }

    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Extract the first typed element from the payload
    pub async fn extract(&self, context: &Context) -> Result<DataElement, SingleOutputError> {
        let payload_key = ContextKeys::input(&self.task_id, Self::PORT_PAYLOAD);
        let payload: serde_json::Value = context
            .get(&payload_key)
            .await
            .ok_or(SingleOutputError::MissingPayload(Self::PORT_PAYLOAD))?;

        let element = scan(&payload, MAX_SCAN_DEPTH).ok_or(SingleOutputError::NoElement)?;

        let value_key = ContextKeys::output(&self.task_id, Self::PORT_VALUE);
        context.set(&value_key, element.to_plain()).await;
        let kind_key = ContextKeys::output(&self.task_id, Self::PORT_DATA_TYPE);
        context.set(&kind_key, element.kind().to_string()).await;
        Ok(element)
    }
}

/// Depth-first search for the first value shaped like a data element
///
/// A node that parses as an element wins immediately; otherwise object
/// members and array items are visited in order with one less depth to
/// spend.
fn scan(value: &serde_json::Value, depth: usize) -> Option<DataElement> {
    if let Ok(element) = serde_json::from_value::<DataElement>(value.clone()) {
        return Some(element);
    }
    if depth == 0 {
        return None;
    }
    match value {
        serde_json::Value::Array(items) => {
            items.iter().find_map(|item| scan(item, depth - 1))
        }
        serde_json::Value::Object(members) => {
            members.values().find_map(|member| scan(member, depth - 1))
        }
        _ => None,
    }
}

impl NodeDescriptor for SingleOutputTask {
    fn descriptor() -> NodeMetadata {
        NodeMetadata {
            node_type: "single-output".to_string(),
            category: NodeCategory::Output,
            label: "Single Output".to_string(),
            description: "Unwraps the first typed element in a payload".to_string(),
            inputs: vec![PortMetadata::required(
                Self::PORT_PAYLOAD,
                "Payload",
                PortDataType::Any,
            )],
            outputs: vec![
                PortMetadata::optional(Self::PORT_VALUE, "Value", PortDataType::Any),
                PortMetadata::optional(Self::PORT_DATA_TYPE, "Data Type", PortDataType::String),
            ],
            execution_mode: ExecutionMode::Reactive,
        }
    }
}

#[async_trait]
impl Task for SingleOutputTask {
    fn id(&self) -> &str {
        &self.task_id
    }

    async fn run(&self, context: Context) -> graph_flow::Result<TaskResult> {
        let element = self
            .extract(&context)
            .await
            .map_err(|err| GraphError::TaskExecutionFailed(err.to_string()))?;
        Ok(TaskResult::new(
            Some(element.to_plain().to_string()),
            NextAction::Continue,
        ))
    }
}

inventory::submit!(node_core::DescriptorFn(SingleOutputTask::descriptor));

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn context_with_payload(payload: serde_json::Value) -> Context {
        let context = Context::new();
        let key = ContextKeys::input("out1", SingleOutputTask::PORT_PAYLOAD);
        context.set(&key, payload).await;
        context
    }

    async fn stored_outputs(context: &Context) -> (serde_json::Value, String) {
        let value_key = ContextKeys::output("out1", SingleOutputTask::PORT_VALUE);
        let kind_key = ContextKeys::output("out1", SingleOutputTask::PORT_DATA_TYPE);
        (
            context.get(&value_key).await.unwrap(),
            context.get(&kind_key).await.unwrap(),
        )
    }

    #[tokio::test]
    async fn test_extracts_a_toplevel_element() {
        let task = SingleOutputTask::new("out1");
        let context = context_with_payload(json!({"type": "f64", "value": 0.5})).await;

        let element = task.extract(&context).await.unwrap();
        assert_eq!(element, DataElement::F64(0.5));
        let (value, kind) = stored_outputs(&context).await;
        assert_eq!(value, json!(0.5));
        assert_eq!(kind, "f64");
    }

    #[tokio::test]
    async fn test_finds_an_element_nested_in_a_parameter_list() {
        // The shape an evaluation output has
        let task = SingleOutputTask::new("out1");
        let payload = json!([
            {"name": "label", "data": {"type": "string", "value": "cat"}}
        ]);
        let context = context_with_payload(payload).await;

        let element = task.extract(&context).await.unwrap();
        assert_eq!(element, DataElement::String("cat".to_string()));
        let (value, kind) = stored_outputs(&context).await;
        assert_eq!(value, json!("cat"));
        assert_eq!(kind, "string");
    }

    #[tokio::test]
    async fn test_first_element_in_order_wins() {
        let task = SingleOutputTask::new("out1");
        let payload = json!([
            {"type": "boolean", "value": true},
            {"type": "string", "value": "second"}
        ]);
        let context = context_with_payload(payload).await;

        let element = task.extract(&context).await.unwrap();
        assert_eq!(element, DataElement::Boolean(true));
    }

    #[tokio::test]
    async fn test_depth_limit_is_honored() {
        let task = SingleOutputTask::new("out1");
        // Six wrappers put the element one level past the search depth
        let payload = json!({"a": {"b": {"c": {"d": {"e": {"f":
            {"type": "string", "value": "too deep"}
        }}}}}});
        let context = context_with_payload(payload).await;

        let err = task.extract(&context).await.unwrap_err();
        assert!(matches!(err, SingleOutputError::NoElement));
    }

    #[tokio::test]
    async fn test_no_element_in_a_plain_payload() {
        let task = SingleOutputTask::new("out1");
        let context = context_with_payload(json!({"text": "hello"})).await;

        let err = task.extract(&context).await.unwrap_err();
        assert!(matches!(err, SingleOutputError::NoElement));
    }

    #[tokio::test]
    async fn test_missing_payload() {
        let task = SingleOutputTask::new("out1");
        let context = Context::new();

        let err = task.extract(&context).await.unwrap_err();
        assert!(matches!(err, SingleOutputError::MissingPayload(_)));
    }
}
