//! Execution results of remote evaluations
//!
//! A failed evaluation comes back with a nested failure report: composite
//! model pipelines report one outcome per component, and only the
//! components that themselves failed carry a subtree. The report shape is
//! a given external interface.

use serde::{Deserialize, Serialize};

use crate::data::Parameter;

/// The error reported by a single failed execution unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionError {
    /// Machine-readable error code
    pub code: String,
    /// Verbatim diagnostic block, set when user code raised an exception
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exception_details: Option<String>,
}

impl ExecutionError {
    /// Code reported when user code inside the model raised an exception
    pub const EXCEPTION: &'static str = "exception";

    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            exception_details: None,
        }
    }

    /// Whether this error is an uncaught exception in remote user code
    pub fn is_exception(&self) -> bool {
        self.code == Self::EXCEPTION
    }
}

/// A node in the nested failure report of a failed evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum FailureReport {
    /// A single execution unit that failed with a concrete error
    Leaf { error: ExecutionError },
    /// A composite pipeline; only failed children carry a subtree
    Composite { children: Vec<ComponentOutcome> },
}

/// Outcome of one component inside a composite pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentOutcome {
    /// Present iff this component failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failed: Option<FailureReport>,
}

impl ComponentOutcome {
    /// A component that completed without failure
    pub fn ok() -> Self {
        Self { failed: None }
    }

    /// A component that failed with the given report
    pub fn failed(report: FailureReport) -> Self {
        Self {
            failed: Some(report),
        }
    }
}

/// Details of a failed evaluation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FailedEvaluation {
    /// The nested failure report
    pub execution_details: FailureReport,
}

/// Details of a successful evaluation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuccessfulEvaluation {
    /// Output parameters produced by the model
    pub output: Vec<Parameter>,
    /// Timing and placement details, forwarded opaquely
    #[serde(default)]
    pub execution_details: serde_json::Value,
}

/// Outcome of an evaluation that the platform accepted and ran
///
/// An evaluation the platform refused to start is a [`crate::PlatformError`]
/// instead.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluateOutcome {
    /// The evaluation ran and failed inside the model
    Failed(FailedEvaluation),
    /// The evaluation produced output
    Success(SuccessfulEvaluation),
}
