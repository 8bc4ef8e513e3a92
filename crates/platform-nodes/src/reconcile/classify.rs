//! Failure classification for failed evaluations
//!
//! A failed evaluation reports a nested tree: composite pipelines report
//! one outcome per component, and only failed components carry a subtree.
//! Classification walks the tree depth-first and returns the first leaf
//! error reached through failed children, ignoring siblings that did not
//! fail.

use thiserror::Error;

use platform_client::execution::{ExecutionError, FailureReport};

/// A failure report that violates its own invariants
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassifyError {
    /// A composite claimed failure but none of its children carry one.
    /// The platform promises at least one failing child under a failing
    /// composite; treat a violation as a protocol error rather than
    /// inventing a diagnostic.
    #[error("malformed failure report: failing composite has no failing child")]
    NoFailingChild,
}

/// Find the leaf error responsible for a failed evaluation
pub fn classify(report: &FailureReport) -> Result<&ExecutionError, ClassifyError> {
    match report {
        FailureReport::Leaf { error } => Ok(error),
        FailureReport::Composite { children } => {
            for child in children {
                if let Some(failed) = &child.failed {
                    return classify(failed);
                }
            }
            Err(ClassifyError::NoFailingChild)
        }
    }
}

/// Render a leaf error for the operator
///
/// Uncaught exceptions in remote user code get a distinguishing label and
/// the verbatim diagnostic block when one was captured; every other error
/// renders its raw code.
pub fn describe_failure(error: &ExecutionError) -> String {
    if error.is_exception() {
        match &error.exception_details {
            Some(details) => format!("Exception in model. Details:\n---\n{}\n---", details),
            None => "Exception in model".to_string(),
        }
    } else {
        error.code.clone()
    }
}
