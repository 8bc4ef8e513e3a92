//! Platform Client - typed async access to the remote ML platform
//!
//! The remote platform hosts datasets and models. Ferrule nodes talk to it
//! through the [`PlatformClient`] trait, which keeps node logic testable
//! against in-memory fakes. The [`HttpPlatformClient`] implementation
//! speaks the platform's JSON-RPC-over-HTTP wire protocol; that protocol
//! is a given external interface and is modeled as-is.
//!
//! # Modules
//!
//! - `client`: the `PlatformClient` trait and resource description types
//! - `http`: the production HTTP implementation
//! - `data`: the typed data-element payload model
//! - `execution`: the nested execution failure report returned by failed
//!   evaluations
//! - `error`: the structured error model

pub mod client;
pub mod data;
pub mod error;
pub mod execution;
pub mod http;

// Re-export key types
pub use client::{AccessLevel, PlatformClient, ResourceInfo, ResourceKind};
pub use data::{DataElement, ElementError, Parameter, ELEMENT_KINDS};
pub use error::{ApiError, PlatformError, Result};
pub use execution::{
    ComponentOutcome, EvaluateOutcome, ExecutionError, FailedEvaluation, FailureReport,
    SuccessfulEvaluation,
};
pub use http::HttpPlatformClient;
