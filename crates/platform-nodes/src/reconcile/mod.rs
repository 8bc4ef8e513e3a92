//! Resource status reconciliation
//!
//! Both platform adapters (`submit-data` and `evaluate`) share the same
//! problem: the node is configured with an opaque resource identifier, the
//! operator wants to see a human-readable name and an accurate indicator,
//! and lookups, primary operations and their failures all race for the
//! same status display. The [`Reconciler`] owns that state for one node:
//!
//! - the name-resolution state machine ([`resolver::ResolutionState`]),
//!   which memoizes the resolved name and permanently suppresses lookups
//!   after conclusive failures
//! - the operation state, an advisory in-flight marker that gives the
//!   primary operation's status priority over resolver emissions
//! - failure classification for failed evaluations ([`classify`])
//!
//! The in-flight marker is a status-suppression hint, not a mutex:
//! overlapping operations are independent and last-write-wins on the
//! display. The `Idle -> Resolving` transition is the only true mutual
//! exclusion in this module.

pub mod classify;
pub mod resolver;

use std::sync::{Arc, Mutex, MutexGuard};

use node_core::{NodeStatus, StatusSink, StatusUpdate};
use platform_client::{PlatformClient, PlatformError, ResourceInfo, ResourceKind};

use resolver::{LookupDisposition, ResolutionState};

pub use classify::{classify, describe_failure, ClassifyError};

/// Status text for an unreachable platform, shared by both adapters
pub(crate) const TEXT_COMM_FAILURE: &str = "Failed to communicate with the platform";

/// A resource reference, fixed for the duration of one invocation
///
/// Built from static node configuration merged with per-invocation
/// overrides; an absent identifier never reaches this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    /// Opaque resource identifier
    pub id: String,
    /// Credential for the remote call, if any
    pub credential: Option<String>,
}

impl ResourceRef {
    pub fn new(id: impl Into<String>, credential: Option<String>) -> Self {
        Self {
            id: id.into(),
            credential,
        }
    }
}

/// Which adapter a reconciler instance serves
///
/// The two adapters differ only in wording and in the write-access check:
/// submitting data requires write access to the dataset, evaluating a
/// model does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterKind {
    SubmitData,
    Evaluate,
}

impl AdapterKind {
    /// The resource kind this adapter references
    pub fn resource_kind(&self) -> ResourceKind {
        match self {
            Self::SubmitData => ResourceKind::Dataset,
            Self::Evaluate => ResourceKind::Model,
        }
    }

    /// Indicator text while the primary operation runs
    pub fn busy_text(&self) -> &'static str {
        match self {
            Self::SubmitData => "Adding data..",
            Self::Evaluate => "Evaluating..",
        }
    }

    /// Indicator text when the adapter is ready for the next trigger
    pub fn ready_text(&self, name: Option<&str>) -> String {
        match (self, name) {
            (Self::SubmitData, Some(name)) => format!("Ready to add data to \"{}\"", name),
            (Self::SubmitData, None) => "Ready to add data".to_string(),
            (Self::Evaluate, Some(name)) => format!("Ready to evaluate \"{}\"", name),
            (Self::Evaluate, None) => "Ready to evaluate".to_string(),
        }
    }

    fn requires_write_access(&self) -> bool {
        matches!(self, Self::SubmitData)
    }
}

/// Advisory in-flight marker for the primary operation
///
/// The host may deliver a second trigger before the first one's remote
/// call resolves, so this is a depth counter rather than a binary flag:
/// the display belongs to the operation(s) until the last one finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
enum OperationState {
    Idle,
    InFlight { depth: usize },
}

impl OperationState {
    fn enter(&mut self) {
        *self = match self {
            Self::Idle => Self::InFlight { depth: 1 },
            Self::InFlight { depth } => Self::InFlight { depth: *depth + 1 },
        };
    }

    fn exit(&mut self) {
        *self = match self {
            Self::InFlight { depth } if *depth > 1 => Self::InFlight { depth: *depth - 1 },
            _ => Self::Idle,
        };
    }

    fn is_in_flight(&self) -> bool {
        matches!(self, Self::InFlight { .. })
    }
}

struct ReconcilerInner {
    resolution: ResolutionState,
    operation: OperationState,
}

/// Per-node resource status reconciler
///
/// Owned by one adapter node for its whole lifetime; all mutation goes
/// through this type. The internal lock is never held across an await
/// point.
pub struct Reconciler {
    node_id: String,
    kind: AdapterKind,
    client: Arc<dyn PlatformClient>,
    sink: Arc<dyn StatusSink>,
    state: Mutex<ReconcilerInner>,
}

/// Marks a primary operation as in flight for its lifetime
///
/// Dropping the guard clears the marker, which makes cleanup run on every
/// exit path of the operation, early returns and errors included.
pub struct OperationGuard<'a> {
    reconciler: &'a Reconciler,
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.reconciler.state().operation.exit();
    }
}

impl Reconciler {
    /// Create a reconciler for one adapter node
    pub fn new(
        node_id: impl Into<String>,
        kind: AdapterKind,
        client: Arc<dyn PlatformClient>,
        sink: Arc<dyn StatusSink>,
    ) -> Self {
        Self {
            node_id: node_id.into(),
            kind,
            client,
            sink,
            state: Mutex::new(ReconcilerInner {
                resolution: ResolutionState::Idle,
                operation: OperationState::Idle,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, ReconcilerInner> {
        self.state.lock().unwrap()
    }

    /// The platform client the owning node shares with the resolver
    pub(crate) fn client(&self) -> &Arc<dyn PlatformClient> {
        &self.client
    }

    /// The node this reconciler reports for
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    /// Which adapter this reconciler serves
    pub fn kind(&self) -> AdapterKind {
        self.kind
    }

    /// The memoized resource name, once resolution has succeeded
    pub fn cached_name(&self) -> Option<String> {
        self.state().resolution.name().map(|s| s.to_string())
    }

    /// Whether name lookups have permanently ceased
    pub fn is_suppressed(&self) -> bool {
        self.state().resolution.is_suppressed()
    }

    /// Whether a primary operation is currently in flight
    pub fn is_in_flight(&self) -> bool {
        self.state().operation.is_in_flight()
    }

    /// Emit a status update unconditionally (primary-operation path)
    pub fn project(&self, status: NodeStatus) {
        let update = StatusUpdate {
            node_id: self.node_id.clone(),
            status,
        };
        if let Err(err) = self.sink.set(update) {
            log::warn!("status update for node {} dropped: {}", self.node_id, err);
        }
    }

    /// Mark the primary operation in flight and show its busy text
    pub fn begin_operation(&self) -> OperationGuard<'_> {
        self.state().operation.enter();
        self.project(NodeStatus::info(self.kind.busy_text()));
        OperationGuard { reconciler: self }
    }

    /// Resolve the resource's human-readable name, at most once
    ///
    /// No-op unless the state machine is idle and the identifier is
    /// non-empty. At most one lookup is in flight at a time; conclusive
    /// failures suppress all future lookups for this instance.
    pub async fn resolve(&self, resource: &ResourceRef) {
        if resource.id.is_empty() {
            return;
        }
        if self.state().resolution.begin_lookup().is_err() {
            return;
        }

        let outcome = self
            .client
            .describe_resources(
                self.kind.resource_kind(),
                std::slice::from_ref(&resource.id),
                resource.credential.as_deref(),
            )
            .await;

        self.apply_lookup(resource, outcome);
    }

    /// Project the post-operation ready status
    ///
    /// With a cached name the ready text embeds it; otherwise a generic
    /// ready status is shown and, when the node has a configured
    /// resource, another resolution attempt runs so a freshly working
    /// credential can fill the name in. Callers pass their configured
    /// reference here, never a per-invocation override: the cached name
    /// must describe the resource the node is configured for.
    pub async fn finish_success(&self, resource: Option<&ResourceRef>) {
        match self.cached_name() {
            Some(name) => self.project(NodeStatus::ready(self.kind.ready_text(Some(&name)))),
            None => {
                self.project(NodeStatus::ready(self.kind.ready_text(None)));
                if let Some(resource) = resource {
                    self.resolve(resource).await;
                }
            }
        }
    }

    fn apply_lookup(
        &self,
        resource: &ResourceRef,
        outcome: Result<Vec<ResourceInfo>, PlatformError>,
    ) {
        let kind = self.kind.resource_kind();
        let (disposition, status) = match outcome {
            Err(PlatformError::Api(err)) if err.is_bad_credentials() => (
                LookupDisposition::Suppress,
                NodeStatus::error("Error contacting the platform: Bad API key"),
            ),
            Err(PlatformError::Api(err)) => (
                LookupDisposition::Retry,
                NodeStatus::error(format!("Error contacting the platform: {}", err.code)),
            ),
            Err(err) => {
                log::debug!("name lookup for node {} failed: {}", self.node_id, err);
                (
                    LookupDisposition::Retry,
                    NodeStatus::error(TEXT_COMM_FAILURE),
                )
            }
            Ok(resources) => match resources.into_iter().find(|r| r.id == resource.id) {
                Some(found) => {
                    let status = if self.kind.requires_write_access() && !found.access.can_write() {
                        NodeStatus::error(format!(
                            "You do not have write access to {} \"{}\"",
                            kind.noun(),
                            found.name
                        ))
                    } else {
                        NodeStatus::ready(self.kind.ready_text(Some(&found.name)))
                    };
                    (LookupDisposition::Cache(found.name), status)
                }
                None => {
                    let status = if uuid::Uuid::parse_str(&resource.id).is_ok() {
                        if resource.credential.is_some() {
                            NodeStatus::error(format!("{} not found.", kind.title()))
                        } else {
                            // The credential may still arrive per invocation,
                            // so the resource may in fact exist.
                            NodeStatus::ready(self.kind.ready_text(None))
                        }
                    } else {
                        NodeStatus::error(format!(
                            "{} not found. Use the {} ID, not the name.",
                            kind.title(),
                            kind.noun()
                        ))
                    };
                    (LookupDisposition::Suppress, status)
                }
            },
        };

        // Resolver-originated updates are stale relative to a running
        // operation and defer to its status; the busy check shares the
        // lock with the transition so the two cannot interleave.
        let emit = {
            let mut state = self.state();
            if let Err(err) = state.resolution.finish_lookup(disposition) {
                // Unreachable while resolve() is the only lookup driver
                log::warn!("node {}: {}", self.node_id, err);
            }
            !state.operation.is_in_flight()
        };
        if emit {
            self.project(status);
        }
    }
}
