//! Shared test doubles for the adapter nodes

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use platform_client::{
    AccessLevel, DataElement, EvaluateOutcome, Parameter, PlatformClient, PlatformError,
    ResourceInfo, ResourceKind, SuccessfulEvaluation,
};
use serde_json::json;
use tokio::sync::Notify;

type Scripted<T> = Mutex<VecDeque<Result<T, PlatformError>>>;

/// Scripted platform client
///
/// Responses are pushed up front and consumed in order; an empty queue
/// yields a benign default so tests only script what they assert on.
/// `hold_describe` gates describe calls on a [`Notify`] for tests that
/// need a lookup parked mid-flight.
pub(crate) struct MockClient {
    describe_results: Scripted<Vec<ResourceInfo>>,
    add_results: Scripted<serde_json::Value>,
    review_results: Scripted<serde_json::Value>,
    evaluate_results: Scripted<EvaluateOutcome>,
    describe_calls: AtomicUsize,
    add_calls: AtomicUsize,
    review_calls: AtomicUsize,
    evaluate_calls: AtomicUsize,
    describe_gate: Mutex<Option<Arc<Notify>>>,
    pub last_describe: Mutex<Option<(ResourceKind, Vec<String>, Option<String>)>>,
    pub last_add: Mutex<Option<(String, Vec<DataElement>, Option<String>)>>,
    pub last_evaluate: Mutex<Option<(String, Option<String>, Vec<Parameter>, Option<String>)>>,
}

impl MockClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            describe_results: Mutex::new(VecDeque::new()),
            add_results: Mutex::new(VecDeque::new()),
            review_results: Mutex::new(VecDeque::new()),
            evaluate_results: Mutex::new(VecDeque::new()),
            describe_calls: AtomicUsize::new(0),
            add_calls: AtomicUsize::new(0),
            review_calls: AtomicUsize::new(0),
            evaluate_calls: AtomicUsize::new(0),
            describe_gate: Mutex::new(None),
            last_describe: Mutex::new(None),
            last_add: Mutex::new(None),
            last_evaluate: Mutex::new(None),
        })
    }

    pub fn resource(id: &str, name: &str, access: AccessLevel) -> ResourceInfo {
        ResourceInfo {
            id: id.to_string(),
            name: name.to_string(),
            access,
        }
    }

    pub fn push_describe(&self, result: Result<Vec<ResourceInfo>, PlatformError>) {
        self.describe_results.lock().unwrap().push_back(result);
    }

    pub fn push_add(&self, result: Result<serde_json::Value, PlatformError>) {
        self.add_results.lock().unwrap().push_back(result);
    }

    pub fn push_review(&self, result: Result<serde_json::Value, PlatformError>) {
        self.review_results.lock().unwrap().push_back(result);
    }

    pub fn push_evaluate(&self, result: Result<EvaluateOutcome, PlatformError>) {
        self.evaluate_results.lock().unwrap().push_back(result);
    }

    /// Park every subsequent describe call until the returned handle
    /// is notified
    pub fn hold_describe(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.describe_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn describe_call_count(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn add_call_count(&self) -> usize {
        self.add_calls.load(Ordering::SeqCst)
    }

    pub fn review_call_count(&self) -> usize {
        self.review_calls.load(Ordering::SeqCst)
    }

    pub fn evaluate_call_count(&self) -> usize {
        self.evaluate_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlatformClient for MockClient {
    async fn describe_resources(
        &self,
        kind: ResourceKind,
        ids: &[String],
        credential: Option<&str>,
    ) -> Result<Vec<ResourceInfo>, PlatformError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_describe.lock().unwrap() =
            Some((kind, ids.to_vec(), credential.map(str::to_string)));
        let gate = self.describe_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.describe_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(vec![]))
    }

    async fn add_entries(
        &self,
        dataset_id: &str,
        entries: &[DataElement],
        credential: Option<&str>,
    ) -> Result<serde_json::Value, PlatformError> {
        self.add_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_add.lock().unwrap() = Some((
            dataset_id.to_string(),
            entries.to_vec(),
            credential.map(str::to_string),
        ));
        self.add_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(json!({})))
    }

    async fn add_entries_to_review(
        &self,
        dataset_id: &str,
        entries: &[DataElement],
        credential: Option<&str>,
    ) -> Result<serde_json::Value, PlatformError> {
        self.review_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_add.lock().unwrap() = Some((
            dataset_id.to_string(),
            entries.to_vec(),
            credential.map(str::to_string),
        ));
        self.review_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(json!({})))
    }

    async fn evaluate(
        &self,
        model_id: &str,
        params: &[Parameter],
        snapshot_id: Option<&str>,
        credential: Option<&str>,
    ) -> Result<EvaluateOutcome, PlatformError> {
        self.evaluate_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_evaluate.lock().unwrap() = Some((
            model_id.to_string(),
            snapshot_id.map(str::to_string),
            params.to_vec(),
            credential.map(str::to_string),
        ));
        self.evaluate_results.lock().unwrap().pop_front().unwrap_or(
            Ok(EvaluateOutcome::Success(SuccessfulEvaluation {
                output: vec![],
                execution_details: json!({}),
            })),
        )
    }
}
