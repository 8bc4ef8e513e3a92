//! Production HTTP implementation of `PlatformClient`
//!
//! The platform exposes an RPC-over-HTTP interface: one POST per method,
//! JSON parameters in the body, credential as a bearer token, and a
//! `{ "error": ... } | { "result": ... }` envelope in the response. The
//! wire protocol is a given external interface.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::client::{PlatformClient, ResourceInfo, ResourceKind};
use crate::data::{DataElement, Parameter};
use crate::error::{ApiError, PlatformError, Result};
use crate::execution::{EvaluateOutcome, FailedEvaluation, SuccessfulEvaluation};

/// HTTP client for the remote platform
pub struct HttpPlatformClient {
    /// HTTP client for API requests
    http: reqwest::Client,
    /// Base URL of the platform API, without trailing slash
    base_url: String,
}

/// Response envelope shared by all platform methods
#[derive(Debug, Deserialize)]
struct RpcEnvelope<T> {
    #[serde(default)]
    error: Option<ApiError>,
    #[serde(default = "Option::default")]
    result: Option<T>,
}

/// Result payload of a describe lookup; the array field is named after
/// the resource kind on the wire
#[derive(Debug, Deserialize)]
struct DescribeResult {
    #[serde(default, alias = "datasets", alias = "models")]
    resources: Vec<ResourceInfo>,
}

/// Result payload of an evaluate call, before narrowing to the outcome enum
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvaluateResult {
    #[serde(default)]
    failed: Option<FailedEvaluation>,
    #[serde(default)]
    success: Option<SuccessfulEvaluation>,
}

impl HttpPlatformClient {
    /// Create a client for the platform at the given base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing `reqwest::Client`
    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self { http, base_url }
    }

    /// Get the configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, service: &str, method: &str) -> String {
        format!("{}/{}/{}", self.base_url, service, method)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        service: &str,
        method: &str,
        params: serde_json::Value,
        credential: Option<&str>,
    ) -> Result<T> {
        let url = self.endpoint(service, method);
        log::debug!("calling {} with credential: {}", url, credential.is_some());

        let mut request = self.http.post(&url).json(&params);
        if let Some(key) = credential {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(PlatformError::from)?;

        let status = response.status();
        if status == reqwest::StatusCode::BAD_REQUEST {
            let body = response.text().await.unwrap_or_default();
            return Err(PlatformError::InvalidRequest(body));
        }
        if !status.is_success() {
            return Err(PlatformError::Protocol(format!(
                "unexpected HTTP status {} from {}",
                status, url
            )));
        }

        let envelope: RpcEnvelope<T> = response.json().await.map_err(PlatformError::from)?;
        match envelope {
            RpcEnvelope {
                error: Some(error), ..
            } => Err(PlatformError::Api(error)),
            RpcEnvelope {
                result: Some(result),
                ..
            } => Ok(result),
            RpcEnvelope { .. } => Err(PlatformError::Protocol(format!(
                "response from {} carries neither result nor error",
                url
            ))),
        }
    }
}

#[async_trait]
impl PlatformClient for HttpPlatformClient {
    async fn describe_resources(
        &self,
        kind: ResourceKind,
        ids: &[String],
        credential: Option<&str>,
    ) -> Result<Vec<ResourceInfo>> {
        let (service, method, ids_key) = match kind {
            ResourceKind::Dataset => ("dataset", "getDatasets", "datasetIds"),
            ResourceKind::Model => ("model", "getModels", "modelIds"),
        };
        let params = serde_json::json!({ ids_key: ids });

        let result: DescribeResult = self.call(service, method, params, credential).await?;
        Ok(result.resources)
    }

    async fn add_entries(
        &self,
        dataset_id: &str,
        entries: &[DataElement],
        credential: Option<&str>,
    ) -> Result<serde_json::Value> {
        let params = serde_json::json!({
            "datasetId": dataset_id,
            "entries": entries,
        });
        self.call("dataset", "addEntries", params, credential).await
    }

    async fn add_entries_to_review(
        &self,
        dataset_id: &str,
        entries: &[DataElement],
        credential: Option<&str>,
    ) -> Result<serde_json::Value> {
        let params = serde_json::json!({
            "datasetId": dataset_id,
            "entries": entries,
        });
        self.call("dataset", "addEntriesToNeedsReview", params, credential)
            .await
    }

    async fn evaluate(
        &self,
        model_id: &str,
        params: &[Parameter],
        snapshot_id: Option<&str>,
        credential: Option<&str>,
    ) -> Result<EvaluateOutcome> {
        let mut body = serde_json::json!({
            "modelId": model_id,
            "params": params,
        });
        if let Some(snapshot) = snapshot_id {
            body["snapshotId"] = serde_json::json!(snapshot);
        }

        let result: EvaluateResult = self.call("model", "evaluate", body, credential).await?;
        match result {
            EvaluateResult {
                failed: Some(failed),
                ..
            } => Ok(EvaluateOutcome::Failed(failed)),
            EvaluateResult {
                success: Some(success),
                ..
            } => Ok(EvaluateOutcome::Success(success)),
            EvaluateResult { .. } => Err(PlatformError::Protocol(
                "evaluate result carries neither success nor failure".to_string(),
            )),
        }
    }
}
