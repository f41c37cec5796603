//! JSON-RPC 2.0 transport over HTTP.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use taskbridge_core::{TrackerError, TrackerResult};
use tracing::debug;

use crate::config::{RetryPolicy, TrackerConfig};
use crate::retry::{send_with_retry, HttpFailure};

#[derive(Debug, Deserialize)]
struct RpcErrorObject {
    code: i64,
    #[serde(default)]
    message: String,
}

impl From<HttpFailure> for TrackerError {
    fn from(failure: HttpFailure) -> Self {
        match failure {
            HttpFailure::Status { status, body } => TrackerError::Status { status, body },
            HttpFailure::Transport(message) => TrackerError::Transport(message),
        }
    }
}

/// Bearer-authenticated JSON-RPC client for the tracker endpoint.
#[derive(Debug)]
pub struct RpcClient {
    http: reqwest::Client,
    endpoint: String,
    token: Option<String>,
    retry: RetryPolicy,
    next_id: AtomicU64,
}

impl RpcClient {
    pub fn new(config: &TrackerConfig) -> TrackerResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.request_timeout_ms))
            .build()
            .map_err(|e| TrackerError::Transport(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
            retry: config.retry,
            next_id: AtomicU64::new(1),
        })
    }

    /// Invoke `method` and decode its `result` member.
    ///
    /// Transport and 5xx/429 failures are retried; a JSON-RPC `error`
    /// member is returned as `TrackerError::Remote` without retrying.
    pub async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> TrackerResult<T> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        debug!(method = %method, request_id = id, "tracker call");

        let response = send_with_retry(&self.retry, method, || {
            let request = self.http.post(&self.endpoint).json(&payload);
            match &self.token {
                Some(token) => request.bearer_auth(token),
                None => request,
            }
        })
        .await?;

        let mut body: Value = response
            .json()
            .await
            .map_err(|e| TrackerError::Decode(format!("{method}: {e}")))?;

        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            let error: RpcErrorObject = serde_json::from_value(error.clone())
                .map_err(|e| TrackerError::Decode(format!("{method} error member: {e}")))?;
            return Err(TrackerError::Remote {
                code: error.code,
                message: error.message,
            });
        }

        let result = body
            .get_mut("result")
            .map(Value::take)
            .unwrap_or(Value::Null);
        serde_json::from_value(result).map_err(|e| TrackerError::Decode(format!("{method}: {e}")))
    }
}
