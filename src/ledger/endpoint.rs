//! Starknet JSON-RPC endpoint
//!
//! Implements [`EventSource`] over `starknet_getEvents` and `starknet_blockNumber`. The
//! endpoint owns timeout and retry policy; callers above it never retry a page themselves.

use super::{EventSource, EventsPage, EventsRequest};
use crate::error::RpcError;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// JSON-RPC response envelope
#[derive(Debug, Deserialize)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    #[serde(default)]
    error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
struct JsonRpcError {
    code: i64,
    message: String,
    #[serde(default)]
    data: Option<Value>,
}

/// A single Starknet RPC endpoint
#[derive(Debug)]
pub struct RpcEndpoint {
    client: reqwest::Client,
    url: String,
    timeout_secs: u64,
    retry_attempts: u32,
    next_id: AtomicU64,
}

impl RpcEndpoint {
    /// Create a new endpoint
    pub fn new(
        url: impl Into<String>,
        timeout_secs: u64,
        retry_attempts: u32,
    ) -> Result<Self, RpcError> {
        let url = url.into();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(RpcError::ConnectionFailed(format!("Unsupported RPC URL: {}", url)));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            url,
            timeout_secs,
            retry_attempts,
            next_id: AtomicU64::new(1),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Call a method, retrying transient failures
    async fn call<T: DeserializeOwned>(&self, method: &str, params: Value) -> Result<T, RpcError> {
        let mut retries = 0;

        loop {
            match self.call_once(method, &params).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && retries < self.retry_attempts => {
                    retries += 1;
                    let delay = match &e {
                        RpcError::RateLimited(_) => Duration::from_secs(2u64.pow(retries)),
                        _ => Duration::from_millis(500),
                    };
                    tracing::debug!(
                        "{} failed on {} (attempt {}/{}): {}; retrying in {:?}",
                        method,
                        self.url,
                        retries,
                        self.retry_attempts,
                        e,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn call_once<T: DeserializeOwned>(
        &self,
        method: &str,
        params: &Value,
    ) -> Result<T, RpcError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });

        tracing::trace!("{} -> {}", self.url, body);
        let started = Instant::now();

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RpcError::RateLimited(self.url.clone()));
        }
        if status.is_server_error() {
            return Err(RpcError::ConnectionFailed(format!(
                "{} returned HTTP {}",
                self.url, status
            )));
        }
        if !status.is_success() {
            return Err(RpcError::InvalidResponse(format!("HTTP {}", status)));
        }

        let text = response.text().await.map_err(|e| self.classify(e))?;
        tracing::trace!("{} <- {} bytes in {:?}", method, text.len(), started.elapsed());

        parse_response(&text)
    }

    fn classify(&self, e: reqwest::Error) -> RpcError {
        if e.is_timeout() {
            RpcError::Timeout(self.timeout_secs * 1000)
        } else if e.is_connect() {
            RpcError::ConnectionFailed(format!("{}: {}", self.url, e))
        } else {
            RpcError::Http(e)
        }
    }
}

impl EventSource for RpcEndpoint {
    async fn get_events(&self, request: &EventsRequest) -> Result<EventsPage, RpcError> {
        self.call("starknet_getEvents", get_events_params(request)).await
    }

    async fn block_number(&self) -> Result<u64, RpcError> {
        self.call("starknet_blockNumber", json!([])).await
    }
}

/// Build the `starknet_getEvents` params object
pub(crate) fn get_events_params(request: &EventsRequest) -> Value {
    let mut filter = Map::new();
    filter.insert("from_block".into(), json!({ "block_number": request.from_block }));
    filter.insert("to_block".into(), json!({ "block_number": request.to_block }));

    if let Some(address) = &request.filter.address {
        filter.insert("address".into(), json!(address));
    }
    if !request.filter.keys.is_empty() {
        filter.insert("keys".into(), json!(request.filter.keys));
    }

    filter.insert("chunk_size".into(), json!(request.chunk_size));

    if let Some(token) = &request.continuation_token {
        filter.insert("continuation_token".into(), json!(token));
    }

    json!({ "filter": Value::Object(filter) })
}

/// Unwrap a JSON-RPC response body
pub(crate) fn parse_response<T: DeserializeOwned>(text: &str) -> Result<T, RpcError> {
    let response: JsonRpcResponse<T> = serde_json::from_str(text)
        .map_err(|e| RpcError::InvalidResponse(format!("{}: {}", e, truncate(text, 200))))?;

    if let Some(error) = response.error {
        let message = match error.data {
            Some(data) => format!("{} ({})", error.message, data),
            None => error.message,
        };
        return Err(RpcError::Provider {
            code: error.code,
            message,
        });
    }

    response
        .result
        .ok_or_else(|| RpcError::InvalidResponse("response has neither result nor error".into()))
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
