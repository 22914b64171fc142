//! The resilient USAspending fetch client.
//!
//! Every outbound request passes through the shared [`Throttle`], is bounded
//! by the configured timeout, and is retried with exponential backoff on
//! rate limits and network failures. Other HTTP errors fail immediately.

use crate::retry::RetryPolicy;
use crate::throttle::Throttle;
use crate::transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport, TransportError};
use serde_json::Value;
use spendlens_config::ApiConfig;
use spendlens_core::ClientError;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

pub struct SpendingClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    throttle: Throttle,
    retry: RetryPolicy,
    timeout: Duration,
}

enum Attempt {
    Done(Result<Value, ClientError>),
    Retry(ClientError),
}

impl SpendingClient {
    /// Build a client that talks to the real API.
    pub fn new(config: &ApiConfig) -> Result<Self, ClientError> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let transport = ReqwestTransport::new(&config.user_agent, timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Build a client over an arbitrary transport.
    pub fn with_transport(config: &ApiConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            transport,
            throttle: Throttle::new(Duration::from_millis(config.request_delay_ms)),
            retry: RetryPolicy::from_config(config),
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Absolute URL for an endpoint path relative to the API root.
    pub fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'))
    }

    pub async fn post(&self, endpoint: &str, body: Value) -> Result<Value, ClientError> {
        self.execute(Method::Post, endpoint, Some(body)).await
    }

    pub async fn get(&self, endpoint: &str) -> Result<Value, ClientError> {
        self.execute(Method::Get, endpoint, None).await
    }

    /// Send one logical request, retrying as the policy allows.
    pub async fn execute(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<Value>,
    ) -> Result<Value, ClientError> {
        let request = ApiRequest {
            method,
            url: self.url(endpoint),
            body,
        };

        let mut attempt: u32 = 0;
        loop {
            self.throttle.acquire().await;
            debug!(
                method = %request.method,
                url = %request.url,
                attempt = attempt + 1,
                "Dispatching request"
            );

            let error = match self.attempt(&request).await {
                Attempt::Done(result) => return result,
                Attempt::Retry(error) => error,
            };

            if !self.retry.allows_retry(attempt) {
                return Err(match error {
                    ClientError::RateLimitExceeded { .. } => ClientError::RateLimitExceeded {
                        retries: self.retry.max_retries,
                    },
                    other => other,
                });
            }

            let delay = self.retry.backoff(attempt);
            warn!(
                method = %request.method,
                url = %request.url,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                error = %error,
                "Retrying request"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    async fn attempt(&self, request: &ApiRequest) -> Attempt {
        let outcome = tokio::time::timeout(self.timeout, self.transport.send(request)).await;

        let response = match outcome {
            Ok(Ok(response)) => response,
            Ok(Err(TransportError::Timeout)) | Err(_) => {
                warn!(
                    method = %request.method,
                    url = %request.url,
                    timeout_secs = self.timeout.as_secs(),
                    "Request timed out"
                );
                return Attempt::Done(Err(ClientError::Timeout {
                    timeout_secs: self.timeout.as_secs(),
                }));
            }
            Ok(Err(TransportError::Network(message))) => {
                return Attempt::Retry(ClientError::Network(message));
            }
        };

        info!(
            method = %request.method,
            url = %request.url,
            status = response.status,
            "Received response"
        );

        if response.status == 429 {
            return Attempt::Retry(ClientError::RateLimitExceeded {
                retries: self.retry.max_retries,
            });
        }

        if !response.is_success() {
            return Attempt::Done(Err(ClientError::Http {
                status: response.status,
                message: error_message(&response),
            }));
        }

        Attempt::Done(
            serde_json::from_str(&response.body).map_err(|e| ClientError::Decode(e.to_string())),
        )
    }
}

/// Prefer the API's `detail` field, then the raw body, then the status text.
fn error_message(response: &ApiResponse) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(&response.body) {
        if let Some(Value::String(detail)) = map.get("detail") {
            return detail.clone();
        }
    }
    let body = response.body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    response.status_text.clone()
}
