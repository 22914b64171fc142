//! Scripted transport for tests.
//!
//! Responses are served in the order they were queued. Every request is
//! recorded with the (possibly paused) tokio instant at which it arrived, so
//! tests can assert on spacing. Once the script runs out, every further
//! request fails with a network error.

use crate::transport::{ApiRequest, ApiResponse, Transport, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub at: Instant,
    pub request: ApiRequest,
}

struct Step {
    delay: Option<Duration>,
    outcome: Result<ApiResponse, TransportError>,
}

#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<Step>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(self, delay: Option<Duration>, outcome: Result<ApiResponse, TransportError>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(Step { delay, outcome });
        self
    }

    /// Queue a JSON response.
    pub fn respond(self, status: u16, body: Value) -> Self {
        self.push(None, Ok(ApiResponse::json(status, &body)))
    }

    /// Queue a response with a raw text body.
    pub fn respond_text(self, status: u16, body: &str) -> Self {
        self.push(None, Ok(ApiResponse::new(status, body)))
    }

    /// Queue a JSON response that arrives only after `delay`.
    pub fn respond_after(self, delay: Duration, status: u16, body: Value) -> Self {
        self.push(Some(delay), Ok(ApiResponse::json(status, &body)))
    }

    /// Queue a transport failure.
    pub fn fail(self, error: TransportError) -> Self {
        self.push(None, Err(error))
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Steps still queued.
    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.requests
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(RecordedRequest {
                at: Instant::now(),
                request: request.clone(),
            });

        let step = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();

        match step {
            Some(Step { delay, outcome }) => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                outcome
            }
            None => Err(TransportError::Network("scripted transport exhausted".into())),
        }
    }
}
