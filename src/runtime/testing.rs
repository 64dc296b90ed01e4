//! Mock implementations for testing
//!
//! These mocks let the runtime and the HTTP layer run without network access.

use crate::llm::{LlmError, LlmRequest, LlmResponse, LlmService};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

// ============================================================================
// Mock LLM Service
// ============================================================================

/// Mock LLM service that returns queued responses
pub struct MockLlmService {
    responses: Mutex<VecDeque<Result<LlmResponse, LlmError>>>,
    model_id: String,
    /// Record of all requests made
    pub requests: Mutex<Vec<LlmRequest>>,
}

#[allow(dead_code)]
impl MockLlmService {
    pub fn new(model_id: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            model_id: model_id.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_response(&self, response: LlmResponse) {
        self.responses.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a successful plain-text reply
    pub fn queue_reply(&self, text: &str) {
        self.queue_response(LlmResponse::from_text(text));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: LlmError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self) -> Result<LlmResponse, LlmError> {
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::network("No mock response queued")))
    }
}

#[async_trait]
impl LlmService for MockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        self.next_response()
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }
}

// ============================================================================
// Delayed Mock LLM Service (for serialization testing)
// ============================================================================

/// Mock LLM service with a configurable delay before answering
pub struct DelayedMockLlmService {
    inner: MockLlmService,
    delay: Duration,
}

impl DelayedMockLlmService {
    pub fn new(model_id: impl Into<String>, delay: Duration) -> Self {
        Self {
            inner: MockLlmService::new(model_id),
            delay,
        }
    }

    pub fn queue_reply(&self, text: &str) {
        self.inner.queue_reply(text);
    }

    pub fn recorded_requests(&self) -> Vec<LlmRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl LlmService for DelayedMockLlmService {
    async fn complete(&self, request: &LlmRequest) -> Result<LlmResponse, LlmError> {
        self.inner.requests.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.delay).await;
        self.inner.next_response()
    }

    fn model_id(&self) -> &str {
        self.inner.model_id()
    }
}
