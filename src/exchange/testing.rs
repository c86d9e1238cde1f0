//! Mock tone services for testing
//!
//! These mocks let the coordinator and chat front-end run without a
//! network.

use crate::tone::{AnalyzeRequest, Analysis, HealthReport, ToneError, ToneService};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

pub fn analysis(original: &str, tone: &str, rewritten: &str) -> Analysis {
    Analysis {
        original_text: original.to_string(),
        detected_tone: tone.to_string(),
        rewritten_text: rewritten.to_string(),
    }
}

// ============================================================================
// Mock Tone Service
// ============================================================================

/// Mock tone service that returns queued responses
pub struct MockToneService {
    responses: Mutex<VecDeque<Result<Analysis, ToneError>>>,
    tones: Vec<String>,
    /// Record of all requests made
    pub requests: Mutex<Vec<AnalyzeRequest>>,
}

impl MockToneService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            tones: vec!["sad".into(), "angry".into(), "friendly".into()],
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a successful response
    pub fn queue_analysis(&self, analysis: Analysis) {
        self.responses.lock().unwrap().push_back(Ok(analysis));
    }

    /// Queue an error response
    pub fn queue_error(&self, error: ToneError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    /// Get recorded requests
    pub fn recorded_requests(&self) -> Vec<AnalyzeRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next_response(&self, request: &AnalyzeRequest) -> Result<Analysis, ToneError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ToneError::transport("No mock response queued")))
    }
}

impl Default for MockToneService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToneService for MockToneService {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<Analysis, ToneError> {
        self.next_response(request)
    }

    async fn supported_tones(&self) -> Result<Vec<String>, ToneError> {
        Ok(self.tones.clone())
    }

    async fn health(&self) -> Result<HealthReport, ToneError> {
        Ok(HealthReport {
            status: "healthy".to_string(),
            model_loaded: Some(true),
            database_connected: Some(true),
        })
    }

    fn endpoint(&self) -> &str {
        "mock://tone"
    }
}

// ============================================================================
// Delayed Mock Tone Service (for timeout and overlap testing)
// ============================================================================

/// Mock tone service with a fixed delay before each answer
pub struct DelayedMockToneService {
    inner: MockToneService,
    delay: Duration,
    /// Notified when a request starts (for test synchronization)
    pub request_started: Arc<Notify>,
}

impl DelayedMockToneService {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockToneService::new(),
            delay,
            request_started: Arc::new(Notify::new()),
        }
    }

    pub fn queue_analysis(&self, analysis: Analysis) {
        self.inner.queue_analysis(analysis);
    }

    pub fn recorded_requests(&self) -> Vec<AnalyzeRequest> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl ToneService for DelayedMockToneService {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<Analysis, ToneError> {
        self.request_started.notify_waiters();
        tokio::time::sleep(self.delay).await;
        self.inner.next_response(request)
    }

    async fn supported_tones(&self) -> Result<Vec<String>, ToneError> {
        self.inner.supported_tones().await
    }

    async fn health(&self) -> Result<HealthReport, ToneError> {
        self.inner.health().await
    }

    fn endpoint(&self) -> &str {
        "mock://tone-delayed"
    }
}

// ============================================================================
// Panicking Mock Tone Service
// ============================================================================

/// Tone service whose every call panics
pub struct PanickingToneService;

#[async_trait]
impl ToneService for PanickingToneService {
    async fn analyze(&self, _request: &AnalyzeRequest) -> Result<Analysis, ToneError> {
        panic!("tone service exploded");
    }

    async fn supported_tones(&self) -> Result<Vec<String>, ToneError> {
        panic!("tone service exploded");
    }

    async fn health(&self) -> Result<HealthReport, ToneError> {
        panic!("tone service exploded");
    }

    fn endpoint(&self) -> &str {
        "mock://tone-panicking"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_tone_service() {
        let mock = MockToneService::new();
        mock.queue_analysis(analysis("hi", "positive", "Hi!"));

        let request = AnalyzeRequest::new("hi", None);
        let response = mock.analyze(&request).await.unwrap();
        assert_eq!(response.detected_tone, "positive");

        // Second call should fail (no more responses)
        let result = mock.analyze(&request).await;
        assert!(result.is_err());
        assert_eq!(mock.recorded_requests().len(), 2);
    }
}
