//! Tone service client
//!
//! The tone service classifies the tone of a piece of text and returns a
//! rewritten version. It is an opaque HTTP collaborator; this module owns
//! its wire contract and error taxonomy.

mod error;
mod http;
mod types;

pub use error::{ToneError, ToneErrorKind};
pub use http::HttpToneService;
pub use types::{AnalyzeRequest, Analysis, HealthReport};

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for tone service backends
#[async_trait]
pub trait ToneService: Send + Sync {
    /// Classify and rewrite one piece of text
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<Analysis, ToneError>;

    /// Tones the service accepts as `target_tone`
    async fn supported_tones(&self) -> Result<Vec<String>, ToneError>;

    /// Service health as reported by the service itself
    async fn health(&self) -> Result<HealthReport, ToneError>;

    /// Human-readable location of the service, for logs
    fn endpoint(&self) -> &str;
}

#[async_trait]
impl<T: ToneService + ?Sized> ToneService for Arc<T> {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<Analysis, ToneError> {
        (**self).analyze(request).await
    }

    async fn supported_tones(&self) -> Result<Vec<String>, ToneError> {
        (**self).supported_tones().await
    }

    async fn health(&self) -> Result<HealthReport, ToneError> {
        (**self).health().await
    }

    fn endpoint(&self) -> &str {
        (**self).endpoint()
    }
}

/// Logging wrapper for tone services
pub struct LoggingToneService<S> {
    inner: S,
}

impl<S: ToneService> LoggingToneService<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<S: ToneService> ToneService for LoggingToneService<S> {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<Analysis, ToneError> {
        let start = std::time::Instant::now();
        let result = self.inner.analyze(request).await;
        let duration = start.elapsed();

        match &result {
            Ok(analysis) => {
                tracing::info!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    input_chars = request.text.chars().count(),
                    target_tone = request.target_tone.as_deref().unwrap_or("-"),
                    detected_tone = %analysis.detected_tone,
                    "Tone analysis completed"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.inner.endpoint(),
                    duration_ms = %duration.as_millis(),
                    kind = %e.kind,
                    status = e.status,
                    error = %e.message,
                    "Tone analysis failed"
                );
            }
        }

        result
    }

    async fn supported_tones(&self) -> Result<Vec<String>, ToneError> {
        let result = self.inner.supported_tones().await;
        if let Err(e) = &result {
            tracing::warn!(kind = %e.kind, error = %e.message, "Supported tones lookup failed");
        }
        result
    }

    async fn health(&self) -> Result<HealthReport, ToneError> {
        let result = self.inner.health().await;
        match &result {
            Ok(report) => tracing::debug!(status = %report.status, "Tone service health"),
            Err(e) => tracing::warn!(kind = %e.kind, error = %e.message, "Health check failed"),
        }
        result
    }

    fn endpoint(&self) -> &str {
        self.inner.endpoint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::testing::{analysis, MockToneService};

    #[tokio::test]
    async fn test_logging_service_passes_results_through() {
        let mock = Arc::new(MockToneService::new());
        mock.queue_analysis(analysis("hi", "friendly", "Hi there!"));
        mock.queue_error(ToneError::protocol(500, "model overloaded"));
        let service = LoggingToneService::new(Arc::clone(&mock));

        let request = AnalyzeRequest::new("hi", Some("friendly".into()));
        let ok = service.analyze(&request).await.unwrap();
        assert_eq!(ok, analysis("hi", "friendly", "Hi there!"));

        let err = service.analyze(&request).await.unwrap_err();
        assert_eq!(err.kind, ToneErrorKind::Protocol);
        assert_eq!(err.status, Some(500));
        assert_eq!(err.message, "model overloaded");

        assert_eq!(mock.recorded_requests(), vec![request.clone(), request]);
        assert_eq!(
            service.supported_tones().await.unwrap(),
            vec!["sad", "angry", "friendly"]
        );
        assert!(service.health().await.unwrap().is_healthy());
        assert_eq!(service.endpoint(), "mock://tone");
    }
}
