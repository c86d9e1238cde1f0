//! HTTP tone service implementation

use super::types::{AnalyzeRequest, AnalyzeResponseBody, Analysis, HealthReport, SupportedTonesBody};
use super::{ToneError, ToneService};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;

const ANALYZE_PATH: &str = "/api/v1/tone/analyze-tone";
const SUPPORTED_TONES_PATH: &str = "/api/v1/tone/supported-tones";
const HEALTH_PATH: &str = "/health";

/// Tone service reached over HTTP/JSON
pub struct HttpToneService {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl HttpToneService {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ToneError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ToneError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn classify_send_error(&self, e: &reqwest::Error) -> ToneError {
        if e.is_timeout() {
            ToneError::transport(format!(
                "Request timed out after {}s",
                self.timeout.as_secs_f32()
            ))
        } else if e.is_connect() {
            ToneError::transport(format!("Could not reach tone service: {e}"))
        } else {
            ToneError::transport(format!("Request failed: {e}"))
        }
    }

    /// Send a request and read the whole body
    async fn execute(&self, request: reqwest::RequestBuilder) -> Result<(StatusCode, String), ToneError> {
        let response = request
            .send()
            .await
            .map_err(|e| self.classify_send_error(&e))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| self.classify_send_error(&e))?;

        Ok((status, body))
    }
}

#[async_trait]
impl ToneService for HttpToneService {
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<Analysis, ToneError> {
        let (status, body) = self
            .execute(self.client.post(self.url(ANALYZE_PATH)).json(request))
            .await?;

        if !status.is_success() {
            return Err(ToneError::from_error_body(status.as_u16(), &body));
        }

        let parsed: AnalyzeResponseBody = serde_json::from_str(&body).map_err(|e| {
            ToneError::contract(format!("Unexpected response from tone service: {e}"))
                .with_status(status.as_u16())
        })?;

        let missing = parsed.missing_fields();
        if !missing.is_empty() {
            tracing::warn!(
                kind = "contract",
                missing = ?missing,
                "Tone service response incomplete, substituting defaults"
            );
        }

        Ok(parsed.into_analysis(&request.text))
    }

    async fn supported_tones(&self) -> Result<Vec<String>, ToneError> {
        let (status, body) = self
            .execute(self.client.get(self.url(SUPPORTED_TONES_PATH)))
            .await?;

        if !status.is_success() {
            return Err(ToneError::from_error_body(status.as_u16(), &body));
        }

        let parsed: SupportedTonesBody = serde_json::from_str(&body).map_err(|e| {
            ToneError::contract(format!("Unexpected supported tones response: {e}"))
                .with_status(status.as_u16())
        })?;
        Ok(parsed.supported_tones)
    }

    async fn health(&self) -> Result<HealthReport, ToneError> {
        let (status, body) = self.execute(self.client.get(self.url(HEALTH_PATH))).await?;

        // An unhealthy service answers 503 with a regular report
        if status.is_success() || status == StatusCode::SERVICE_UNAVAILABLE {
            if let Ok(report) = serde_json::from_str::<HealthReport>(&body) {
                return Ok(report);
            }
            if status.is_success() {
                return Err(ToneError::contract("Unexpected health response")
                    .with_status(status.as_u16()));
            }
        }

        Err(ToneError::from_error_body(status.as_u16(), &body))
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }
}
