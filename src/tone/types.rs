//! Wire types for the tone service

use serde::{Deserialize, Serialize};

/// Tone reported when the service omits one
pub const DEFAULT_TONE: &str = "neutral";

/// Body of `POST /api/v1/tone/analyze-tone`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnalyzeRequest {
    pub text: String,
    /// Omitted from the JSON entirely when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_tone: Option<String>,
}

impl AnalyzeRequest {
    pub fn new(text: impl Into<String>, target_tone: Option<String>) -> Self {
        Self {
            text: text.into(),
            target_tone,
        }
    }
}

/// A successful analysis, after default substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub original_text: String,
    pub detected_tone: String,
    pub rewritten_text: String,
}

/// Raw 2xx body. Every field may be missing, `null` or empty; anything
/// that does not fit this shape (wrong types, not an object) is a
/// contract failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyzeResponseBody {
    #[serde(default)]
    pub original_text: Option<String>,
    #[serde(default)]
    pub detected_tone: Option<String>,
    #[serde(default)]
    pub improvised_text: Option<String>,
}

impl AnalyzeResponseBody {
    /// Names of the fields that will be replaced by defaults
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("original_text", &self.original_text),
            ("detected_tone", &self.detected_tone),
            ("improvised_text", &self.improvised_text),
        ]
        .into_iter()
        .filter(|(_, value)| present(value).is_none())
        .map(|(name, _)| name)
        .collect()
    }

    /// Substitute defaults: the submitted text for the original and
    /// rewritten text, and [`DEFAULT_TONE`] for the tone.
    pub fn into_analysis(self, submitted_text: &str) -> Analysis {
        Analysis {
            original_text: present(&self.original_text)
                .unwrap_or(submitted_text)
                .to_string(),
            detected_tone: present(&self.detected_tone)
                .unwrap_or(DEFAULT_TONE)
                .to_string(),
            rewritten_text: present(&self.improvised_text)
                .unwrap_or(submitted_text)
                .to_string(),
        }
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}

/// Body of `GET /api/v1/tone/supported-tones`
#[derive(Debug, Clone, Deserialize)]
pub struct SupportedTonesBody {
    pub supported_tones: Vec<String>,
    #[serde(default)]
    #[allow(dead_code)] // Informational only
    pub description: Option<String>,
}

/// Body of `GET /health` (200 and 503 share the shape)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub model_loaded: Option<bool>,
    #[serde(default)]
    pub database_connected: Option<bool>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}
