//! Client configuration
//!
//! Everything comes from environment variables. The service URL can also
//! be baked in at build time through `TONE_API_BASE_URL`.

use crate::exchange::{AdmissionPolicy, DEFAULT_WAIT_WINDOW};
use std::str::FromStr;
use std::time::Duration;

const FALLBACK_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_MAX_INPUT_CHARS: usize = 2000;

/// Configuration for the chat client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Tone service base URL, without trailing slash
    pub base_url: String,
    /// Wait window for one tone service call
    pub request_timeout: Duration,
    /// Input ceiling enforced by the chat front-end, in characters
    pub max_input_chars: usize,
    /// Target tone sent with every message until changed
    pub target_tone: Option<String>,
    pub admission: AdmissionPolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: DEFAULT_WAIT_WINDOW,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            target_tone: None,
            admission: AdmissionPolicy::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparseable values keep their
    /// defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let value = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let base_url = value("TONE_API_BASE_URL")
            .unwrap_or(defaults.base_url)
            .trim_end_matches('/')
            .to_string();

        let request_timeout = parse_or("TONE_REQUEST_TIMEOUT_SECS", value("TONE_REQUEST_TIMEOUT_SECS"))
            .filter(|secs: &u64| *secs > 0)
            .map_or(defaults.request_timeout, Duration::from_secs);

        let max_input_chars = parse_or("TONE_MAX_INPUT_CHARS", value("TONE_MAX_INPUT_CHARS"))
            .filter(|n: &usize| *n > 0)
            .unwrap_or(defaults.max_input_chars);

        let admission = parse_or("TONE_ADMISSION", value("TONE_ADMISSION"))
            .unwrap_or(defaults.admission);

        Self {
            base_url,
            request_timeout,
            max_input_chars,
            target_tone: value("TONE_TARGET"),
            admission,
        }
    }
}

fn default_base_url() -> String {
    option_env!("TONE_API_BASE_URL")
        .unwrap_or(FALLBACK_BASE_URL)
        .trim_end_matches('/')
        .to_string()
}

fn parse_or<T>(key: &str, raw: Option<String>) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = raw?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, value = %raw, error = %e, "Ignoring invalid setting");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> ClientConfig {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        ClientConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert_eq!(cfg.request_timeout, Duration::from_secs(30));
        assert_eq!(cfg.max_input_chars, 2000);
        assert_eq!(cfg.target_tone, None);
        assert_eq!(cfg.admission, AdmissionPolicy::Serialized);
        assert!(!cfg.base_url.ends_with('/'));
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("TONE_API_BASE_URL", "https://tone.example.com/"),
            ("TONE_REQUEST_TIMEOUT_SECS", "20"),
            ("TONE_MAX_INPUT_CHARS", "500"),
            ("TONE_TARGET", "friendly"),
            ("TONE_ADMISSION", "concurrent"),
        ]);
        assert_eq!(cfg.base_url, "https://tone.example.com");
        assert_eq!(cfg.request_timeout, Duration::from_secs(20));
        assert_eq!(cfg.max_input_chars, 500);
        assert_eq!(cfg.target_tone.as_deref(), Some("friendly"));
        assert_eq!(cfg.admission, AdmissionPolicy::Concurrent);
    }

    #[test]
    fn test_invalid_values_keep_defaults() {
        let cfg = config(&[
            ("TONE_REQUEST_TIMEOUT_SECS", "soon"),
            ("TONE_MAX_INPUT_CHARS", "0"),
            ("TONE_TARGET", "   "),
            ("TONE_ADMISSION", "lottery"),
        ]);
        assert_eq!(cfg, ClientConfig {
            base_url: cfg.base_url.clone(),
            ..ClientConfig::default()
        });
    }
}
