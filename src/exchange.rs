//! Exchange coordination
//!
//! One exchange = user entry appended, tone service called, reply (or
//! fallback) appended. The pending flag brackets the service call.

mod coordinator;

#[cfg(test)]
pub mod testing;

pub use coordinator::{ExchangeCoordinator, DEFAULT_WAIT_WINDOW};

use std::str::FromStr;

/// What happens when `submit` is called while another exchange is in flight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdmissionPolicy {
    /// Wait for the in-flight exchange to finish before starting.
    /// Transcripts never interleave.
    #[default]
    Serialized,
    /// Start immediately; completions append in whatever order they land.
    Concurrent,
}

impl FromStr for AdmissionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "serialized" | "serial" => Ok(Self::Serialized),
            "concurrent" => Ok(Self::Concurrent),
            other => Err(format!(
                "unknown admission policy '{other}' (expected 'serialized' or 'concurrent')"
            )),
        }
    }
}
