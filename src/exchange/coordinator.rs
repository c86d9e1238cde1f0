//! Exchange coordinator
//!
//! Runs one request/response cycle per `submit` and keeps the store
//! consistent whatever the outcome. Failures never escape: every
//! exchange ends with exactly one reply entry and the pending flag
//! cleared.

use super::AdmissionPolicy;
use crate::conversation::{
    compose_reply, ConversationStore, ConversationView, ToneAnnotation, TranscriptEntry,
    FALLBACK_MESSAGE,
};
use crate::tone::{AnalyzeRequest, Analysis, ToneError, ToneService};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Longest wait for the tone service before giving up
pub const DEFAULT_WAIT_WINDOW: Duration = Duration::from_secs(30);

/// How an exchange ended. The reply has already been appended.
#[derive(Debug, Clone)]
pub enum ExchangeOutcome {
    Answered {
        reply: TranscriptEntry,
    },
    /// The fallback reply was appended; `error` is for transient display
    /// only and is not stored in the transcript.
    Failed {
        reply: TranscriptEntry,
        error: ToneError,
    },
}

impl ExchangeOutcome {
    pub fn reply(&self) -> &TranscriptEntry {
        match self {
            Self::Answered { reply } | Self::Failed { reply, .. } => reply,
        }
    }

    pub fn error(&self) -> Option<&ToneError> {
        match self {
            Self::Answered { .. } => None,
            Self::Failed { error, .. } => Some(error),
        }
    }

}

/// Sole writer of a conversation store
pub struct ExchangeCoordinator<S> {
    store: Arc<ConversationStore>,
    service: S,
    wait_window: Duration,
    admission: AdmissionPolicy,
    /// Held for a whole exchange under [`AdmissionPolicy::Serialized`]
    turn: tokio::sync::Mutex<()>,
    in_flight: Mutex<usize>,
}

impl<S: ToneService> ExchangeCoordinator<S> {
    pub fn new(store: Arc<ConversationStore>, service: S) -> Self {
        Self {
            store,
            service,
            wait_window: DEFAULT_WAIT_WINDOW,
            admission: AdmissionPolicy::default(),
            turn: tokio::sync::Mutex::new(()),
            in_flight: Mutex::new(0),
        }
    }

    pub fn with_wait_window(mut self, wait_window: Duration) -> Self {
        self.wait_window = wait_window;
        self
    }

    pub fn with_admission(mut self, admission: AdmissionPolicy) -> Self {
        self.admission = admission;
        self
    }

    /// Read-only access for presentation code
    pub fn view(&self) -> ConversationView {
        ConversationView::new(Arc::clone(&self.store))
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Empty the transcript; the pending flag is left alone
    pub fn clear(&self) {
        self.store.clear();
        tracing::debug!("Transcript cleared");
    }

    /// Run one exchange.
    ///
    /// No validation happens here: whatever text arrives is appended and
    /// sent. The pending flag is set after the user entry is appended and
    /// cleared after the reply is appended, on every exit path including
    /// a panicking service or a dropped future.
    pub async fn submit(
        &self,
        user_text: impl Into<String>,
        target_tone: Option<String>,
    ) -> ExchangeOutcome {
        let _turn = match self.admission {
            AdmissionPolicy::Serialized => Some(self.turn.lock().await),
            AdmissionPolicy::Concurrent => None,
        };

        let user_text = user_text.into();
        let user_entry = TranscriptEntry::user(user_text.clone());
        let exchange_id = user_entry.id();
        self.store.append(user_entry);

        let _pending = PendingGuard::engage(&self.store, &self.in_flight);

        tracing::debug!(
            exchange = %exchange_id,
            input_chars = user_text.chars().count(),
            target_tone = target_tone.as_deref().unwrap_or("-"),
            "Exchange started"
        );

        let request = AnalyzeRequest::new(user_text, target_tone);
        let outcome = match self.call_service(&request).await {
            Ok(analysis) => {
                tracing::info!(
                    exchange = %exchange_id,
                    detected_tone = %analysis.detected_tone,
                    "Exchange answered"
                );
                ExchangeOutcome::Answered {
                    reply: annotated_reply(analysis),
                }
            }
            Err(error) => {
                tracing::warn!(
                    exchange = %exchange_id,
                    kind = %error.kind,
                    status = error.status,
                    error = %error.message,
                    "Exchange failed, appending fallback reply"
                );
                ExchangeOutcome::Failed {
                    reply: TranscriptEntry::assistant(FALLBACK_MESSAGE),
                    error,
                }
            }
        };

        self.store.append(outcome.reply().clone());
        outcome
    }

    /// Call the service, bounded by the wait window, with panics turned
    /// into errors
    async fn call_service(&self, request: &AnalyzeRequest) -> Result<Analysis, ToneError> {
        let call = AssertUnwindSafe(self.service.analyze(request)).catch_unwind();

        match tokio::time::timeout(self.wait_window, call).await {
            Ok(Ok(result)) => result,
            Ok(Err(panic)) => Err(ToneError::internal(format!(
                "Tone service panicked: {}",
                panic_message(panic.as_ref())
            ))),
            Err(_) => Err(ToneError::transport(format!(
                "No response within {}s",
                self.wait_window.as_secs_f32()
            ))),
        }
    }
}

fn annotated_reply(analysis: Analysis) -> TranscriptEntry {
    let body = compose_reply(&analysis.detected_tone, &analysis.rewritten_text);
    TranscriptEntry::annotated_reply(
        body,
        ToneAnnotation {
            detected_tone: analysis.detected_tone,
            rewritten_body: analysis.rewritten_text,
        },
    )
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

/// Keeps the pending flag raised while at least one exchange is in flight
struct PendingGuard<'a> {
    store: &'a ConversationStore,
    in_flight: &'a Mutex<usize>,
}

impl<'a> PendingGuard<'a> {
    fn engage(store: &'a ConversationStore, in_flight: &'a Mutex<usize>) -> Self {
        let mut count = in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *count += 1;
        if *count == 1 {
            store.set_pending(true);
        }
        Self { store, in_flight }
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        let mut count = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.store.set_pending(false);
        }
    }
}
