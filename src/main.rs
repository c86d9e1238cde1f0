//! Tone Chat - terminal client for a tone analysis service
//!
//! Each message is sent to the tone service, which detects its tone and
//! suggests a rewrite. The transcript lives in memory for the session.

mod chat;
mod config;
mod conversation;
mod exchange;
mod tone;

use chat::ChatSession;
use config::ClientConfig;
use conversation::{ConversationStore, TranscriptEntry, WELCOME_MESSAGE};
use exchange::ExchangeCoordinator;
use std::sync::Arc;
use tone::{HttpToneService, LoggingToneService};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so they never mix with the transcript
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tone_chat=warn".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ClientConfig::from_env();
    tracing::info!(
        base_url = %config.base_url,
        timeout_secs = config.request_timeout.as_secs(),
        admission = ?config.admission,
        "Starting tone chat"
    );

    let service = LoggingToneService::new(HttpToneService::new(
        &config.base_url,
        config.request_timeout,
    )?);

    let store = Arc::new(ConversationStore::seeded(TranscriptEntry::assistant(
        WELCOME_MESSAGE,
    )));
    let coordinator = ExchangeCoordinator::new(store, service)
        .with_wait_window(config.request_timeout)
        .with_admission(config.admission);

    let session = ChatSession::new(
        Arc::new(coordinator),
        config.target_tone.clone(),
        config.max_input_chars,
    );
    chat::run(session).await?;

    Ok(())
}
