//! Terminal chat front-end
//!
//! Reads lines from stdin, submits them through the coordinator and
//! renders the transcript from store notifications. Input rules (trim,
//! non-empty, length ceiling) live here, not in the coordinator.

use crate::conversation::{tone_label, ConversationView, Role, StoreEvent, TranscriptEntry};
use crate::exchange::ExchangeCoordinator;
use crate::tone::{ToneError, ToneErrorKind, ToneService};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;

const HELP: &str = "Commands:
  /tone <name>   rewrite towards a tone (/tone off to reset)
  /tones         list tones the service supports
  /health        check the tone service
  /history       show the transcript with times
  /export        print the transcript as JSON
  /clear         clear the transcript
  /quit          leave";

/// One line of user input, classified
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Empty,
    Message(String),
    TooLong { chars: usize, max: usize },
    Command(Command),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    /// `None` shows the current target tone
    Tone(Option<String>),
    Tones,
    Health,
    History,
    Export,
    Quit,
    Unknown(String),
}

pub fn parse_line(line: &str, max_chars: usize) -> Input {
    let text = line.trim();
    if text.is_empty() {
        return Input::Empty;
    }

    if let Some(rest) = text.strip_prefix('/') {
        let mut parts = rest.splitn(2, char::is_whitespace);
        let name = parts.next().unwrap_or_default().to_ascii_lowercase();
        let arg = parts.next().map(str::trim).filter(|a| !a.is_empty());
        let command = match name.as_str() {
            "help" | "?" => Command::Help,
            "clear" => Command::Clear,
            "tone" => Command::Tone(arg.map(str::to_string)),
            "tones" => Command::Tones,
            "health" => Command::Health,
            "history" => Command::History,
            "export" => Command::Export,
            "quit" | "exit" => Command::Quit,
            _ => Command::Unknown(name),
        };
        return Input::Command(command);
    }

    let chars = text.chars().count();
    if chars > max_chars {
        return Input::TooLong {
            chars,
            max: max_chars,
        };
    }
    Input::Message(text.to_string())
}

/// What the front-end should do after a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    None,
    /// Printed on stdout
    Info(String),
    /// Transient notice on stderr
    Warning(String),
    Quit,
}

/// A line on its way to the terminal
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Stdout(String),
    Stderr(String),
}

pub struct ChatSession<S> {
    coordinator: Arc<ExchangeCoordinator<S>>,
    target_tone: Option<String>,
    max_input_chars: usize,
}

impl<S: ToneService> ChatSession<S> {
    pub fn new(
        coordinator: Arc<ExchangeCoordinator<S>>,
        target_tone: Option<String>,
        max_input_chars: usize,
    ) -> Self {
        Self {
            coordinator,
            target_tone,
            max_input_chars,
        }
    }

    pub fn view(&self) -> ConversationView {
        self.coordinator.view()
    }

    pub async fn handle_line(&mut self, line: &str) -> Reply {
        match parse_line(line, self.max_input_chars) {
            Input::Empty => Reply::None,
            Input::TooLong { chars, max } => Reply::Warning(format!(
                "Message is {chars} characters; the limit is {max}"
            )),
            Input::Message(text) => {
                let outcome = self
                    .coordinator
                    .submit(text, self.target_tone.clone())
                    .await;
                outcome
                    .error()
                    .map_or(Reply::None, |e| self.failure_notice(e))
            }
            Input::Command(command) => self.run_command(command).await,
        }
    }

    async fn run_command(&mut self, command: Command) -> Reply {
        match command {
            Command::Help => Reply::Info(HELP.to_string()),
            Command::Clear => {
                self.coordinator.clear();
                Reply::None
            }
            Command::Tone(None) => Reply::Info(match &self.target_tone {
                Some(tone) => format!("Target tone: {tone}"),
                None => "No target tone set".to_string(),
            }),
            Command::Tone(Some(tone)) => {
                if matches!(tone.to_ascii_lowercase().as_str(), "off" | "none") {
                    self.target_tone = None;
                    Reply::Info("Target tone cleared".to_string())
                } else {
                    let reply = Reply::Info(format!("Target tone set to {tone}"));
                    self.target_tone = Some(tone);
                    reply
                }
            }
            Command::Tones => match self.coordinator.service().supported_tones().await {
                Ok(tones) if tones.is_empty() => Reply::Info("The service lists no tones".into()),
                Ok(tones) => Reply::Info(format!("Supported tones: {}", tones.join(", "))),
                Err(e) => self.failure_notice(&e),
            },
            Command::Health => {
                let service = self.coordinator.service();
                match service.health().await {
                    Ok(report) => {
                        let mut line = format!("Tone service at {}: {}", service.endpoint(), report.status);
                        if let Some(loaded) = report.model_loaded {
                            line.push_str(if loaded { " (model loaded)" } else { " (model not loaded)" });
                        }
                        if report.database_connected == Some(false) {
                            line.push_str(" (database disconnected)");
                        }
                        if report.is_healthy() {
                            Reply::Info(line)
                        } else {
                            Reply::Warning(line)
                        }
                    }
                    Err(e) => self.failure_notice(&e),
                }
            }
            Command::History => {
                let now = Utc::now();
                let view = self.view();
                let transcript = view.snapshot();
                if transcript.is_empty() {
                    return Reply::Info("(empty)".to_string());
                }
                let mut lines: Vec<String> =
                    transcript.iter().map(|e| summarize_entry(e, now)).collect();
                if view.is_pending() {
                    lines.push("… analyzing".to_string());
                }
                Reply::Info(lines.join("\n"))
            }
            Command::Export => {
                let transcript = self.view().snapshot();
                match serde_json::to_string_pretty(&*transcript) {
                    Ok(json) => Reply::Info(json),
                    Err(e) => Reply::Warning(format!("Export failed: {e}")),
                }
            }
            Command::Quit => Reply::Quit,
            Command::Unknown(name) => Reply::Warning(format!("Unknown command /{name}, try /help")),
        }
    }

    fn failure_notice(&self, error: &ToneError) -> Reply {
        match error.kind {
            ToneErrorKind::Transport => Reply::Warning(format!(
                "{} ({})",
                error.message,
                self.coordinator.service().endpoint()
            )),
            _ => Reply::Warning(error.message.clone()),
        }
    }
}

/// Drive a session from stdin until EOF or `/quit`
pub async fn run<S: ToneService + 'static>(mut session: ChatSession<S>) -> std::io::Result<()> {
    let view = session.view();
    // Subscribe before rendering the snapshot so nothing falls in between
    let mut events = view.subscribe();
    let now = Utc::now();
    for entry in view.snapshot().iter() {
        println!("{}", render_entry(entry, now));
    }
    drop(view);

    let (reply_tx, reply_rx) = mpsc::unbounded_channel();
    let renderer = tokio::spawn(render(events, reply_rx, |output| match output {
        Output::Stdout(text) => println!("{text}"),
        Output::Stderr(text) => eprintln!("{text}"),
    }));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match session.handle_line(&line).await {
            Reply::None => {}
            Reply::Quit => break,
            reply => {
                if reply_tx.send(reply).is_err() {
                    break;
                }
            }
        }
    }

    // Closing both channels lets the renderer drain and stop
    drop(reply_tx);
    drop(session);
    if let Err(e) = renderer.await {
        tracing::warn!(error = %e, "Renderer task ended abnormally");
    }
    Ok(())
}

/// Print store events and replies in the order they happened.
///
/// Store events are taken before queued replies, so a failure notice
/// never shows up ahead of the fallback entry it explains.
async fn render(
    mut events: broadcast::Receiver<StoreEvent>,
    mut replies: mpsc::UnboundedReceiver<Reply>,
    mut emit: impl FnMut(Output),
) {
    let mut events_open = true;
    loop {
        tokio::select! {
            biased;
            event = events.recv(), if events_open => match event {
                Ok(event) => {
                    if let Some(text) = render_event(&event, Utc::now()) {
                        emit(Output::Stdout(text));
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Renderer fell behind, use /history to resync");
                }
                Err(RecvError::Closed) => events_open = false,
            },
            reply = replies.recv() => match reply {
                Some(Reply::Info(text)) => emit(Output::Stdout(text)),
                Some(Reply::Warning(text)) => emit(Output::Stderr(format!("! {text}"))),
                Some(Reply::None | Reply::Quit) => {}
                None => break,
            },
        }
    }
}

pub fn render_event(event: &StoreEvent, now: DateTime<Utc>) -> Option<String> {
    match event {
        StoreEvent::Appended(entry) => Some(render_entry(entry, now)),
        StoreEvent::PendingChanged(true) => Some("… analyzing".to_string()),
        StoreEvent::PendingChanged(false) => None,
        StoreEvent::Cleared => Some("(transcript cleared)".to_string()),
    }
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::User => "you",
        Role::Assistant => "toner",
    }
}

pub fn render_entry(entry: &TranscriptEntry, now: DateTime<Utc>) -> String {
    let body = entry.body().replace('\n', "\n    ");
    format!(
        "[{} · {}]\n    {body}",
        speaker(entry.role()),
        relative_time(entry.created_at(), now)
    )
}

/// One line per entry; tone replies shrink to label and rewrite
pub fn summarize_entry(entry: &TranscriptEntry, now: DateTime<Utc>) -> String {
    let text = match (entry.detected_tone(), entry.rewritten_body()) {
        (Some(tone), Some(rewrite)) => format!("{} → {rewrite}", tone_label(tone)),
        _ => entry.body().to_string(),
    };
    format!(
        "[{} · {}] {}",
        speaker(entry.role()),
        relative_time(entry.created_at(), now),
        text.replace('\n', " ")
    )
}

pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = now.signed_duration_since(then);
    if elapsed.num_seconds() < 60 {
        "just now".to_string()
    } else if elapsed.num_minutes() < 60 {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed.num_hours() < 24 {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}
