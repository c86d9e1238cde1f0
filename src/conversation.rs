//! Conversation transcript
//!
//! The transcript is append-only during a session; only a full clear
//! removes entries. Ordering is append order, never timestamps or ids.

mod compose;
mod entry;
mod store;

#[cfg(test)]
mod proptests;

pub use compose::{compose_reply, tone_label, FALLBACK_MESSAGE, WELCOME_MESSAGE};
pub use entry::{Role, ToneAnnotation, TranscriptEntry};
pub use store::{ConversationStore, ConversationView, StoreEvent};
