//! Transcript entry types

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Opaque entry identifier. Unique, carries no ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Who authored an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// Tone metadata from a successful exchange.
///
/// The detected tone and the rewrite travel together: an entry carries
/// both or neither.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToneAnnotation {
    pub detected_tone: String,
    pub rewritten_body: String,
}

/// One chat line. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptEntry {
    id: EntryId,
    body: String,
    role: Role,
    created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    annotation: Option<ToneAnnotation>,
}

impl TranscriptEntry {
    fn new(role: Role, body: String, annotation: Option<ToneAnnotation>) -> Self {
        Self {
            id: EntryId::new(),
            body,
            role,
            created_at: Utc::now(),
            annotation,
        }
    }

    pub fn user(body: impl Into<String>) -> Self {
        Self::new(Role::User, body.into(), None)
    }

    /// Assistant entry without tone metadata (welcome, fallback)
    pub fn assistant(body: impl Into<String>) -> Self {
        Self::new(Role::Assistant, body.into(), None)
    }

    /// Assistant entry for a successful exchange
    pub fn annotated_reply(body: impl Into<String>, annotation: ToneAnnotation) -> Self {
        Self::new(Role::Assistant, body.into(), Some(annotation))
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn detected_tone(&self) -> Option<&str> {
        self.annotation.as_ref().map(|a| a.detected_tone.as_str())
    }

    pub fn rewritten_body(&self) -> Option<&str> {
        self.annotation.as_ref().map(|a| a.rewritten_body.as_str())
    }
}
