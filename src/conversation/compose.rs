//! Assistant reply text

use std::borrow::Cow;

pub const WELCOME_MESSAGE: &str =
    "Hi! Send me a message and I'll detect its tone and suggest a rewrite.";

/// Body of every failed exchange, whatever the cause
pub const FALLBACK_MESSAGE: &str =
    "Sorry, I couldn't analyze that message right now. Please try again.";

const REPLY_HEADER: &str = "Tone analysis complete";

/// Display form of a tone
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToneLabel {
    pub glyph: &'static str,
    pub label: Cow<'static, str>,
}

impl std::fmt::Display for ToneLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.glyph, self.label)
    }
}

const KNOWN_TONES: &[(&str, &str, &str)] = &[
    ("positive", "Positive", "😊"),
    ("negative", "Negative", "😟"),
    ("neutral", "Neutral", "😐"),
    ("friendly", "Friendly", "🤗"),
    ("professional", "Professional", "💼"),
    ("formal", "Formal", "🎩"),
    ("sad", "Sad", "😢"),
    ("angry", "Angry", "😠"),
];

/// Look up a tone's label. Unrecognized values still echo the raw tone.
pub fn tone_label(raw: &str) -> ToneLabel {
    let key = raw.trim();
    KNOWN_TONES
        .iter()
        .find(|(name, _, _)| name.eq_ignore_ascii_case(key))
        .map_or_else(
            || ToneLabel {
                glyph: "❔",
                label: Cow::Owned(format!("Unknown tone ({key})")),
            },
            |&(_, label, glyph)| ToneLabel {
                glyph,
                label: Cow::Borrowed(label),
            },
        )
}

/// Summary shown for a successful exchange: header, tone, rewrite verbatim
pub fn compose_reply(detected_tone: &str, rewritten: &str) -> String {
    format!(
        "{REPLY_HEADER}\nDetected tone: {}\nSuggested rewrite:\n{rewritten}",
        tone_label(detected_tone)
    )
}
