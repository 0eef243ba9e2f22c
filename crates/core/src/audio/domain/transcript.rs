use serde::Serialize;

/// Outcome of recognizing one audio clip.
///
/// Silence is a normal outcome, not an error: the caption is simply blank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "text", rename_all = "snake_case")]
pub enum Transcript {
    Speech(String),
    NoSpeech,
}

impl Transcript {
    /// Collapses whitespace; empty text becomes [`Transcript::NoSpeech`].
    pub fn from_text(text: &str) -> Self {
        let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if normalized.is_empty() {
            Transcript::NoSpeech
        } else {
            Transcript::Speech(normalized)
        }
    }

    pub fn caption_text(&self) -> &str {
        match self {
            Transcript::Speech(text) => text,
            Transcript::NoSpeech => "",
        }
    }
}
