// Banned-word filter for comment text.
//
// A comment containing any banned word anywhere (case-insensitive substring
// match) is rejected as a whole; nothing is saved.

use crate::core::forms::{self, FormErrors};

pub const BAD_WORDS: &[&str] = &["редиска", "негодяй"];

/// Message attached to the `text` field when a banned word is found.
pub const WARNING: &str = "Не ругайтесь!";

/// Outcome of screening a piece of comment text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModerationVerdict {
    Clean,
    Banned { word: &'static str },
}

/// Screen `text` against [`BAD_WORDS`].
pub fn screen(text: &str) -> ModerationVerdict {
    let lowered = text.to_lowercase();
    BAD_WORDS
        .iter()
        .find(|word| lowered.contains(&word.to_lowercase()))
        .map_or(ModerationVerdict::Clean, |word| ModerationVerdict::Banned {
            word: *word,
        })
}

/// Validate a submitted comment body: required, and free of banned words.
pub fn validate_comment_text(text: &str) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();
    forms::require(&mut errors, "text", text);
    if let ModerationVerdict::Banned { word } = screen(text) {
        tracing::warn!("Rejected comment containing banned word {:?}", word);
        errors.add("text", WARNING);
    }
    errors.into_result()
}
