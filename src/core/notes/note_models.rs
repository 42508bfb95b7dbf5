// Notes domain models - personal notes and the note form.

use crate::core::access::Owned;
use crate::core::accounts::UserId;
use serde::{Deserialize, Serialize};

pub type NoteId = i64;

pub const NOTE_TITLE_MAX_LENGTH: usize = 100;

/// A private note. Only its author may see, edit or delete it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub title: String,
    pub text: String,
    /// Unique across all notes, not just the author's.
    pub slug: String,
    pub author_id: UserId,
}

impl Owned for Note {
    fn owner_id(&self) -> UserId {
        self.author_id
    }
}

/// Validated note content, slug already resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub text: String,
    pub slug: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NoteForm {
    pub title: String,
    pub text: String,
    /// Blank or missing means "derive from the title".
    pub slug: Option<String>,
}

impl NoteForm {
    /// The explicitly submitted slug, if it is not blank.
    pub fn explicit_slug(&self) -> Option<&str> {
        self.slug
            .as_deref()
            .map(str::trim)
            .filter(|slug| !slug.is_empty())
    }
}

impl From<&Note> for NoteForm {
    fn from(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            text: note.text.clone(),
            slug: Some(note.slug.clone()),
        }
    }
}
