// In-memory implementation of NoteStore.
//
// A second map from slug to note id plays the role of the UNIQUE(slug)
// constraint: a slug is claimed through entry() before the note is written.

use crate::core::accounts::UserId;
use crate::core::notes::{Note, NoteDraft, NoteId, NoteStore};
use crate::core::storage::StoreError;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

pub struct InMemoryNoteStore {
    notes: DashMap<NoteId, Note>,
    /// Maps slug -> owning note id
    slugs: DashMap<String, NoteId>,
    next_id: AtomicI64,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self {
            notes: DashMap::new(),
            slugs: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    fn claim_slug(&self, slug: &str, note_id: NoteId) -> Result<(), StoreError> {
        match self.slugs.entry(slug.to_string()) {
            Entry::Occupied(owner) if *owner.get() != note_id => {
                Err(StoreError::Conflict(format!("slug {slug} already exists")))
            }
            Entry::Occupied(_) => Ok(()),
            Entry::Vacant(slot) => {
                slot.insert(note_id);
                Ok(())
            }
        }
    }
}

impl Default for InMemoryNoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NoteStore for InMemoryNoteStore {
    async fn insert_note(&self, author_id: UserId, draft: &NoteDraft) -> Result<Note, StoreError> {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.claim_slug(&draft.slug, id)?;

        let note = Note {
            id,
            title: draft.title.clone(),
            text: draft.text.clone(),
            slug: draft.slug.clone(),
            author_id,
        };
        self.notes.insert(id, note.clone());
        Ok(note)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Note>, StoreError> {
        let Some(note_id) = self.slugs.get(slug).map(|id| *id) else {
            return Ok(None);
        };
        Ok(self.notes.get(&note_id).map(|note| note.clone()))
    }

    async fn slug_taken(&self, slug: &str, except: Option<NoteId>) -> Result<bool, StoreError> {
        Ok(self
            .slugs
            .get(slug)
            .is_some_and(|owner| Some(*owner) != except))
    }

    async fn notes_by_author(&self, author_id: UserId) -> Result<Vec<Note>, StoreError> {
        let mut notes: Vec<Note> = self
            .notes
            .iter()
            .filter(|entry| entry.author_id == author_id)
            .map(|entry| entry.value().clone())
            .collect();
        notes.sort_by_key(|note| note.id);
        Ok(notes)
    }

    async fn update_note(&self, note_id: NoteId, draft: &NoteDraft) -> Result<(), StoreError> {
        let old_slug = match self.notes.get(&note_id) {
            Some(note) => note.slug.clone(),
            None => return Err(StoreError::NotFound),
        };

        if old_slug != draft.slug {
            self.claim_slug(&draft.slug, note_id)?;
            self.slugs.remove(&old_slug);
        }

        if let Some(mut note) = self.notes.get_mut(&note_id) {
            note.title = draft.title.clone();
            note.text = draft.text.clone();
            note.slug = draft.slug.clone();
        }
        Ok(())
    }

    async fn delete_note(&self, note_id: NoteId) -> Result<(), StoreError> {
        if let Some((_, note)) = self.notes.remove(&note_id) {
            self.slugs.remove(&note.slug);
        }
        Ok(())
    }

    #[cfg(test)]
    async fn count_notes(&self) -> Result<u64, StoreError> {
        Ok(self.notes.len() as u64)
    }
}
