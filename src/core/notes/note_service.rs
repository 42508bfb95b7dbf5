// Note service - create, list, read, edit and delete personal notes.
//
// Every read or write of a single note goes through the ownership guard;
// slugs are resolved (explicit or derived from the title) and checked for
// global uniqueness before anything is written.

use super::note_models::{Note, NoteDraft, NoteForm, NoteId, NOTE_TITLE_MAX_LENGTH};
use super::slugs::{self, SLUG_MAX_LENGTH};
use crate::core::access::{authorize_owner, AccessError};
use crate::core::accounts::{User, UserId};
use crate::core::forms::{self, FormErrors};
use crate::core::storage::StoreError;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum NoteError {
    #[error("Invalid form: {0:?}")]
    Invalid(FormErrors),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait NoteStore: Send + Sync {
    /// Fails with `StoreError::Conflict` if the slug is taken.
    async fn insert_note(&self, author_id: UserId, draft: &NoteDraft) -> Result<Note, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Note>, StoreError>;

    /// Whether any note other than `except` uses `slug`.
    async fn slug_taken(&self, slug: &str, except: Option<NoteId>) -> Result<bool, StoreError>;

    /// The author's notes in creation order.
    async fn notes_by_author(&self, author_id: UserId) -> Result<Vec<Note>, StoreError>;

    /// Overwrite title/text/slug. Fails with `StoreError::Conflict` if the
    /// new slug is taken.
    async fn update_note(&self, note_id: NoteId, draft: &NoteDraft) -> Result<(), StoreError>;

    async fn delete_note(&self, note_id: NoteId) -> Result<(), StoreError>;

    #[cfg(test)]
    async fn count_notes(&self) -> Result<u64, StoreError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct NoteService {
    store: Arc<dyn NoteStore>,
}

impl NoteService {
    pub fn new(store: Arc<dyn NoteStore>) -> Self {
        Self { store }
    }

    /// Validate a submitted form into a draft.
    ///
    /// `editing` is the note being edited, so it doesn't collide with itself.
    async fn validate(
        &self,
        form: &NoteForm,
        editing: Option<NoteId>,
    ) -> Result<NoteDraft, NoteError> {
        let title = form.title.trim();
        let mut errors = FormErrors::new();
        forms::require(&mut errors, "title", title);
        forms::max_length(&mut errors, "title", title, NOTE_TITLE_MAX_LENGTH);
        forms::require(&mut errors, "text", &form.text);

        let slug = match form.explicit_slug() {
            Some(explicit) => {
                forms::max_length(&mut errors, "slug", explicit, SLUG_MAX_LENGTH);
                explicit.to_string()
            }
            None => slugs::slug_from_title(title),
        };
        // A blank title already carries its own error; don't pile on a slug one.
        let derived_from_blank = form.explicit_slug().is_none() && title.is_empty();
        if !derived_from_blank && !slugs::is_valid_slug(&slug) {
            errors.add("slug", slugs::INVALID_SLUG);
        }

        if errors.field("slug").is_empty()
            && !slug.is_empty()
            && self.store.slug_taken(&slug, editing).await?
        {
            tracing::warn!("Slug {:?} already taken", slug);
            errors.add("slug", slugs::duplicate_slug_message(&slug));
        }
        errors.into_result().map_err(NoteError::Invalid)?;

        Ok(NoteDraft {
            title: title.to_string(),
            text: form.text.clone(),
            slug,
        })
    }

    /// Create a note owned by `author`.
    pub async fn create(&self, author: &User, form: &NoteForm) -> Result<Note, NoteError> {
        let draft = self.validate(form, None).await?;
        let note = self
            .store
            .insert_note(author.id, &draft)
            .await
            .map_err(|e| conflict_as_form_error(e, &draft.slug))?;
        tracing::info!("User {} created note {} ({})", author.id, note.id, note.slug);
        Ok(note)
    }

    /// All notes written by `author`; never anybody else's.
    pub async fn list_for(&self, author: &User) -> Result<Vec<Note>, NoteError> {
        Ok(self.store.notes_by_author(author.id).await?)
    }

    /// A note by slug, if and only if `user` wrote it.
    pub async fn owned_note(&self, slug: &str, user: &User) -> Result<Note, NoteError> {
        let found = self.store.find_by_slug(slug).await?;
        Ok(authorize_owner(found, user)?)
    }

    /// Apply a validated form to the user's own note.
    pub async fn edit(&self, slug: &str, user: &User, form: &NoteForm) -> Result<Note, NoteError> {
        let note = self.owned_note(slug, user).await?;
        let draft = self.validate(form, Some(note.id)).await?;

        self.store
            .update_note(note.id, &draft)
            .await
            .map_err(|e| conflict_as_form_error(e, &draft.slug))?;
        tracing::info!(
            "User {} edited note {} ({} -> {})",
            user.id,
            note.id,
            note.slug,
            draft.slug
        );

        Ok(Note {
            id: note.id,
            title: draft.title,
            text: draft.text,
            slug: draft.slug,
            author_id: note.author_id,
        })
    }

    /// Delete the user's own note.
    pub async fn delete(&self, slug: &str, user: &User) -> Result<Note, NoteError> {
        let note = self.owned_note(slug, user).await?;
        self.store.delete_note(note.id).await?;
        tracing::info!("User {} deleted note {}", user.id, note.id);
        Ok(note)
    }

    #[cfg(test)]
    pub async fn note_count(&self) -> Result<u64, NoteError> {
        Ok(self.store.count_notes().await?)
    }
}

/// A unique-constraint hit that slipped past the pre-check (concurrent
/// writer) is reported exactly like the pre-check would have.
fn conflict_as_form_error(err: StoreError, slug: &str) -> NoteError {
    match err {
        StoreError::Conflict(_) => NoteError::Invalid(FormErrors::single(
            "slug",
            slugs::duplicate_slug_message(slug),
        )),
        other => other.into(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::notes::slugs::WARNING;
    use crate::infra::notes::InMemoryNoteStore;

    const TITLE: &str = "Заголовок";
    const TEXT: &str = "Текст";
    const SLUG: &str = "unique_slug";

    fn user(id: i64, name: &str) -> User {
        User {
            id,
            username: name.to_string(),
        }
    }

    fn service() -> NoteService {
        NoteService::new(Arc::new(InMemoryNoteStore::new()))
    }

    fn form(title: &str, text: &str, slug: Option<&str>) -> NoteForm {
        NoteForm {
            title: title.to_string(),
            text: text.to_string(),
            slug: slug.map(str::to_string),
        }
    }

    fn expect_slug_error(result: Result<Note, NoteError>) -> Vec<String> {
        match result {
            Err(NoteError::Invalid(errors)) => errors.field("slug").to_vec(),
            other => panic!("expected slug error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_authorized_user_can_create_note() {
        let service = service();
        let author = user(1, "Автор");

        let note = service
            .create(&author, &form(TITLE, TEXT, Some(SLUG)))
            .await
            .unwrap();

        assert_eq!(service.note_count().await.unwrap(), 1);
        assert_eq!(note.title, TITLE);
        assert_eq!(note.text, TEXT);
        assert_eq!(note.slug, SLUG);
        assert_eq!(note.author_id, author.id);
    }

    #[tokio::test]
    async fn test_create_without_slug_derives_it_from_title() {
        let service = service();
        let author = user(1, "Автор");

        for (index, blank) in [None, Some(""), Some("   ")].into_iter().enumerate() {
            let title = format!("{TITLE} {index}");
            let note = service
                .create(&author, &form(&title, TEXT, blank))
                .await
                .unwrap();
            assert_eq!(note.slug, slugs::slug_from_title(&title));
        }
        assert_eq!(service.note_count().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_derived_slug_is_truncated() {
        let service = service();
        let title = "я".repeat(NOTE_TITLE_MAX_LENGTH);

        let note = service
            .create(&user(1, "Автор"), &form(&title, TEXT, None))
            .await
            .unwrap();

        assert_eq!(note.slug.chars().count(), SLUG_MAX_LENGTH);
        assert_eq!(note.slug, slugs::slug_from_title(&title));
    }

    #[tokio::test]
    async fn test_cant_create_note_with_not_unique_slug() {
        let service = service();
        let author = user(1, "Автор");
        let other = user(2, "Посетитель");
        service
            .create(&author, &form(TITLE, TEXT, Some(SLUG)))
            .await
            .unwrap();

        let errors = expect_slug_error(
            service
                .create(&other, &form("Любой заголовок", "Любой текст", Some(SLUG)))
                .await,
        );

        assert_eq!(errors, vec![format!("{SLUG}{WARNING}")]);
        assert_eq!(service.note_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_derived_slug_collision_is_reported() {
        let service = service();
        let author = user(1, "Автор");
        service
            .create(&author, &form(TITLE, TEXT, None))
            .await
            .unwrap();

        let errors = expect_slug_error(service.create(&author, &form(TITLE, TEXT, None)).await);

        assert_eq!(errors, vec![format!("zagolovok{WARNING}")]);
    }

    #[tokio::test]
    async fn test_invalid_explicit_slug() {
        let service = service();

        let errors = expect_slug_error(
            service
                .create(&user(1, "Автор"), &form(TITLE, TEXT, Some("bad slug")))
                .await,
        );

        assert_eq!(errors, vec![slugs::INVALID_SLUG.to_string()]);
    }

    #[tokio::test]
    async fn test_list_contains_only_own_notes() {
        let service = service();
        let author = user(1, "Автор");
        let visitor = user(2, "Посетитель");
        let note = service
            .create(&author, &form(TITLE, TEXT, Some("author_slug")))
            .await
            .unwrap();

        assert!(service.list_for(&author).await.unwrap().contains(&note));
        assert!(!service.list_for(&visitor).await.unwrap().contains(&note));
    }

    #[tokio::test]
    async fn test_author_can_edit_note() {
        let service = service();
        let author = user(1, "Автор");
        service
            .create(&author, &form(TITLE, TEXT, Some(SLUG)))
            .await
            .unwrap();

        let edited = service
            .edit(
                SLUG,
                &author,
                &form("Измененный заголовок", "Измененный текст", Some("new_slug")),
            )
            .await
            .unwrap();

        assert_eq!(edited.slug, "new_slug");
        let stored = service.owned_note("new_slug", &author).await.unwrap();
        assert_eq!(stored.title, "Измененный заголовок");
        assert_eq!(stored.text, "Измененный текст");
        assert!(matches!(
            service.owned_note(SLUG, &author).await,
            Err(NoteError::Access(AccessError::NotFound))
        ));
    }

    #[tokio::test]
    async fn test_edit_may_keep_own_slug() {
        let service = service();
        let author = user(1, "Автор");
        service
            .create(&author, &form(TITLE, TEXT, Some(SLUG)))
            .await
            .unwrap();

        let edited = service
            .edit(SLUG, &author, &form("Новый", "Новый текст", Some(SLUG)))
            .await
            .unwrap();

        assert_eq!(edited.slug, SLUG);
        assert_eq!(edited.title, "Новый");
    }

    #[tokio::test]
    async fn test_other_user_cant_touch_note() {
        let service = service();
        let author = user(1, "Автор");
        let visitor = user(2, "Посетитель");
        service
            .create(&author, &form(TITLE, TEXT, Some(SLUG)))
            .await
            .unwrap();

        assert!(matches!(
            service.owned_note(SLUG, &visitor).await,
            Err(NoteError::Access(AccessError::NotFound))
        ));
        assert!(matches!(
            service
                .edit(SLUG, &visitor, &form("Чужой", "Чужой", Some("new_slug")))
                .await,
            Err(NoteError::Access(AccessError::NotFound))
        ));
        assert!(matches!(
            service.delete(SLUG, &visitor).await,
            Err(NoteError::Access(AccessError::NotFound))
        ));

        let unchanged = service.owned_note(SLUG, &author).await.unwrap();
        assert_eq!(unchanged.title, TITLE);
        assert_eq!(unchanged.text, TEXT);
        assert_eq!(service.note_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_author_can_delete_note() {
        let service = service();
        let author = user(1, "Автор");
        service
            .create(&author, &form(TITLE, TEXT, Some(SLUG)))
            .await
            .unwrap();

        service.delete(SLUG, &author).await.unwrap();

        assert_eq!(service.note_count().await.unwrap(), 0);
    }
}
