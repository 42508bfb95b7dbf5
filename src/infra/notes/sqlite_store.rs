// SQLite-backed note store.
//
// Tables:
// - notes: title, text, globally unique slug, author

use crate::core::accounts::UserId;
use crate::core::notes::{Note, NoteDraft, NoteId, NoteStore};
use crate::core::storage::StoreError;
use crate::infra::database::storage_error;
use async_trait::async_trait;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteNoteStore {
    pool: Pool<Sqlite>,
}

impl SqliteNoteStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    ///
    /// Expects the `users` table to exist already.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notes (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                text TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }
}

fn note_from_row(row: &SqliteRow) -> Note {
    Note {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        slug: row.get("slug"),
        author_id: row.get("author_id"),
    }
}

#[async_trait]
impl NoteStore for SqliteNoteStore {
    async fn insert_note(&self, author_id: UserId, draft: &NoteDraft) -> Result<Note, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO notes (title, text, slug, author_id)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.text)
        .bind(&draft.slug)
        .bind(author_id)
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(Note {
            id: result.last_insert_rowid(),
            title: draft.title.clone(),
            text: draft.text.clone(),
            slug: draft.slug.clone(),
            author_id,
        })
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Note>, StoreError> {
        let row = sqlx::query("SELECT id, title, text, slug, author_id FROM notes WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.as_ref().map(note_from_row))
    }

    async fn slug_taken(&self, slug: &str, except: Option<NoteId>) -> Result<bool, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM notes WHERE slug = ? AND (? IS NULL OR id != ?)
            ) AS taken
            "#,
        )
        .bind(slug)
        .bind(except)
        .bind(except)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.get::<i64, _>("taken") != 0)
    }

    async fn notes_by_author(&self, author_id: UserId) -> Result<Vec<Note>, StoreError> {
        let rows = sqlx::query(
            "SELECT id, title, text, slug, author_id FROM notes WHERE author_id = ? ORDER BY id",
        )
        .bind(author_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(rows.iter().map(note_from_row).collect())
    }

    async fn update_note(&self, note_id: NoteId, draft: &NoteDraft) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE notes SET title = ?, text = ?, slug = ? WHERE id = ?")
            .bind(&draft.title)
            .bind(&draft.text)
            .bind(&draft.slug)
            .bind(note_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_note(&self, note_id: NoteId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM notes WHERE id = ?")
            .bind(note_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    #[cfg(test)]
    async fn count_notes(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM notes")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(row.get::<i64, _>("total") as u64)
    }
}
