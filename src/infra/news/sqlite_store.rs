// SQLite-backed news store.
//
// Tables:
// - news: id, title, text, publication date (YYYY-MM-DD)
// - comments: text and creation time, tied to one news item and one author;
//   deleting a news item deletes its comments
//
// Timestamps are written as fixed-width RFC 3339 UTC strings so that
// ORDER BY on the text column is chronological.

use crate::core::accounts::User;
use crate::core::news::{Comment, CommentId, NewComment, News, NewsId, NewsStore};
use crate::core::storage::StoreError;
use crate::infra::database::storage_error;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};

const DATE_FORMAT: &str = "%Y-%m-%d";

pub struct SqliteNewsStore {
    pool: Pool<Sqlite>,
}

impl SqliteNewsStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    ///
    /// Expects the `users` table to exist already.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS news (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                text TEXT NOT NULL,
                date TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                news_id INTEGER NOT NULL REFERENCES news(id) ON DELETE CASCADE,
                author_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                text TEXT NOT NULL,
                created TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_comments_news ON comments (news_id, created)")
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(())
    }
}

fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn news_from_row(row: &SqliteRow) -> Result<News, StoreError> {
    let date_str: String = row.get("date");
    let date = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
        .map_err(|e| StoreError::Backend(format!("bad news date {date_str:?}: {e}")))?;
    Ok(News {
        id: row.get("id"),
        title: row.get("title"),
        text: row.get("text"),
        date,
    })
}

fn comment_from_row(row: &SqliteRow) -> Result<Comment, StoreError> {
    let created_str: String = row.get("created");
    let created = DateTime::parse_from_rfc3339(&created_str)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StoreError::Backend(format!("bad comment timestamp {created_str:?}: {e}")))?;
    Ok(Comment {
        id: row.get("id"),
        news_id: row.get("news_id"),
        author: User {
            id: row.get("author_id"),
            username: row.get("username"),
        },
        text: row.get("text"),
        created,
    })
}

const COMMENT_COLUMNS: &str = r#"
    SELECT comments.id, comments.news_id, comments.author_id, comments.text,
           comments.created, users.username
    FROM comments
    JOIN users ON users.id = comments.author_id
"#;

#[async_trait]
impl NewsStore for SqliteNewsStore {
    async fn insert_news(&self, title: &str, text: &str, date: NaiveDate) -> Result<News, StoreError> {
        let result = sqlx::query("INSERT INTO news (title, text, date) VALUES (?, ?, ?)")
            .bind(title)
            .bind(text)
            .bind(date.format(DATE_FORMAT).to_string())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(News {
            id: result.last_insert_rowid(),
            title: title.to_string(),
            text: text.to_string(),
            date,
        })
    }

    async fn count_news(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM news")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(row.get::<i64, _>("total") as u64)
    }

    async fn latest_news(&self, limit: usize) -> Result<Vec<News>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, text, date
            FROM news
            ORDER BY date DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.iter().map(news_from_row).collect()
    }

    async fn get_news(&self, news_id: NewsId) -> Result<Option<News>, StoreError> {
        let row = sqlx::query("SELECT id, title, text, date FROM news WHERE id = ?")
            .bind(news_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(news_from_row).transpose()
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO comments (news_id, author_id, text, created)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(comment.news_id)
        .bind(comment.author.id)
        .bind(&comment.text)
        .bind(format_timestamp(comment.created))
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(Comment {
            id: result.last_insert_rowid(),
            news_id: comment.news_id,
            author: comment.author,
            text: comment.text,
            created: comment.created,
        })
    }

    async fn get_comment(&self, comment_id: CommentId) -> Result<Option<Comment>, StoreError> {
        let row = sqlx::query(&format!("{COMMENT_COLUMNS} WHERE comments.id = ?"))
            .bind(comment_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        row.as_ref().map(comment_from_row).transpose()
    }

    async fn comments_for(&self, news_id: NewsId) -> Result<Vec<Comment>, StoreError> {
        let rows = sqlx::query(&format!(
            "{COMMENT_COLUMNS} WHERE comments.news_id = ? ORDER BY comments.created ASC, comments.id ASC"
        ))
        .bind(news_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        rows.iter().map(comment_from_row).collect()
    }

    async fn update_comment_text(&self, comment_id: CommentId, text: &str) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE comments SET text = ? WHERE id = ?")
            .bind(text)
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn delete_comment(&self, comment_id: CommentId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(comment_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    #[cfg(test)]
    async fn count_comments(&self) -> Result<u64, StoreError> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM comments")
            .fetch_one(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(row.get::<i64, _>("total") as u64)
    }
}
