// SQLite-backed account store.
//
// Tables:
// - users: id, unique username, salted password hash
// - sessions: login session tokens, removed on logout or user deletion

use crate::core::accounts::{AccountStore, Session, StoredUser, User, UserId};
use crate::core::storage::StoreError;
use crate::infra::database::storage_error;
use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteAccountStore {
    pool: Pool<Sqlite>,
}

impl SqliteAccountStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                username TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL,
                date_joined TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS sessions (
                token TEXT PRIMARY KEY,
                user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                created_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(())
    }
}

#[async_trait]
impl AccountStore for SqliteAccountStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, date_joined)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(username)
        .bind(password_hash)
        .bind(chrono::Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(User {
            id: result.last_insert_rowid(),
            username: username.to_string(),
        })
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>, StoreError> {
        let row = sqlx::query("SELECT id, username, password_hash FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.map(|r| StoredUser {
            user: User {
                id: r.get("id"),
                username: r.get("username"),
            },
            password_hash: r.get("password_hash"),
        }))
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT id, username FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_error)?;

        Ok(row.map(|r| User {
            id: r.get("id"),
            username: r.get("username"),
        }))
    }

    async fn create_session(&self, session: Session) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO sessions (token, user_id, created_at) VALUES (?, ?, ?)")
            .bind(&session.token)
            .bind(session.user_id)
            .bind(session.created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }

    async fn find_session_user(&self, token: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT users.id, users.username
            FROM sessions
            JOIN users ON users.id = sessions.user_id
            WHERE sessions.token = ?
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(|r| User {
            id: r.get("id"),
            username: r.get("username"),
        }))
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;
        Ok(())
    }
}
