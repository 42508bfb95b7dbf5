// In-memory implementation of AccountStore.
//
// Used when no DATABASE_URL is configured, and by the web tests.
// DashMap gives us lock-free concurrent access from many request tasks.

use crate::core::accounts::{AccountStore, Session, StoredUser, User, UserId};
use crate::core::storage::StoreError;
use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

pub struct InMemoryAccountStore {
    /// Maps username -> user row
    users: DashMap<String, StoredUser>,
    /// Maps user id -> username
    usernames: DashMap<UserId, String>,
    /// Maps session token -> user id
    sessions: DashMap<String, UserId>,
    next_id: AtomicI64,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self {
            users: DashMap::new(),
            usernames: DashMap::new(),
            sessions: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError> {
        // entry() holds the shard lock, so two signups can't both win.
        match self.users.entry(username.to_string()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(format!(
                "username {username} already exists"
            ))),
            Entry::Vacant(slot) => {
                let user = User {
                    id: self.next_id.fetch_add(1, Ordering::SeqCst),
                    username: username.to_string(),
                };
                slot.insert(StoredUser {
                    user: user.clone(),
                    password_hash: password_hash.to_string(),
                });
                self.usernames.insert(user.id, user.username.clone());
                Ok(user)
            }
        }
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>, StoreError> {
        Ok(self.users.get(username).map(|entry| entry.clone()))
    }

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError> {
        let Some(username) = self.usernames.get(&user_id).map(|name| name.clone()) else {
            return Ok(None);
        };
        Ok(self.users.get(&username).map(|entry| entry.user.clone()))
    }

    async fn create_session(&self, session: Session) -> Result<(), StoreError> {
        if !self.usernames.contains_key(&session.user_id) {
            return Err(StoreError::NotFound);
        }
        self.sessions.insert(session.token, session.user_id);
        Ok(())
    }

    async fn find_session_user(&self, token: &str) -> Result<Option<User>, StoreError> {
        let Some(user_id) = self.sessions.get(token).map(|id| *id) else {
            return Ok(None);
        };
        self.get_user(user_id).await
    }

    async fn delete_session(&self, token: &str) -> Result<(), StoreError> {
        self.sessions.remove(token);
        Ok(())
    }
}
