// Account service - signup, login, logout and session resolution.
//
// Passwords are stored as PBKDF2-SHA256 PHC strings
// (`$pbkdf2-sha256$i=<rounds>,l=32$<salt>$<hash>`) with a random per-user
// salt. Sessions are random alphanumeric tokens.

use super::accounts_models::{LoginForm, Session, SignupForm, StoredUser, User, UserId};
use crate::core::forms::{self, FormErrors, NON_FIELD_ERRORS};
use crate::core::storage::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use pbkdf2::{Params, Pbkdf2};
use rand::distributions::Alphanumeric;
use rand::Rng;
use std::sync::Arc;
use thiserror::Error;

pub const USERNAME_MAX_LENGTH: usize = 150;
const SESSION_TOKEN_LENGTH: usize = 32;
const SALT_LENGTH: usize = 16;
const HASH_LENGTH: usize = 32;

/// PBKDF2 work factor. Stored in each hash, so raising it only affects new
/// passwords.
#[cfg(not(test))]
const HASH_ROUNDS: u32 = 600_000;
#[cfg(test)]
const HASH_ROUNDS: u32 = 1_000;

pub const USERNAME_TAKEN: &str = "A user with that username already exists.";
pub const USERNAME_INVALID: &str =
    "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.";
pub const PASSWORD_MISMATCH: &str = "The two password fields didn't match.";
pub const INVALID_LOGIN: &str =
    "Please enter a correct username and password. Note that both fields may be case-sensitive.";

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("Invalid form: {0:?}")]
    Invalid(FormErrors),

    #[error("Password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create a user. Fails with `StoreError::Conflict` if the username exists.
    async fn create_user(&self, username: &str, password_hash: &str) -> Result<User, StoreError>;

    /// Look up a user and its password hash by username.
    async fn find_by_username(&self, username: &str) -> Result<Option<StoredUser>, StoreError>;

    async fn get_user(&self, user_id: UserId) -> Result<Option<User>, StoreError>;

    async fn create_session(&self, session: Session) -> Result<(), StoreError>;

    /// Resolve a session token to its user.
    async fn find_session_user(&self, token: &str) -> Result<Option<User>, StoreError>;

    async fn delete_session(&self, token: &str) -> Result<(), StoreError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Register a new user from the signup form.
    pub async fn signup(&self, form: &SignupForm) -> Result<User, AccountError> {
        let username = form.username.trim();

        let mut errors = FormErrors::new();
        forms::require(&mut errors, "username", username);
        forms::max_length(&mut errors, "username", username, USERNAME_MAX_LENGTH);
        if !username.is_empty() && !is_valid_username(username) {
            errors.add("username", USERNAME_INVALID);
        }
        forms::require(&mut errors, "password1", &form.password1);
        forms::require(&mut errors, "password2", &form.password2);
        if !form.password1.is_empty()
            && !form.password2.is_empty()
            && form.password1 != form.password2
        {
            errors.add("password2", PASSWORD_MISMATCH);
        }
        if errors.field("username").is_empty()
            && self.store.find_by_username(username).await?.is_some()
        {
            errors.add("username", USERNAME_TAKEN);
        }
        errors.into_result().map_err(AccountError::Invalid)?;

        let password_hash = hash_password(&form.password1)?;
        match self.store.create_user(username, &password_hash).await {
            Ok(user) => {
                tracing::info!("Registered user {} ({})", user.username, user.id);
                Ok(user)
            }
            Err(StoreError::Conflict(_)) => Err(AccountError::Invalid(FormErrors::single(
                "username",
                USERNAME_TAKEN,
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Check credentials and open a session.
    ///
    /// # Returns
    /// The user and the new session token.
    pub async fn login(&self, form: &LoginForm) -> Result<(User, String), AccountError> {
        let mut errors = FormErrors::new();
        forms::require(&mut errors, "username", &form.username);
        forms::require(&mut errors, "password", &form.password);
        errors.into_result().map_err(AccountError::Invalid)?;

        let stored = self.store.find_by_username(form.username.trim()).await?;
        let user = match stored {
            Some(stored) if verify_password(&form.password, &stored.password_hash) => stored.user,
            _ => {
                tracing::warn!("Failed login attempt for {}", form.username);
                return Err(AccountError::Invalid(FormErrors::single(
                    NON_FIELD_ERRORS,
                    INVALID_LOGIN,
                )));
            }
        };

        let token = self.open_session(user.id).await?;
        tracing::info!("User {} logged in", user.username);
        Ok((user, token))
    }

    /// Open a session for an already authenticated user.
    pub async fn open_session(&self, user_id: UserId) -> Result<String, AccountError> {
        let token = new_session_token();
        self.store
            .create_session(Session {
                token: token.clone(),
                user_id,
                created_at: Utc::now(),
            })
            .await?;
        Ok(token)
    }

    pub async fn logout(&self, token: &str) -> Result<(), AccountError> {
        self.store.delete_session(token).await?;
        tracing::debug!("Session closed");
        Ok(())
    }

    /// The user owning `token`, if the session exists.
    pub async fn current_user(&self, token: &str) -> Result<Option<User>, AccountError> {
        Ok(self.store.find_session_user(token).await?)
    }
}

fn is_valid_username(username: &str) -> bool {
    username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
}

fn new_session_token() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SESSION_TOKEN_LENGTH)
        .map(char::from)
        .collect()
}

/// Hash a password with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, AccountError> {
    let mut salt = [0u8; SALT_LENGTH];
    rand::thread_rng().fill(&mut salt);
    let salt = SaltString::encode_b64(&salt).map_err(|e| AccountError::Hashing(e.to_string()))?;
    let params = Params {
        rounds: HASH_ROUNDS,
        output_length: HASH_LENGTH,
    };

    let hash = Pbkdf2
        .hash_password_customized(password.as_bytes(), None, None, params, &salt)
        .map_err(|e| AccountError::Hashing(e.to_string()))?;
    Ok(hash.to_string())
}

/// Check `password` against an encoded hash produced by [`hash_password`].
///
/// The digest comparison is constant-time. Anything that doesn't parse as
/// a PBKDF2 hash never matches.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    match PasswordHash::new(encoded) {
        Ok(parsed) => Pbkdf2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

// ============================================================================
// TESTS
// ============================================================================
