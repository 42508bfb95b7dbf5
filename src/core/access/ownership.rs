// Ownership guard for detail/edit/delete on user-owned content.
//
// Two steps, in this order:
// 1. The requester must be logged in, otherwise they are sent to the login
//    page with the original path preserved.
// 2. The object is looked up by key and then compared against the requester.
//    A missing object and somebody else's object look exactly the same to
//    the caller: not found.

use crate::core::accounts::{User, UserId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("Login required to access {next}")]
    LoginRequired { next: String },

    #[error("Not found")]
    NotFound,
}

/// Anything that has exactly one owning user.
pub trait Owned {
    fn owner_id(&self) -> UserId;
}

/// Step 1: turn an optional principal into an authenticated one.
///
/// `requested_path` is the full path (with query) the anonymous visitor
/// tried to open; it comes back as the `next` of the login redirect.
pub fn require_login<'a>(
    user: Option<&'a User>,
    requested_path: &str,
) -> Result<&'a User, AccessError> {
    user.ok_or_else(|| AccessError::LoginRequired {
        next: requested_path.to_string(),
    })
}

/// Step 2: authorize a looked-up object for `user`.
pub fn authorize_owner<T: Owned>(found: Option<T>, user: &User) -> Result<T, AccessError> {
    match found {
        Some(item) if item.owner_id() == user.id => Ok(item),
        Some(_) => {
            tracing::warn!("User {} denied access to another user's object", user.id);
            Err(AccessError::NotFound)
        }
        None => Err(AccessError::NotFound),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Thing {
        owner: UserId,
    }

    impl Owned for Thing {
        fn owner_id(&self) -> UserId {
            self.owner
        }
    }

    fn user(id: UserId) -> User {
        User {
            id,
            username: format!("user{id}"),
        }
    }

    #[test]
    fn test_anonymous_is_sent_to_login_with_next() {
        let err = require_login(None, "/notes/edit/abc/").unwrap_err();
        assert_eq!(
            err,
            AccessError::LoginRequired {
                next: "/notes/edit/abc/".to_string()
            }
        );
    }

    #[test]
    fn test_authenticated_passes_login_check() {
        let author = user(1);
        assert_eq!(require_login(Some(&author), "/x/").unwrap(), &author);
    }

    #[test]
    fn test_owner_is_authorized() {
        let thing = authorize_owner(Some(Thing { owner: 7 }), &user(7)).unwrap();
        assert_eq!(thing.owner, 7);
    }

    #[test]
    fn test_non_owner_and_missing_look_the_same() {
        let foreign = authorize_owner(Some(Thing { owner: 7 }), &user(8)).unwrap_err();
        let missing = authorize_owner::<Thing>(None, &user(8)).unwrap_err();

        assert_eq!(foreign, AccessError::NotFound);
        assert_eq!(foreign, missing);
    }
}
