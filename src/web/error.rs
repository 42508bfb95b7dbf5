// Mapping of service errors onto HTTP responses.
//
// - Login required: 302 to the login page, carrying the requested path
// - Not found (including somebody else's object): 404
// - Storage failures: logged, 500

use super::pages::redirect;
use super::urls;
use crate::core::access::AccessError;
use crate::core::accounts::AccountError;
use crate::core::forms::FormErrors;
use crate::core::news::NewsError;
use crate::core::notes::NoteError;
use crate::core::storage::StoreError;
use axum::extract::rejection::{FormRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Access(#[from] AccessError),

    #[error("Not found")]
    NotFound,

    #[error("Invalid request: {0:?}")]
    BadRequest(FormErrors),

    /// Unreadable form body. Only surfaced once the access checks passed.
    #[error(transparent)]
    FormBody(#[from] FormRejection),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for WebError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::NotFound => WebError::NotFound,
            other => WebError::Internal(other.to_string()),
        }
    }
}

/// A path that doesn't parse (`/news/abc/`) matches no page.
impl From<PathRejection> for WebError {
    fn from(e: PathRejection) -> Self {
        tracing::debug!("Unmatched path parameter: {}", e);
        WebError::NotFound
    }
}

impl From<AccountError> for WebError {
    fn from(e: AccountError) -> Self {
        match e {
            AccountError::Invalid(errors) => WebError::BadRequest(errors),
            AccountError::Hashing(message) => WebError::Internal(message),
            AccountError::Store(e) => e.into(),
        }
    }
}

impl From<NewsError> for WebError {
    fn from(e: NewsError) -> Self {
        match e {
            NewsError::Invalid(errors) => WebError::BadRequest(errors),
            NewsError::NewsNotFound(_) => WebError::NotFound,
            NewsError::Access(e) => WebError::Access(e),
            NewsError::Store(e) => e.into(),
        }
    }
}

impl From<NoteError> for WebError {
    fn from(e: NoteError) -> Self {
        match e {
            NoteError::Invalid(errors) => WebError::BadRequest(errors),
            NoteError::Access(e) => WebError::Access(e),
            NoteError::Store(e) => e.into(),
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::Access(AccessError::LoginRequired { next }) => {
                redirect(&urls::login_with_next(&next))
            }
            WebError::Access(AccessError::NotFound) | WebError::NotFound => {
                (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." }))).into_response()
            }
            WebError::BadRequest(errors) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "errors": errors }))).into_response()
            }
            WebError::FormBody(rejection) => rejection.into_response(),
            WebError::Internal(message) => {
                tracing::error!("Request failed: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "detail": "Internal server error." })),
                )
                    .into_response()
            }
        }
    }
}
