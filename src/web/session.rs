// Cookie sessions and the `Viewer` extractor.

use super::error::WebError;
use super::state::AppState;
use crate::core::access::{self, AccessError};
use crate::core::accounts::User;
use axum::extract::{FromRequestParts, OriginalUri};
use axum::http::request::Parts;
use axum::http::{header, HeaderMap};

pub const SESSION_COOKIE: &str = "sessionid";

/// Who is making the request, and what they asked for.
#[derive(Debug, Clone)]
pub struct Viewer {
    pub user: Option<User>,
    /// Requested path with query, used as `next` for the login redirect.
    pub path: String,
    pub session: Option<String>,
}

impl Viewer {
    pub fn require_user(&self) -> Result<&User, AccessError> {
        access::require_login(self.user.as_ref(), &self.path)
    }
}

impl FromRequestParts<AppState> for Viewer {
    type Rejection = WebError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Nested routers strip their prefix from `parts.uri`.
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map(|original| original.0.clone())
            .unwrap_or_else(|| parts.uri.clone());
        let path = uri
            .path_and_query()
            .map_or_else(|| uri.path().to_string(), |pq| pq.as_str().to_string());

        let session = session_token(&parts.headers);
        let user = match &session {
            Some(token) => state.accounts.current_user(token).await?,
            None => None,
        };

        Ok(Self {
            user,
            path,
            session,
        })
    }
}

/// Session token from the request's Cookie headers.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (name, value) = pair.trim().split_once('=')?;
            (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
        })
        .next()
}

pub fn session_cookie(token: &str) -> String {
    format!("{SESSION_COOKIE}={token}; HttpOnly; Path=/; SameSite=Lax")
}

pub fn expired_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}
