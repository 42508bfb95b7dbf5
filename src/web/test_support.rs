// Shared fixtures for handler tests.

use super::session::Viewer;
use super::state::AppState;
use crate::core::accounts::{SignupForm, User};
use crate::settings::Settings;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

pub fn state() -> AppState {
    AppState::in_memory(&Settings::default())
}

pub async fn register(state: &AppState, username: &str) -> User {
    state
        .accounts
        .signup(&SignupForm {
            username: username.to_string(),
            password1: "s3cret-pass".to_string(),
            password2: "s3cret-pass".to_string(),
        })
        .await
        .unwrap()
}

pub fn anonymous(path: &str) -> Viewer {
    Viewer {
        user: None,
        path: path.to_string(),
        session: None,
    }
}

pub fn signed_in(user: &User, path: &str) -> Viewer {
    Viewer {
        user: Some(user.clone()),
        path: path.to_string(),
        session: None,
    }
}

pub fn respond(result: impl IntoResponse) -> Response {
    result.into_response()
}

pub fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
