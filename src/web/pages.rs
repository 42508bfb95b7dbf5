// Rendered pages and redirects.
//
// A page is the template name plus its context, sent as JSON. Context keys
// follow the template conventions: `object_list`, `form`, `news`, `note`...

use crate::core::accounts::User;
use crate::core::forms::FormErrors;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub struct Page {
    pub template: &'static str,
    pub context: Map<String, Value>,
}

impl Page {
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            context: Map::new(),
        }
    }

    /// Add one context entry.
    pub fn with(mut self, key: &str, value: impl Serialize) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            tracing::error!("Failed to serialize context key {}: {}", key, e);
            Value::Null
        });
        self.context.insert(key.to_string(), value);
        self
    }

    /// Expose the current user (or null) as `user`.
    pub fn with_user(self, user: Option<&User>) -> Self {
        self.with("user", user)
    }
}

impl IntoResponse for Page {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// A bound form: which form it is, the submitted (or initial) values, and
/// field errors.
#[derive(Debug, Serialize)]
pub struct FormContext<T: Serialize> {
    pub kind: &'static str,
    pub data: T,
    pub errors: FormErrors,
}

impl<T: Serialize> FormContext<T> {
    pub fn blank(kind: &'static str, data: T) -> Self {
        Self {
            kind,
            data,
            errors: FormErrors::new(),
        }
    }

    pub fn invalid(kind: &'static str, data: T, errors: FormErrors) -> Self {
        Self { kind, data, errors }
    }
}

/// 302 to `location`.
pub fn redirect(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}
