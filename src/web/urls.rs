// Named endpoints.
//
// Route patterns (for the router) and their reverse functions (for
// redirects and tests) live side by side so they can't drift apart.

use crate::core::news::{CommentId, NewsId};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

pub const NEWS_HOME: &str = "/news/";
pub const NEWS_DETAIL: &str = "/news/{id}/";
pub const COMMENT_EDIT: &str = "/news/comments/{id}/edit/";
pub const COMMENT_DELETE: &str = "/news/comments/{id}/delete/";

pub const NOTES_HOME: &str = "/notes/";
pub const NOTES_LIST: &str = "/notes/list/";
pub const NOTES_ADD: &str = "/notes/add/";
pub const NOTES_SUCCESS: &str = "/notes/done/";
pub const NOTE_DETAIL: &str = "/notes/note/{slug}/";
pub const NOTE_EDIT: &str = "/notes/edit/{slug}/";
pub const NOTE_DELETE: &str = "/notes/delete/{slug}/";

pub const LOGIN: &str = "/auth/login/";
pub const LOGOUT: &str = "/auth/logout/";
pub const SIGNUP: &str = "/auth/signup/";

pub fn news_detail(news_id: NewsId) -> String {
    format!("/news/{news_id}/")
}

/// News detail page, scrolled to its comments.
pub fn news_comments(news_id: NewsId) -> String {
    format!("{}#comments", news_detail(news_id))
}

pub fn comment_edit(comment_id: CommentId) -> String {
    format!("/news/comments/{comment_id}/edit/")
}

pub fn comment_delete(comment_id: CommentId) -> String {
    format!("/news/comments/{comment_id}/delete/")
}

pub fn note_detail(slug: &str) -> String {
    format!("/notes/note/{slug}/")
}

pub fn note_edit(slug: &str) -> String {
    format!("/notes/edit/{slug}/")
}

pub fn note_delete(slug: &str) -> String {
    format!("/notes/delete/{slug}/")
}

/// Query-value escaping: everything except unreserved characters and `/`.
const NEXT_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'/');

/// Login page that sends the user back to `next` afterwards.
pub fn login_with_next(next: &str) -> String {
    format!("{LOGIN}?next={}", utf8_percent_encode(next, NEXT_VALUE))
}

/// Whether `next` is a local path we may redirect to after login.
pub fn is_safe_next(next: &str) -> bool {
    next.starts_with('/') && !next.starts_with("//") && !next.contains('\\')
}
