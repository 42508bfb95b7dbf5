// News domain models - news items, their comments and the comment form.

use crate::core::access::Owned;
use crate::core::accounts::{User, UserId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub type NewsId = i64;
pub type CommentId = i64;

pub const NEWS_TITLE_MAX_LENGTH: usize = 250;

/// A published news item. Created by administrators only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct News {
    pub id: NewsId,
    pub title: String,
    pub text: String,
    /// Publication date; drives home page ordering.
    pub date: NaiveDate,
}

/// News item as it appears in a fixture file or admin input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNews {
    pub title: String,
    pub text: String,
    /// Defaults to today when omitted.
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub news_id: NewsId,
    pub author: User,
    pub text: String,
    pub created: DateTime<Utc>,
}

impl Owned for Comment {
    fn owner_id(&self) -> UserId {
        self.author.id
    }
}

/// Comment ready to be written. Only built after moderation passed.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub news_id: NewsId,
    pub author: User,
    pub text: String,
    pub created: DateTime<Utc>,
}

/// A news item with its comments, oldest first.
#[derive(Debug, Clone, Serialize)]
pub struct NewsDetail {
    #[serde(flatten)]
    pub news: News,
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommentForm {
    pub text: String,
}
