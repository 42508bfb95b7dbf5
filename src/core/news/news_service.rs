// News service - home page listing, news detail and comment lifecycle.
//
// This service handles:
// - The capped, newest-first home page
// - Comment creation behind the banned-word filter
// - Owner-only comment edit and delete
//
// No HTTP types here - the web layer turns results into responses.

use super::moderation::validate_comment_text;
use super::news_models::{
    Comment, CommentForm, CommentId, NewComment, NewNews, News, NewsDetail, NewsId,
    NEWS_TITLE_MAX_LENGTH,
};
use super::ordering;
use crate::core::access::{authorize_owner, AccessError};
use crate::core::accounts::User;
use crate::core::forms::{self, FormErrors};
use crate::core::storage::StoreError;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Error)]
pub enum NewsError {
    #[error("Invalid form: {0:?}")]
    Invalid(FormErrors),

    #[error("News {0} not found")]
    NewsNotFound(NewsId),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

// ============================================================================
// STORAGE TRAIT (PORT)
// ============================================================================

#[async_trait]
pub trait NewsStore: Send + Sync {
    async fn insert_news(
        &self,
        title: &str,
        text: &str,
        date: chrono::NaiveDate,
    ) -> Result<News, StoreError>;

    async fn count_news(&self) -> Result<u64, StoreError>;

    /// At most `limit` news, newest first.
    async fn latest_news(&self, limit: usize) -> Result<Vec<News>, StoreError>;

    async fn get_news(&self, news_id: NewsId) -> Result<Option<News>, StoreError>;

    /// Fails with `StoreError::NotFound` if the news item does not exist.
    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError>;

    async fn get_comment(&self, comment_id: CommentId) -> Result<Option<Comment>, StoreError>;

    /// Comments of one news item, oldest first.
    async fn comments_for(&self, news_id: NewsId) -> Result<Vec<Comment>, StoreError>;

    async fn update_comment_text(
        &self,
        comment_id: CommentId,
        text: &str,
    ) -> Result<(), StoreError>;

    async fn delete_comment(&self, comment_id: CommentId) -> Result<(), StoreError>;

    #[cfg(test)]
    async fn count_comments(&self) -> Result<u64, StoreError>;
}

// ============================================================================
// CORE SERVICE
// ============================================================================

pub struct NewsService {
    store: Arc<dyn NewsStore>,
    /// Maximum number of news items on the home page.
    home_page_count: usize,
}

impl NewsService {
    pub fn new(store: Arc<dyn NewsStore>, home_page_count: usize) -> Self {
        Self {
            store,
            home_page_count,
        }
    }

    /// Publish a news item (admin / fixture path).
    pub async fn publish(&self, news: NewNews) -> Result<News, NewsError> {
        validate_news(&news).map_err(NewsError::Invalid)?;

        let date = news.date.unwrap_or_else(|| Utc::now().date_naive());
        let published = self
            .store
            .insert_news(news.title.trim(), &news.text, date)
            .await?;
        tracing::info!("Published news {} dated {}", published.id, published.date);
        Ok(published)
    }

    /// Load fixture items, but only into an empty news table.
    ///
    /// Every item is validated before the first one is written, so a bad
    /// fixture leaves the table empty.
    ///
    /// # Returns
    /// How many items were published.
    pub async fn load_fixture(&self, items: Vec<NewNews>) -> Result<usize, NewsError> {
        if self.store.count_news().await? > 0 {
            tracing::debug!("News already present, skipping fixture");
            return Ok(0);
        }
        for (index, item) in items.iter().enumerate() {
            if let Err(errors) = validate_news(item) {
                tracing::warn!("Fixture item {} is invalid: {:?}", index, errors);
                return Err(NewsError::Invalid(errors));
            }
        }

        let mut loaded = 0;
        for item in items {
            self.publish(item).await?;
            loaded += 1;
        }
        tracing::info!("Loaded {} news from fixture", loaded);
        Ok(loaded)
    }

    /// News for the home page: newest first, at most `home_page_count`.
    pub async fn home_page(&self) -> Result<Vec<News>, NewsError> {
        let latest = self.store.latest_news(self.home_page_count).await?;
        Ok(ordering::home_page(latest, self.home_page_count))
    }

    /// One news item with its comments, oldest first.
    pub async fn detail(&self, news_id: NewsId) -> Result<NewsDetail, NewsError> {
        let news = self
            .store
            .get_news(news_id)
            .await?
            .ok_or(NewsError::NewsNotFound(news_id))?;
        let comments = ordering::chronological(self.store.comments_for(news_id).await?);
        Ok(NewsDetail { news, comments })
    }

    /// Post a comment under a news item.
    ///
    /// The text goes through the banned-word filter first; a rejected
    /// comment leaves storage untouched.
    pub async fn add_comment(
        &self,
        news_id: NewsId,
        author: &User,
        form: &CommentForm,
    ) -> Result<Comment, NewsError> {
        if self.store.get_news(news_id).await?.is_none() {
            return Err(NewsError::NewsNotFound(news_id));
        }
        validate_comment_text(&form.text).map_err(NewsError::Invalid)?;

        let comment = self
            .store
            .insert_comment(NewComment {
                news_id,
                author: author.clone(),
                text: form.text.clone(),
                created: Utc::now(),
            })
            .await
            .map_err(|e| match e {
                StoreError::NotFound => NewsError::NewsNotFound(news_id),
                other => other.into(),
            })?;
        tracing::info!(
            "User {} commented on news {} (comment {})",
            author.id,
            news_id,
            comment.id
        );
        Ok(comment)
    }

    /// A comment, if and only if `user` wrote it.
    pub async fn owned_comment(
        &self,
        comment_id: CommentId,
        user: &User,
    ) -> Result<Comment, NewsError> {
        let found = self.store.get_comment(comment_id).await?;
        Ok(authorize_owner(found, user)?)
    }

    /// Replace the text of the user's own comment.
    pub async fn edit_comment(
        &self,
        comment_id: CommentId,
        user: &User,
        form: &CommentForm,
    ) -> Result<Comment, NewsError> {
        let mut comment = self.owned_comment(comment_id, user).await?;
        validate_comment_text(&form.text).map_err(NewsError::Invalid)?;

        self.store
            .update_comment_text(comment_id, &form.text)
            .await?;
        comment.text = form.text.clone();
        tracing::info!("User {} edited comment {}", user.id, comment_id);
        Ok(comment)
    }

    /// Delete the user's own comment.
    ///
    /// # Returns
    /// The deleted comment, so callers know which news item it belonged to.
    pub async fn delete_comment(
        &self,
        comment_id: CommentId,
        user: &User,
    ) -> Result<Comment, NewsError> {
        let comment = self.owned_comment(comment_id, user).await?;
        self.store.delete_comment(comment_id).await?;
        tracing::info!("User {} deleted comment {}", user.id, comment_id);
        Ok(comment)
    }

    #[cfg(test)]
    pub async fn comment_count(&self) -> Result<u64, NewsError> {
        Ok(self.store.count_comments().await?)
    }
}

fn validate_news(news: &NewNews) -> Result<(), FormErrors> {
    let mut errors = FormErrors::new();
    forms::require(&mut errors, "title", &news.title);
    forms::max_length(&mut errors, "title", &news.title, NEWS_TITLE_MAX_LENGTH);
    forms::require(&mut errors, "text", &news.text);
    errors.into_result()
}

// ============================================================================
// TESTS
// ============================================================================
