// In-memory implementation of NewsStore.
//
// Sorting reuses the core ordering policy, so this store and the SQLite one
// hand back lists in the same order.

use crate::core::news::ordering;
use crate::core::news::{Comment, CommentId, NewComment, News, NewsId, NewsStore};
use crate::core::storage::StoreError;
use async_trait::async_trait;
use chrono::NaiveDate;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};

pub struct InMemoryNewsStore {
    news: DashMap<NewsId, News>,
    comments: DashMap<CommentId, Comment>,
    next_news_id: AtomicI64,
    next_comment_id: AtomicI64,
}

impl InMemoryNewsStore {
    pub fn new() -> Self {
        Self {
            news: DashMap::new(),
            comments: DashMap::new(),
            next_news_id: AtomicI64::new(1),
            next_comment_id: AtomicI64::new(1),
        }
    }
}

impl Default for InMemoryNewsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsStore for InMemoryNewsStore {
    async fn insert_news(&self, title: &str, text: &str, date: NaiveDate) -> Result<News, StoreError> {
        let news = News {
            id: self.next_news_id.fetch_add(1, Ordering::SeqCst),
            title: title.to_string(),
            text: text.to_string(),
            date,
        };
        self.news.insert(news.id, news.clone());
        Ok(news)
    }

    async fn count_news(&self) -> Result<u64, StoreError> {
        Ok(self.news.len() as u64)
    }

    async fn latest_news(&self, limit: usize) -> Result<Vec<News>, StoreError> {
        let all: Vec<News> = self.news.iter().map(|entry| entry.value().clone()).collect();
        Ok(ordering::home_page(all, limit))
    }

    async fn get_news(&self, news_id: NewsId) -> Result<Option<News>, StoreError> {
        Ok(self.news.get(&news_id).map(|entry| entry.clone()))
    }

    async fn insert_comment(&self, comment: NewComment) -> Result<Comment, StoreError> {
        if !self.news.contains_key(&comment.news_id) {
            return Err(StoreError::NotFound);
        }
        let stored = Comment {
            id: self.next_comment_id.fetch_add(1, Ordering::SeqCst),
            news_id: comment.news_id,
            author: comment.author,
            text: comment.text,
            created: comment.created,
        };
        self.comments.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_comment(&self, comment_id: CommentId) -> Result<Option<Comment>, StoreError> {
        Ok(self.comments.get(&comment_id).map(|entry| entry.clone()))
    }

    async fn comments_for(&self, news_id: NewsId) -> Result<Vec<Comment>, StoreError> {
        let comments: Vec<Comment> = self
            .comments
            .iter()
            .filter(|entry| entry.news_id == news_id)
            .map(|entry| entry.value().clone())
            .collect();
        Ok(ordering::chronological(comments))
    }

    async fn update_comment_text(&self, comment_id: CommentId, text: &str) -> Result<(), StoreError> {
        match self.comments.get_mut(&comment_id) {
            Some(mut comment) => {
                comment.text = text.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound),
        }
    }

    async fn delete_comment(&self, comment_id: CommentId) -> Result<(), StoreError> {
        self.comments.remove(&comment_id);
        Ok(())
    }

    #[cfg(test)]
    async fn count_comments(&self) -> Result<u64, StoreError> {
        Ok(self.comments.len() as u64)
    }
}
