// Display order for news and comments.
//
// Home page: newest publication date first, capped at the configured count.
// Comments under one news item: oldest first.
// Ties fall back to the id so the order is total.

use super::news_models::{Comment, News};
use std::cmp::Ordering;

pub fn newest_first(a: &News, b: &News) -> Ordering {
    b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id))
}

pub fn oldest_first(a: &Comment, b: &Comment) -> Ordering {
    a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id))
}

/// Order `news` for the home page and keep at most `cap` items.
pub fn home_page(mut news: Vec<News>, cap: usize) -> Vec<News> {
    news.sort_by(newest_first);
    news.truncate(cap);
    news
}

/// Order comments chronologically.
pub fn chronological(mut comments: Vec<Comment>) -> Vec<Comment> {
    comments.sort_by(oldest_first);
    comments
}
