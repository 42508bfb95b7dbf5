// Core news module - news items, comment moderation and display order.

pub mod moderation;
pub mod news_models;
pub mod news_service;
pub mod ordering;

pub use news_models::*;
pub use news_service::*;
