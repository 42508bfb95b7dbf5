// Core notes module - personal notes with globally unique slugs.

pub mod note_models;
pub mod note_service;
pub mod slugs;

pub use note_models::*;
pub use note_service::*;
