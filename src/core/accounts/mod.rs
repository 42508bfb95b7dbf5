// Core accounts module - users, password checks and login sessions.

pub mod accounts_models;
pub mod accounts_service;

pub use accounts_models::*;
pub use accounts_service::*;
