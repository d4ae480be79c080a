pub mod admin;
pub mod config;
pub mod content;
pub mod deleter;
pub mod error;
pub mod security;
pub mod storage;
pub mod web;

pub use config::AppConfig;
pub use error::{Error, Result};
