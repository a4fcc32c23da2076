//! Catalog Server
//!
//! A read-only REST JSON API listing the books of a Project Gutenberg style
//! catalog, with filtering by id, language, format, topic, author and title.

use std::sync::Arc;

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Build the state over an already constructed repository
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        let services = services::Services::new(repository, config.catalog);
        Self {
            services: Arc::new(services),
        }
    }
}
