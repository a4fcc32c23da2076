//! Repository layer for catalog store access

pub mod books;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    catalog::{Pagination, Predicate},
    error::AppResult,
    models::BookRecord,
};

/// Read access to the book catalog.
///
/// Both queries of a listing take the same predicate; implementations give no
/// isolation guarantee between them beyond the store's default read consistency.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookStore: Send + Sync {
    /// Number of books matching `predicate`
    async fn count(&self, predicate: &Predicate) -> AppResult<i64>;

    /// One page of matching books, most downloaded first, relations expanded
    async fn fetch_page(
        &self,
        predicate: &Predicate,
        pagination: Pagination,
    ) -> AppResult<Vec<BookRecord>>;

    /// Checks that the store is reachable
    async fn ping(&self) -> AppResult<()>;
}

/// Main repository struct holding the injected store handle
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookStore>,
}

impl Repository {
    /// Create a repository backed by Postgres
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self::with_store(books::BooksRepository::new(pool))
    }

    /// Create a repository over any store, e.g. [`memory::InMemoryBookStore`]
    pub fn with_store(store: impl BookStore + 'static) -> Self {
        Self {
            books: Arc::new(store),
        }
    }
}
