//! Catalog listing service

use crate::{
    catalog::{FilterCriteria, Pagination, Predicate},
    config::CatalogConfig,
    error::AppResult,
    models::{BookListResponse, BookQuery, BookResponse},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
    config: CatalogConfig,
}

impl CatalogService {
    pub fn new(repository: Repository, config: CatalogConfig) -> Self {
        Self { repository, config }
    }

    /// List books matching the query, most downloaded first.
    ///
    /// The count and the page fetch run concurrently against the same predicate.
    pub async fn list_books(&self, query: &BookQuery) -> AppResult<BookListResponse> {
        let filters = FilterCriteria::from_query(query)?;
        let pagination = Pagination::new(query.page, query.limit, self.config.default_limit)?;
        let predicate = Predicate::from_filters(&filters);

        tracing::debug!(
            ?filters,
            page = pagination.page,
            limit = pagination.limit,
            "Listing books"
        );

        let store = &self.repository.books;
        let (total_books, books) = tokio::try_join!(
            store.count(&predicate),
            store.fetch_page(&predicate, pagination),
        )?;

        Ok(BookListResponse {
            total_books,
            current_page: pagination.page,
            total_pages: pagination.total_pages(total_books),
            books: books.into_iter().map(BookResponse::from).collect(),
        })
    }

    /// Check that the catalog store answers
    pub async fn ping(&self) -> AppResult<()> {
        self.repository.books.ping().await
    }
}
