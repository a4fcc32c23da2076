//! In-memory book store, evaluating predicates directly against fixtures

use std::cmp::Reverse;

use async_trait::async_trait;

use crate::{
    catalog::{Pagination, Predicate},
    error::AppResult,
    models::BookRecord,
};

use super::BookStore;

/// Fixed catalog held in memory. Books without a download count are listed
/// first, like Postgres `DESC`; ties keep insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBookStore {
    books: Vec<BookRecord>,
}

impl InMemoryBookStore {
    pub fn new(books: Vec<BookRecord>) -> Self {
        Self { books }
    }

    fn matching(&self, predicate: &Predicate) -> Vec<&BookRecord> {
        self.books.iter().filter(|b| predicate.matches(b)).collect()
    }
}

#[async_trait]
impl BookStore for InMemoryBookStore {
    async fn count(&self, predicate: &Predicate) -> AppResult<i64> {
        Ok(self.matching(predicate).len() as i64)
    }

    async fn fetch_page(
        &self,
        predicate: &Predicate,
        pagination: Pagination,
    ) -> AppResult<Vec<BookRecord>> {
        let mut books = self.matching(predicate);
        // None sorts below any Some, so unknown popularity comes first
        books.sort_by_key(|b| b.download_count.map(Reverse));

        let offset = usize::try_from(pagination.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(pagination.limit).unwrap_or(usize::MAX);

        Ok(books
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
