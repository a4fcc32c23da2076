//! Parsing of the raw listing query into typed filter criteria and pagination.

use crate::{
    error::{AppError, AppResult},
    models::BookQuery,
};

/// Request-scoped filters. `None` means the filter is absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub book_ids: Option<Vec<i32>>,
    pub languages: Option<Vec<String>>,
    pub mime_types: Option<Vec<String>>,
    pub topics: Option<Vec<String>>,
    pub author: Option<String>,
    pub title: Option<String>,
}

/// 1-indexed page window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    /// Validates `page >= 1` and `limit >= 1`, applying defaults for absent values.
    pub fn new(page: Option<i64>, limit: Option<i64>, default_limit: i64) -> AppResult<Self> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(default_limit);

        if page < 1 {
            return Err(AppError::Validation(format!(
                "page must be a positive integer, got {}",
                page
            )));
        }
        if limit < 1 {
            return Err(AppError::Validation(format!(
                "limit must be a positive integer, got {}",
                limit
            )));
        }

        Ok(Self { page, limit })
    }

    /// Number of records to skip
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ceil(total / limit)`
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        (total - 1) / self.limit + 1
    }
}

impl FilterCriteria {
    pub fn from_query(query: &BookQuery) -> AppResult<Self> {
        let book_ids = match split_list(query.book_ids.as_deref()) {
            Some(fragments) => Some(parse_ids(&fragments)?),
            None => None,
        };

        Ok(Self {
            book_ids,
            languages: split_list(query.language.as_deref()),
            mime_types: split_list(query.mime_type.as_deref()),
            topics: split_list(query.topic.as_deref()),
            author: non_empty(query.author.as_deref()),
            title: non_empty(query.title.as_deref()),
        })
    }
}

/// Splits a comma list, trimming each fragment and dropping blank ones.
/// Returns `None` when nothing is left.
fn split_list(raw: Option<&str>) -> Option<Vec<String>> {
    let values: Vec<String> = raw?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

fn parse_ids(fragments: &[String]) -> AppResult<Vec<i32>> {
    fragments
        .iter()
        .map(|fragment| {
            fragment.parse::<i32>().map_err(|_| {
                AppError::Validation(format!("bookIds contains an invalid id: '{}'", fragment))
            })
        })
        .collect()
}

fn non_empty(raw: Option<&str>) -> Option<String> {
    raw.filter(|s| !s.is_empty()).map(String::from)
}
