//! Book (catalog record) model and related types.
//!
//! `BookRecord` is the fully expanded row as read from the store: the book itself
//! plus its authors, subjects, bookshelves, languages and formats, each in
//! relation order. `BookResponse` is the flattened shape served by `/api/books`.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

/// Author of a book. Years are optional and may be negative (BCE).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Author {
    pub name: String,
    pub birth_year: Option<i16>,
    pub death_year: Option<i16>,
}

/// Downloadable file of a book
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow, ToSchema)]
pub struct Format {
    pub mime_type: String,
    pub url: String,
}

/// Expanded catalog record
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookRecord {
    /// Project Gutenberg id (the external identifier, not the table key)
    pub gutenberg_id: i32,
    pub title: Option<String>,
    /// Popularity counter used for ordering
    pub download_count: Option<i32>,
    pub authors: Vec<Author>,
    pub subjects: Vec<String>,
    pub bookshelves: Vec<String>,
    pub languages: Vec<String>,
    pub formats: Vec<Format>,
}

/// Query string of `GET /api/books`
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Comma-separated Project Gutenberg ids
    pub book_ids: Option<String>,
    /// Comma-separated language codes
    pub language: Option<String>,
    /// Comma-separated mime types
    pub mime_type: Option<String>,
    /// Comma-separated substrings matched against subjects and bookshelves
    pub topic: Option<String>,
    /// Substring of an author name
    pub author: Option<String>,
    /// Substring of the title
    pub title: Option<String>,
    /// Page number (default: 1)
    pub page: Option<i64>,
    /// Books per page (default: 25)
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct AuthorResponse {
    pub name: String,
    pub birth_year: Option<i16>,
    pub death_year: Option<i16>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct DownloadLink {
    pub mime_type: String,
    pub url: String,
}

/// Book as listed by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookResponse {
    pub title: Option<String>,
    pub authors: Vec<AuthorResponse>,
    pub language: Vec<String>,
    pub subjects: Vec<String>,
    pub bookshelves: Vec<String>,
    pub download_links: Vec<DownloadLink>,
}

/// Paginated listing returned by `GET /api/books`
#[derive(Debug, Serialize, ToSchema)]
pub struct BookListResponse {
    pub total_books: i64,
    pub current_page: i64,
    pub total_pages: i64,
    pub books: Vec<BookResponse>,
}

impl From<Author> for AuthorResponse {
    fn from(author: Author) -> Self {
        Self {
            name: author.name,
            birth_year: author.birth_year,
            death_year: author.death_year,
        }
    }
}

impl From<Format> for DownloadLink {
    fn from(format: Format) -> Self {
        Self {
            mime_type: format.mime_type,
            url: format.url,
        }
    }
}

impl From<BookRecord> for BookResponse {
    fn from(record: BookRecord) -> Self {
        Self {
            title: record.title,
            authors: record.authors.into_iter().map(AuthorResponse::from).collect(),
            language: record.languages,
            subjects: record.subjects,
            bookshelves: record.bookshelves,
            download_links: record.formats.into_iter().map(DownloadLink::from).collect(),
        }
    }
}
