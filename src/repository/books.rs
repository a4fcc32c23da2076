//! Books repository for Postgres (Gutendex schema)

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, Pool, Postgres, QueryBuilder};

use crate::{
    catalog::{sql, Pagination, Predicate},
    error::AppResult,
    models::{Author, BookRecord, Format},
};

use super::BookStore;

const AUTHORS_SQL: &str = r#"
    SELECT ba.book_id, a.name, a.birth_year, a.death_year
    FROM books_book_authors ba
    JOIN books_author a ON a.id = ba.author_id
    WHERE ba.book_id = ANY($1)
    ORDER BY ba.book_id, ba.id
"#;

const SUBJECTS_SQL: &str = r#"
    SELECT bs.book_id, s.name
    FROM books_book_subjects bs
    JOIN books_subject s ON s.id = bs.subject_id
    WHERE bs.book_id = ANY($1)
    ORDER BY bs.book_id, bs.id
"#;

const BOOKSHELVES_SQL: &str = r#"
    SELECT bb.book_id, sh.name
    FROM books_book_bookshelves bb
    JOIN books_bookshelf sh ON sh.id = bb.bookshelf_id
    WHERE bb.book_id = ANY($1)
    ORDER BY bb.book_id, bb.id
"#;

const LANGUAGES_SQL: &str = r#"
    SELECT bl.book_id, l.code AS name
    FROM books_book_languages bl
    JOIN books_language l ON l.id = bl.language_id
    WHERE bl.book_id = ANY($1)
    ORDER BY bl.book_id, bl.id
"#;

const FORMATS_SQL: &str = r#"
    SELECT f.book_id, f.mime_type, f.url
    FROM books_format f
    WHERE f.book_id = ANY($1)
    ORDER BY f.book_id, f.id
"#;

#[derive(FromRow)]
struct BookRow {
    id: i32,
    gutenberg_id: i32,
    title: Option<String>,
    download_count: Option<i32>,
}

#[derive(FromRow)]
struct AuthorRow {
    book_id: i32,
    #[sqlx(flatten)]
    author: Author,
}

#[derive(FromRow)]
struct NameRow {
    book_id: i32,
    name: String,
}

#[derive(FromRow)]
struct FormatRow {
    book_id: i32,
    #[sqlx(flatten)]
    format: Format,
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    async fn load_authors(&self, book_ids: &[i32]) -> AppResult<HashMap<i32, Vec<Author>>> {
        let rows = sqlx::query_as::<_, AuthorRow>(AUTHORS_SQL)
            .bind(book_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(group_by_book(rows.into_iter().map(|r| (r.book_id, r.author))))
    }

    async fn load_names(
        &self,
        query: &'static str,
        book_ids: &[i32],
    ) -> AppResult<HashMap<i32, Vec<String>>> {
        let rows = sqlx::query_as::<_, NameRow>(query)
            .bind(book_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(group_by_book(rows.into_iter().map(|r| (r.book_id, r.name))))
    }

    async fn load_formats(&self, book_ids: &[i32]) -> AppResult<HashMap<i32, Vec<Format>>> {
        let rows = sqlx::query_as::<_, FormatRow>(FORMATS_SQL)
            .bind(book_ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(group_by_book(rows.into_iter().map(|r| (r.book_id, r.format))))
    }
}

#[async_trait]
impl BookStore for BooksRepository {
    async fn count(&self, predicate: &Predicate) -> AppResult<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM books_book b");
        sql::push_where(&mut builder, predicate);

        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn fetch_page(
        &self,
        predicate: &Predicate,
        pagination: Pagination,
    ) -> AppResult<Vec<BookRecord>> {
        let mut builder = page_query(predicate, pagination);
        let rows = builder
            .build_query_as::<BookRow>()
            .fetch_all(&self.pool)
            .await?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<i32> = rows.iter().map(|r| r.id).collect();

        let (mut authors, mut subjects, mut bookshelves, mut languages, mut formats) = tokio::try_join!(
            self.load_authors(&ids),
            self.load_names(SUBJECTS_SQL, &ids),
            self.load_names(BOOKSHELVES_SQL, &ids),
            self.load_names(LANGUAGES_SQL, &ids),
            self.load_formats(&ids),
        )?;

        tracing::debug!(books = rows.len(), "Loaded book page relations");

        Ok(rows
            .into_iter()
            .map(|row| BookRecord {
                gutenberg_id: row.gutenberg_id,
                title: row.title,
                download_count: row.download_count,
                authors: authors.remove(&row.id).unwrap_or_default(),
                subjects: subjects.remove(&row.id).unwrap_or_default(),
                bookshelves: bookshelves.remove(&row.id).unwrap_or_default(),
                languages: languages.remove(&row.id).unwrap_or_default(),
                formats: formats.remove(&row.id).unwrap_or_default(),
            })
            .collect())
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

/// Page of matching books, most downloaded first. Unknown counts sort first,
/// as Postgres orders NULLs for `DESC`.
fn page_query(predicate: &Predicate, pagination: Pagination) -> QueryBuilder<'static, Postgres> {
    let mut builder = QueryBuilder::<Postgres>::new(
        "SELECT b.id, b.gutenberg_id, b.title, b.download_count FROM books_book b",
    );
    sql::push_where(&mut builder, predicate);
    builder.push(" ORDER BY b.download_count DESC NULLS FIRST, b.id LIMIT ");
    builder.push_bind(pagination.limit);
    builder.push(" OFFSET ");
    builder.push_bind(pagination.offset());
    builder
}

/// Groups `(book_id, value)` pairs, keeping the incoming order within each book.
fn group_by_book<T>(rows: impl IntoIterator<Item = (i32, T)>) -> HashMap<i32, Vec<T>> {
    let mut grouped: HashMap<i32, Vec<T>> = HashMap::new();
    for (book_id, value) in rows {
        grouped.entry(book_id).or_default().push(value);
    }
    grouped
}
