//! Compiles a [`Predicate`] into a Postgres condition with bound parameters.
//!
//! The outer query must alias `books_book` as `b`.

use sqlx::{Postgres, QueryBuilder};

use super::predicate::{Field, Predicate, Relation, Values};

/// Appends ` WHERE <condition>` unless the predicate matches everything.
pub fn push_where(builder: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    if predicate.is_all() {
        return;
    }
    builder.push(" WHERE ");
    push_condition(builder, predicate);
}

pub fn push_condition(builder: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::And(children) => push_junction(builder, children, " AND ", "TRUE"),
        Predicate::Or(children) => push_junction(builder, children, " OR ", "FALSE"),
        Predicate::EqualsAny { field, values } => {
            match values {
                Values::Int(v) if v.is_empty() => {
                    builder.push("FALSE");
                }
                Values::Text(v) if v.is_empty() => {
                    builder.push("FALSE");
                }
                Values::Int(v) => {
                    builder.push(column(*field)).push(" = ANY(");
                    builder.push_bind(v.clone());
                    builder.push(")");
                }
                Values::Text(v) => {
                    builder.push(column(*field)).push(" = ANY(");
                    builder.push_bind(v.clone());
                    builder.push(")");
                }
            };
        }
        Predicate::ContainsCi { field, needle } => {
            builder.push(column(*field)).push(" ILIKE ");
            builder.push_bind(format!("%{}%", escape_like_literal(needle)));
            builder.push(r" ESCAPE '\'");
        }
        Predicate::Exists {
            relation,
            predicate,
        } => {
            builder.push("EXISTS (").push(relation_source(*relation));
            if !predicate.is_all() {
                builder.push(" AND ");
                push_condition(builder, predicate);
            }
            builder.push(")");
        }
    }
}

fn push_junction(
    builder: &mut QueryBuilder<'_, Postgres>,
    children: &[Predicate],
    separator: &str,
    identity: &str,
) {
    match children {
        [] => {
            builder.push(identity);
        }
        [only] => push_condition(builder, only),
        _ => {
            builder.push("(");
            for (i, child) in children.iter().enumerate() {
                if i > 0 {
                    builder.push(separator);
                }
                push_condition(builder, child);
            }
            builder.push(")");
        }
    }
}

fn column(field: Field) -> &'static str {
    match field {
        Field::BookGutenbergId => "b.gutenberg_id",
        Field::BookTitle => "b.title",
        Field::AuthorName => "a.name",
        Field::SubjectName => "s.name",
        Field::BookshelfName => "sh.name",
        Field::LanguageCode => "l.code",
        Field::FormatMimeType => "f.mime_type",
    }
}

/// Correlated subquery selecting the related rows of `b`, open for more `AND` terms
fn relation_source(relation: Relation) -> &'static str {
    match relation {
        Relation::Authors => {
            "SELECT 1 FROM books_book_authors ba \
             JOIN books_author a ON a.id = ba.author_id \
             WHERE ba.book_id = b.id"
        }
        Relation::Subjects => {
            "SELECT 1 FROM books_book_subjects bs \
             JOIN books_subject s ON s.id = bs.subject_id \
             WHERE bs.book_id = b.id"
        }
        Relation::Bookshelves => {
            "SELECT 1 FROM books_book_bookshelves bb \
             JOIN books_bookshelf sh ON sh.id = bb.bookshelf_id \
             WHERE bb.book_id = b.id"
        }
        Relation::Languages => {
            "SELECT 1 FROM books_book_languages bl \
             JOIN books_language l ON l.id = bl.language_id \
             WHERE bl.book_id = b.id"
        }
        Relation::Formats => "SELECT 1 FROM books_format f WHERE f.book_id = b.id",
    }
}

fn escape_like_literal(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '%' => out.push_str("\\%"),
            '_' => out.push_str("\\_"),
            other => out.push(other),
        }
    }
    out
}
