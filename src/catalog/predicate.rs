//! Store-independent query predicate over catalog records.
//!
//! A [`Predicate`] is built once per request from [`FilterCriteria`] and then
//! either compiled to SQL ([`super::sql`]) or evaluated against in-memory
//! records ([`Predicate::matches`]).

use crate::models::BookRecord;

use super::filter::FilterCriteria;

/// Many-to-many or one-to-many relation from a book to another entity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Authors,
    Subjects,
    Bookshelves,
    Languages,
    Formats,
}

/// Filterable column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    BookGutenbergId,
    BookTitle,
    AuthorName,
    SubjectName,
    BookshelfName,
    LanguageCode,
    FormatMimeType,
}

/// Operand of an `EqualsAny` constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Values {
    Int(Vec<i32>),
    Text(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Every child matches. `And(vec![])` matches all records.
    And(Vec<Predicate>),
    /// At least one child matches. `Or(vec![])` matches nothing.
    Or(Vec<Predicate>),
    /// Field value is one of `values`
    EqualsAny { field: Field, values: Values },
    /// Case-insensitive literal substring match
    ContainsCi { field: Field, needle: String },
    /// At least one related row satisfies `predicate`
    Exists {
        relation: Relation,
        predicate: Box<Predicate>,
    },
}

impl Predicate {
    /// Predicate matching every record
    pub fn all() -> Self {
        Predicate::And(Vec::new())
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Predicate::And(children) if children.is_empty())
    }

    fn exists(relation: Relation, predicate: Predicate) -> Self {
        Predicate::Exists {
            relation,
            predicate: Box::new(predicate),
        }
    }

    fn contains(field: Field, needle: &str) -> Self {
        Predicate::ContainsCi {
            field,
            needle: needle.to_string(),
        }
    }

    /// Builds the conjunction of every present filter.
    ///
    /// The topic filter contributes a single OR group: one subject match and
    /// one bookshelf match per topic.
    pub fn from_filters(filters: &FilterCriteria) -> Self {
        let mut conjuncts = Vec::new();

        if let Some(ids) = &filters.book_ids {
            conjuncts.push(Predicate::EqualsAny {
                field: Field::BookGutenbergId,
                values: Values::Int(ids.clone()),
            });
        }

        if let Some(codes) = &filters.languages {
            conjuncts.push(Predicate::exists(
                Relation::Languages,
                Predicate::EqualsAny {
                    field: Field::LanguageCode,
                    values: Values::Text(codes.clone()),
                },
            ));
        }

        if let Some(mime_types) = &filters.mime_types {
            conjuncts.push(Predicate::exists(
                Relation::Formats,
                Predicate::EqualsAny {
                    field: Field::FormatMimeType,
                    values: Values::Text(mime_types.clone()),
                },
            ));
        }

        if let Some(topics) = &filters.topics {
            let subjects = topics.iter().map(|topic| {
                Predicate::exists(Relation::Subjects, Predicate::contains(Field::SubjectName, topic))
            });
            let bookshelves = topics.iter().map(|topic| {
                Predicate::exists(
                    Relation::Bookshelves,
                    Predicate::contains(Field::BookshelfName, topic),
                )
            });
            conjuncts.push(Predicate::Or(subjects.chain(bookshelves).collect()));
        }

        if let Some(author) = &filters.author {
            conjuncts.push(Predicate::exists(
                Relation::Authors,
                Predicate::contains(Field::AuthorName, author),
            ));
        }

        if let Some(title) = &filters.title {
            conjuncts.push(Predicate::contains(Field::BookTitle, title));
        }

        Predicate::And(conjuncts)
    }

    /// Evaluates the predicate against an expanded record.
    pub fn matches(&self, book: &BookRecord) -> bool {
        self.eval(&Scope::Book(book))
    }

    fn eval(&self, scope: &Scope<'_>) -> bool {
        match self {
            Predicate::And(children) => children.iter().all(|p| p.eval(scope)),
            Predicate::Or(children) => children.iter().any(|p| p.eval(scope)),
            Predicate::EqualsAny { field, values } => match (scope.value(*field), values) {
                (Some(FieldValue::Int(v)), Values::Int(set)) => set.contains(&v),
                (Some(FieldValue::Text(Some(v))), Values::Text(set)) => {
                    set.iter().any(|s| s == v)
                }
                _ => false,
            },
            Predicate::ContainsCi { field, needle } => match scope.value(*field) {
                Some(FieldValue::Text(Some(v))) => {
                    v.to_lowercase().contains(&needle.to_lowercase())
                }
                _ => false,
            },
            Predicate::Exists {
                relation,
                predicate,
            } => match scope {
                Scope::Book(book) => related(book, *relation)
                    .iter()
                    .any(|child| predicate.eval(child)),
                // Relations hang off books only
                _ => false,
            },
        }
    }
}

/// Row a predicate is evaluated against
enum Scope<'a> {
    Book(&'a BookRecord),
    Author(&'a crate::models::Author),
    Subject(&'a str),
    Bookshelf(&'a str),
    Language(&'a str),
    Format(&'a crate::models::Format),
}

enum FieldValue<'a> {
    Int(i32),
    Text(Option<&'a str>),
}

impl<'a> Scope<'a> {
    fn value(&self, field: Field) -> Option<FieldValue<'a>> {
        let value = match (self, field) {
            (Scope::Book(b), Field::BookGutenbergId) => FieldValue::Int(b.gutenberg_id),
            (Scope::Book(b), Field::BookTitle) => FieldValue::Text(b.title.as_deref()),
            (Scope::Author(a), Field::AuthorName) => FieldValue::Text(Some(a.name.as_str())),
            (Scope::Subject(name), Field::SubjectName) => FieldValue::Text(Some(*name)),
            (Scope::Bookshelf(name), Field::BookshelfName) => FieldValue::Text(Some(*name)),
            (Scope::Language(code), Field::LanguageCode) => FieldValue::Text(Some(*code)),
            (Scope::Format(f), Field::FormatMimeType) => {
                FieldValue::Text(Some(f.mime_type.as_str()))
            }
            _ => return None,
        };
        Some(value)
    }
}

fn related(book: &BookRecord, relation: Relation) -> Vec<Scope<'_>> {
    match relation {
        Relation::Authors => book.authors.iter().map(Scope::Author).collect(),
        Relation::Subjects => book.subjects.iter().map(|s| Scope::Subject(s)).collect(),
        Relation::Bookshelves => book.bookshelves.iter().map(|s| Scope::Bookshelf(s)).collect(),
        Relation::Languages => book.languages.iter().map(|s| Scope::Language(s)).collect(),
        Relation::Formats => book.formats.iter().map(Scope::Format).collect(),
    }
}
