//! Catalog filtering: query parsing, predicate construction and SQL translation

pub mod filter;
pub mod predicate;
pub mod sql;

pub use filter::{FilterCriteria, Pagination};
pub use predicate::{Field, Predicate, Relation, Values};
