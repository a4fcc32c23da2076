//! Data models for the catalog server

pub mod book;

pub use book::{
    Author, AuthorResponse, BookListResponse, BookQuery, BookRecord, BookResponse, DownloadLink,
    Format,
};
