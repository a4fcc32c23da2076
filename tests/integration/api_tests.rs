//! API integration tests
//!
//! The router is driven in-process over an in-memory catalog. The `#[ignore]`d
//! test at the bottom targets a running server backed by Postgres.

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use catalog_server::{
    api::create_router,
    models::{Author, BookRecord, Format},
    repository::{memory::InMemoryBookStore, Repository},
    AppConfig, AppState,
};

fn book(id: i32, title: &str, downloads: i32) -> BookRecord {
    BookRecord {
        gutenberg_id: id,
        title: Some(title.to_string()),
        download_count: Some(downloads),
        languages: vec!["en".to_string()],
        formats: vec![Format {
            mime_type: "text/plain; charset=us-ascii".to_string(),
            url: format!("https://www.gutenberg.org/ebooks/{id}.txt.utf-8"),
        }],
        ..Default::default()
    }
}

fn fixture() -> Vec<BookRecord> {
    let mut books = vec![
        BookRecord {
            authors: vec![Author {
                name: "Shelley, Mary Wollstonecraft".to_string(),
                birth_year: Some(1797),
                death_year: Some(1851),
            }],
            subjects: vec!["Frankenstein's monster (Fictitious character) -- Fiction".to_string()],
            bookshelves: vec!["Gothic Fiction".to_string(), "Movie Books".to_string()],
            ..book(84, "Frankenstein; Or, The Modern Prometheus", 90_000)
        },
        BookRecord {
            authors: vec![Author {
                name: "Twain, Mark".to_string(),
                birth_year: Some(1835),
                death_year: Some(1910),
            }],
            subjects: vec!["Adventure stories".to_string()],
            ..book(76, "Adventures of Huckleberry Finn", 80_000)
        },
        BookRecord {
            bookshelves: vec!["Poetry".to_string()],
            languages: vec!["fr".to_string()],
            ..book(11, "Les Fleurs du Mal", 70_000)
        },
        BookRecord {
            languages: vec!["fr".to_string()],
            ..book(12, "De la Terre à la Lune", 60_000)
        },
        BookRecord {
            formats: vec![Format {
                mime_type: "application/epub+zip".to_string(),
                url: "https://www.gutenberg.org/ebooks/83.epub3.images".to_string(),
            }],
            ..book(83, "From the Earth to the Moon", 50_000)
        },
    ];
    // 35 "time" titles, less popular than the books above
    books.extend((1..=35).map(|i| book(1000 + i, &format!("The Time Machine, part {i}"), 1000 - i)));
    books
}

fn app() -> Router {
    let repository = Repository::with_store(InMemoryBookStore::new(fixture()));
    create_router(AppState::new(AppConfig::default(), repository))
}

async fn get(uri: &str) -> (StatusCode, Value) {
    let response = app()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn titles(body: &Value) -> Vec<String> {
    body["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = get("/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_list_without_filters_returns_whole_catalog() {
    let (status, body) = get("/api/books").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_books"], 40);
    assert_eq!(body["current_page"], 1);
    assert_eq!(body["total_pages"], 2);
    assert_eq!(body["books"].as_array().unwrap().len(), 25);
    assert_eq!(body["books"][0]["title"], "Frankenstein; Or, The Modern Prometheus");
}

#[tokio::test]
async fn test_book_shape() {
    let (_, body) = get("/api/books?bookIds=84").await;
    let book = &body["books"][0];

    assert_eq!(book["authors"][0]["name"], "Shelley, Mary Wollstonecraft");
    assert_eq!(book["authors"][0]["birth_year"], 1797);
    assert_eq!(book["authors"][0]["death_year"], 1851);
    assert_eq!(book["language"], serde_json::json!(["en"]));
    assert_eq!(book["bookshelves"], serde_json::json!(["Gothic Fiction", "Movie Books"]));
    assert_eq!(book["download_links"][0]["mime_type"], "text/plain; charset=us-ascii");
    assert!(book.get("gutenberg_id").is_none());
}

#[tokio::test]
async fn test_title_search_second_page() {
    let (status, body) = get("/api/books?title=time&page=2&limit=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_books"], 35);
    assert_eq!(body["current_page"], 2);
    assert_eq!(body["total_pages"], 4);
    let expected: Vec<String> = (11..=20)
        .map(|i| format!("The Time Machine, part {i}"))
        .collect();
    assert_eq!(titles(&body), expected);
}

#[tokio::test]
async fn test_book_ids_membership() {
    let (_, body) = get("/api/books?bookIds=11,%2084,9999").await;
    assert_eq!(body["total_books"], 2);
    assert_eq!(
        titles(&body),
        vec!["Frankenstein; Or, The Modern Prometheus", "Les Fleurs du Mal"]
    );
}

#[tokio::test]
async fn test_non_numeric_book_id_is_rejected() {
    let (status, body) = get("/api/books?bookIds=11,84,abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn test_language_and_title_intersect() {
    let (_, body) = get("/api/books?language=fr&title=lune").await;
    assert_eq!(titles(&body), vec!["De la Terre à la Lune"]);

    let (_, body) = get("/api/books?language=en&title=moon").await;
    assert_eq!(titles(&body), vec!["From the Earth to the Moon"]);

    let (_, body) = get("/api/books?language=en,fr&title=MOON").await;
    assert_eq!(body["total_books"], 1);
}

#[tokio::test]
async fn test_topic_matches_subjects_or_bookshelves() {
    let (_, body) = get("/api/books?topic=adventure,poetry").await;
    assert_eq!(
        titles(&body),
        vec!["Adventures of Huckleberry Finn", "Les Fleurs du Mal"]
    );

    let (_, body) = get("/api/books?topic=GOTHIC").await;
    assert_eq!(titles(&body), vec!["Frankenstein; Or, The Modern Prometheus"]);
}

#[tokio::test]
async fn test_author_and_mime_type_filters() {
    let (_, body) = get("/api/books?author=twain").await;
    assert_eq!(titles(&body), vec!["Adventures of Huckleberry Finn"]);

    let (_, body) = get("/api/books?mimeType=application/epub%2Bzip").await;
    assert_eq!(titles(&body), vec!["From the Earth to the Moon"]);
}

#[tokio::test]
async fn test_books_without_download_count_are_listed_first() {
    let mut books = fixture();
    books.push(BookRecord {
        download_count: None,
        ..book(2701, "Moby Dick; Or, The Whale", 0)
    });
    let repository = Repository::with_store(InMemoryBookStore::new(books));
    let response = create_router(AppState::new(AppConfig::default(), repository))
        .oneshot(
            Request::builder()
                .uri("/api/books?limit=2")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(
        titles(&body),
        vec!["Moby Dick; Or, The Whale", "Frankenstein; Or, The Modern Prometheus"]
    );
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let (status, body) = get("/api/books?page=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_books"], 40);
    assert_eq!(body["current_page"], 10);
    assert!(body["books"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_pagination_is_rejected() {
    for uri in [
        "/api/books?page=0",
        "/api/books?page=-1",
        "/api/books?limit=0",
        "/api/books?page=abc",
    ] {
        let (status, body) = get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["message"].is_string(), "{uri}");
    }
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let response = app()
        .oneshot(
            Request::builder()
                .uri("/api/books")
                .header(header::ORIGIN, "https://example.org")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        "*"
    );
}

const BASE_URL: &str = "http://localhost:3000";

#[tokio::test]
#[ignore] // Run with: cargo test -- --ignored
async fn test_live_server_lists_books() {
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/books?limit=5", BASE_URL))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert!(body["books"].as_array().unwrap().len() <= 5);
    assert!(body["total_books"].is_number());
}
