//! API tests driving the full router over in-memory storage

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use config::Config;
use serde_json::{json, Value};
use tower::ServiceExt;

use library_server::{api::create_router, repository::Repository, AppConfig, AppState};

const ALLOWED_ORIGIN: &str = "http://localhost:5174";

fn test_config() -> AppConfig {
    let config = Config::builder()
        .set_override("server.port", 0)
        .unwrap()
        .set_override("database.url", "unused://in-memory")
        .unwrap()
        .build()
        .unwrap();
    AppConfig::from_config(config).unwrap()
}

fn app() -> Router {
    create_router(AppState::new(test_config(), Repository::in_memory()))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn book_body(title: &str, isbn: &str, copies: i32) -> Value {
    json!({
        "title": title,
        "author": "Octavia E. Butler",
        "genre": "SCIENCE",
        "isbn": isbn,
        "description": "A novel",
        "copies": copies
    })
}

async fn create_book(app: &Router, title: &str, isbn: &str, copies: i32) -> Value {
    let (status, body) = send(app, Method::POST, "/api/books", Some(book_body(title, isbn, copies))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"].clone()
}

#[tokio::test]
async fn root_returns_welcome_envelope() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Welcome to Library Management API");
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn create_book_returns_created_book() {
    let app = app();
    let (status, body) = send(&app, Method::POST, "/api/books", Some(book_body("Kindred", "978-0807083697", 3))).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Book created successfully");
    assert!(body.get("error").is_none());

    let book = &body["data"];
    assert!(book["_id"].is_string());
    assert_eq!(book["title"], "Kindred");
    assert_eq!(book["genre"], "SCIENCE");
    assert_eq!(book["copies"], 3);
    assert_eq!(book["available"], true);
    assert!(book["createdAt"].is_string());
    assert!(book["updatedAt"].is_string());
}

#[tokio::test]
async fn create_book_ignores_client_available_flag() {
    let app = app();
    let mut body = book_body("Dawn", "1", 0);
    body["available"] = json!(true);

    let (status, body) = send(&app, Method::POST, "/api/books", Some(body)).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["available"], false);
}

#[tokio::test]
async fn create_book_reports_every_invalid_field() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/books",
        Some(json!({ "genre": "POETRY", "copies": -1 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Validation failed");
    assert!(body["data"].is_null());
    let error = body["error"].as_str().unwrap();
    for expected in ["title", "author", "isbn", "copies", "genre"] {
        assert!(error.contains(expected), "{error} lacks {expected}");
    }
}

#[tokio::test]
async fn duplicate_isbn_is_rejected() {
    let app = app();
    create_book(&app, "Kindred", "42", 1).await;

    let (status, body) = send(&app, Method::POST, "/api/books", Some(book_body("Other", "42", 1))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");
    assert!(body["error"].as_str().unwrap().contains("42"));
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/books")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn list_books_filters_sorts_and_paginates() {
    let app = app();
    for (title, isbn) in [("C", "3"), ("A", "1"), ("B", "2")] {
        create_book(&app, title, isbn, 1).await;
    }

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/books?filter=SCIENCE&sortBy=title&sort=asc&limit=2&page=1",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Books retrieved successfully");
    let titles: Vec<&str> = body["data"]["books"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["A", "B"]);
    assert_eq!(body["data"]["pagination"]["total"], 3);
    assert_eq!(body["data"]["pagination"]["totalPages"], 2);

    let (_, body) = send(&app, Method::GET, "/api/books?filter=HISTORY", None).await;
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 0);
    assert_eq!(body["data"]["pagination"]["total"], 0);
}

#[tokio::test]
async fn list_books_rejects_unknown_sort_field() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/books?sortBy=price", None).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_or_malformed_id_is_not_found() {
    let app = app();

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/books/7f0c2d5e-6d8a-4b1e-9d1c-3f5b8c2a1e00",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Book not found");

    let (status, body) = send(&app, Method::GET, "/api/books/not-an-id", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Book not found");
}

#[tokio::test]
async fn update_book_changes_fields_and_availability() {
    let app = app();
    let book = create_book(&app, "Kindred", "42", 2).await;
    let uri = format!("/api/books/{}", book["_id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "title": "Fledgling", "copies": 0 }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Book updated successfully");
    assert_eq!(body["data"]["title"], "Fledgling");
    assert_eq!(body["data"]["author"], "Octavia E. Butler");
    assert_eq!(body["data"]["copies"], 0);
    assert_eq!(body["data"]["available"], false);

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["data"]["title"], "Fledgling");
}

#[tokio::test]
async fn patch_title_keeps_description_and_null_clears_it() {
    let app = app();
    let book = create_book(&app, "Kindred", "42", 2).await;
    let uri = format!("/api/books/{}", book["_id"].as_str().unwrap());

    let (_, body) = send(&app, Method::PATCH, &uri, Some(json!({ "title": "Fledgling" }))).await;
    assert_eq!(body["data"]["description"], "A novel");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({ "description": null }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["description"].is_null());
    assert_eq!(body["data"]["title"], "Fledgling");
}

#[tokio::test]
async fn list_books_with_huge_limit_is_one_page() {
    let app = app();
    create_book(&app, "Kindred", "1", 1).await;
    create_book(&app, "Dawn", "2", 1).await;

    let uri = format!("/api/books?limit={}", i64::MAX);
    let (status, body) = send(&app, Method::GET, &uri, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["books"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["pagination"]["totalPages"], 1);
}

#[tokio::test]
async fn delete_book_returns_null_data() {
    let app = app();
    let book = create_book(&app, "Kindred", "42", 2).await;
    let uri = format!("/api/books/{}", book["_id"].as_str().unwrap());

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Book deleted successfully");
    assert!(body["data"].is_null());

    let (status, _) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn borrowing_decrements_copies_until_exhausted() {
    let app = app();
    let book = create_book(&app, "Kindred", "42", 3).await;
    let id = book["_id"].as_str().unwrap().to_string();
    let uri = format!("/api/books/{id}");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/borrow",
        Some(json!({ "book": id, "quantity": 2, "dueDate": "2099-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["message"], "Book borrowed successfully");
    assert_eq!(body["data"]["book"], id.as_str());
    assert_eq!(body["data"]["quantity"], 2);

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["data"]["copies"], 1);
    assert_eq!(body["data"]["available"], true);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/borrow",
        Some(json!({ "book": id, "quantity": 2, "dueDate": "2099-01-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Not enough copies available");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/borrow",
        Some(json!({ "book": id, "quantity": 1, "dueDate": "2099-01-01T12:00:00Z" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(body["data"]["copies"], 0);
    assert_eq!(body["data"]["available"], false);
}

#[tokio::test]
async fn borrow_with_past_due_date_is_rejected() {
    let app = app();
    let book = create_book(&app, "Kindred", "42", 3).await;
    let id = book["_id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/borrow",
        Some(json!({ "book": id, "quantity": 1, "dueDate": "2000-01-01" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid due date");
    assert_eq!(body["error"], "Due date must be in the future");

    let (_, body) = send(&app, Method::GET, &format!("/api/books/{id}"), None).await;
    assert_eq!(body["data"]["copies"], 3);
}

#[tokio::test]
async fn borrow_of_unknown_book_is_not_found() {
    let app = app();
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/borrow",
        Some(json!({
            "book": "7f0c2d5e-6d8a-4b1e-9d1c-3f5b8c2a1e00",
            "quantity": 1,
            "dueDate": "2099-01-01"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn borrow_summary_totals_per_book() {
    let app = app();
    let kindred = create_book(&app, "Kindred", "1", 10).await;
    let dawn = create_book(&app, "Dawn", "2", 10).await;

    for (book, quantity) in [(&kindred, 2), (&dawn, 1), (&kindred, 3)] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/borrow",
            Some(json!({ "book": book["_id"], "quantity": quantity, "dueDate": "2099-01-01" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, "/api/borrow", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Borrowed books summary retrieved successfully");
    assert_eq!(
        body["data"],
        json!([
            { "book": { "title": "Dawn", "isbn": "2" }, "totalQuantity": 1 },
            { "book": { "title": "Kindred", "isbn": "1" }, "totalQuantity": 5 }
        ])
    );
}

#[tokio::test]
async fn disallowed_origin_is_forbidden() {
    let app = app();
    let request = Request::builder()
        .uri("/api/books")
        .header(header::ORIGIN, "http://evil.example")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Origin not allowed");
}

#[tokio::test]
async fn allowed_origin_gets_cors_headers() {
    let app = app();
    let request = Request::builder()
        .uri("/api/books")
        .header(header::ORIGIN, ALLOWED_ORIGIN)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        ALLOWED_ORIGIN
    );
}

fn preflight(origin: &str) -> Request<Body> {
    Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/books")
        .header(header::ORIGIN, origin)
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "PATCH")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn preflight_from_disallowed_origin_is_forbidden() {
    let response = app().oneshot(preflight("http://evil.example")).await.unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(response
        .headers()
        .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .is_none());

    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Origin not allowed");
}

#[tokio::test]
async fn preflight_from_allowed_origin_gets_allow_headers() {
    let response = app().oneshot(preflight(ALLOWED_ORIGIN)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(
        headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
        ALLOWED_ORIGIN
    );
    let methods = headers
        .get(header::ACCESS_CONTROL_ALLOW_METHODS)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(methods.contains("PATCH"), "{methods}");
    let allowed_headers = headers
        .get(header::ACCESS_CONTROL_ALLOW_HEADERS)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(allowed_headers.contains("content-type"), "{allowed_headers}");
}

#[tokio::test]
async fn request_without_origin_passes() {
    let app = app();
    let (status, _) = send(&app, Method::GET, "/api/books", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let app = app();
    let (status, body) = send(&app, Method::GET, "/api/nothing-here", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Route not found");
}

#[tokio::test]
async fn health_and_readiness() {
    let app = app();

    let (status, body) = send(&app, Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "Service is healthy");
    assert_eq!(body["data"]["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/api/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "ready");
}
