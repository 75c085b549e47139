//! API handlers and router

pub mod books;
pub mod borrows;
pub mod cors;
pub mod health;
pub mod openapi;
pub mod response;

use axum::{
    extract::{FromRequest, FromRequestParts},
    middleware,
    routing::get,
    Json, Router,
};
use tower_http::trace::TraceLayer;

use crate::{error::AppError, AppState};

use response::ApiResponse;

/// JSON body extractor whose rejections use the response envelope
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor whose rejections use the response envelope
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);

/// Path extractor; an unparsable id is reported as not found
#[derive(FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ApiPath<T>(pub T);

/// Welcome message
pub async fn root() -> Json<ApiResponse<()>> {
    Json(ApiResponse::empty("Welcome to Library Management API"))
}

async fn route_not_found() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Create the application router with all routes
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        // Health
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        // Books
        .route("/books", get(books::list_books).post(books::create_book))
        .route(
            "/books/:id",
            get(books::get_book)
                .patch(books::update_book)
                .delete(books::delete_book),
        )
        // Borrowing
        .route(
            "/borrow",
            get(borrows::borrow_summary).post(borrows::borrow_book),
        );

    Router::new()
        .route("/", get(root))
        .nest("/api", api)
        .merge(openapi::create_openapi_router())
        .fallback(route_not_found)
        .layer(cors::cors_layer(&state.config.cors))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            cors::enforce_allowed_origin,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
