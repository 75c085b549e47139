//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{books, borrows, health};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Library Management API",
        version = "1.0.0",
        description = "Book catalog and borrowing REST API. Every body is wrapped in `{ success, message, data, error? }`; the schemas below describe `data`."
    ),
    servers(
        (url = "/api", description = "API")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Books
        books::create_book,
        books::list_books,
        books::get_book,
        books::update_book,
        books::delete_book,
        // Borrowing
        borrows::borrow_book,
        borrows::borrow_summary,
    ),
    components(
        schemas(
            // Books
            crate::models::Book,
            crate::models::CreateBook,
            crate::models::UpdateBook,
            crate::models::BookPage,
            crate::models::Pagination,
            crate::models::Genre,
            crate::models::BookSortField,
            crate::models::SortOrder,
            // Borrowing
            crate::models::Borrow,
            crate::models::CreateBorrow,
            crate::models::BorrowSummary,
            crate::models::BorrowedBook,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "books", description = "Book catalog management"),
        (name = "borrow", description = "Borrowing and borrow summary")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
