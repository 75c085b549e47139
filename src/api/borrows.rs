//! Borrowing endpoints

use axum::{extract::State, http::StatusCode, Json};

use crate::{
    error::AppResult,
    models::{Borrow, BorrowSummary, CreateBorrow},
    AppState,
};

use super::{response::ApiResponse, ApiJson};

/// Borrow copies of a book
#[utoipa::path(
    post,
    path = "/borrow",
    tag = "borrow",
    request_body = CreateBorrow,
    responses(
        (status = 201, description = "Book borrowed", body = Borrow),
        (status = 400, description = "Invalid request, not enough copies, or due date not in the future", body = crate::error::ErrorResponse),
        (status = 404, description = "Book not found", body = crate::error::ErrorResponse),
        (status = 409, description = "Book kept changing concurrently", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_book(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CreateBorrow>,
) -> AppResult<(StatusCode, Json<ApiResponse<Borrow>>)> {
    let borrow = state.services.borrows.borrow(request).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Book borrowed successfully", borrow)),
    ))
}

/// Total quantity borrowed per book
#[utoipa::path(
    get,
    path = "/borrow",
    tag = "borrow",
    responses(
        (status = 200, description = "Borrowed books summary", body = [BorrowSummary]),
        (status = 500, description = "Storage failure", body = crate::error::ErrorResponse)
    )
)]
pub async fn borrow_summary(
    State(state): State<AppState>,
) -> AppResult<Json<ApiResponse<Vec<BorrowSummary>>>> {
    let summary = state.services.borrows.summary().await?;
    Ok(Json(ApiResponse::ok(
        "Borrowed books summary retrieved successfully",
        summary,
    )))
}
