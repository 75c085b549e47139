//! Borrowing service

use chrono::Utc;
use validator::Validate;

use crate::{
    config::BorrowConfig,
    error::{AppError, AppResult},
    models::{Borrow, BorrowSummary, Checkout, CreateBorrow},
    repository::Repository,
};

#[derive(Clone)]
pub struct BorrowsService {
    repository: Repository,
    max_retries: u32,
}

impl BorrowsService {
    pub fn new(repository: Repository, config: &BorrowConfig) -> Self {
        Self {
            repository,
            max_retries: config.max_retries,
        }
    }

    /// Borrow copies of a book.
    ///
    /// Copy sufficiency is checked before the due date. The decrement only
    /// applies if the copy count is still the one read here; on a lost race the
    /// book is re-read and the checks run again.
    pub async fn borrow(&self, request: CreateBorrow) -> AppResult<Borrow> {
        request.validate()?;
        let (Some(book_id), Some(quantity), Some(due_date)) =
            (request.book, request.quantity, request.due_date)
        else {
            return Err(AppError::Internal("validated borrow is missing a required field".into()));
        };

        let started_at = Utc::now();

        for attempt in 0..=self.max_retries {
            let book = self
                .repository
                .books
                .get_by_id(book_id)
                .await?
                .ok_or_else(|| AppError::NotFound("Book not found".to_string()))?;

            if quantity > book.copies {
                return Err(AppError::InsufficientCopies {
                    requested: quantity,
                    available: book.copies,
                });
            }

            if due_date <= started_at {
                return Err(AppError::InvalidDueDate);
            }

            let checkout = Checkout::new(&book, quantity, due_date);
            if let Some(borrow) = self.repository.borrows.checkout(&checkout).await? {
                tracing::info!(
                    "Borrow record created for book: {} (quantity={}, copies left={})",
                    book_id,
                    quantity,
                    checkout.book.copies
                );
                return Ok(borrow);
            }

            tracing::warn!(
                "Copy count of book {} changed during borrow, retrying (attempt {})",
                book_id,
                attempt + 1
            );
        }

        Err(AppError::Conflict(format!(
            "Book {} is being borrowed concurrently, please retry",
            book_id
        )))
    }

    /// Total quantity borrowed per book
    pub async fn summary(&self) -> AppResult<Vec<BorrowSummary>> {
        self.repository.borrows.summary().await
    }
}
