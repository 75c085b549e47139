//! Repository layer for persistence
//!
//! Services talk to storage through [`BookRepository`] and
//! [`BorrowRepository`]. PostgreSQL is the production backend; the in-process
//! store backs the test suite and database-less local runs.

pub mod books;
pub mod borrows;
pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{Book, BookListing, Borrow, BorrowSummary, Checkout},
};

pub use books::PgBooksRepository;
pub use borrows::PgBorrowsRepository;
pub use memory::InMemoryRepository;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Insert a new book. A duplicate ISBN is a validation error.
    async fn create(&self, book: &Book) -> AppResult<Book>;

    /// One page of books plus the total number matching the filter
    async fn list(&self, listing: &BookListing) -> AppResult<(Vec<Book>, i64)>;

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Book>>;

    async fn isbn_exists(&self, isbn: &str, exclude_id: Option<Uuid>) -> AppResult<bool>;

    /// Overwrite a stored book whose copy count is still `expected_copies`.
    ///
    /// Returns `None` without writing when the book is gone or its copy count
    /// moved on.
    async fn update(&self, book: &Book, expected_copies: i32) -> AppResult<Option<Book>>;

    /// `false` if there was nothing to delete
    async fn delete(&self, id: Uuid) -> AppResult<bool>;

    /// Round trip to the backing store, for readiness checks
    async fn ping(&self) -> AppResult<()>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BorrowRepository: Send + Sync {
    /// Apply the decrement and insert the borrow record atomically.
    ///
    /// Returns `None` without writing anything when the book's copy count no
    /// longer equals `checkout.expected_copies` (or the book is gone).
    async fn checkout(&self, checkout: &Checkout) -> AppResult<Option<Borrow>>;

    /// Borrowed quantity per existing book, ordered by title then ISBN
    async fn summary(&self) -> AppResult<Vec<BorrowSummary>>;
}

/// Storage handles shared by all services
#[derive(Clone)]
pub struct Repository {
    pub books: Arc<dyn BookRepository>,
    pub borrows: Arc<dyn BorrowRepository>,
}

impl Repository {
    pub fn new(books: Arc<dyn BookRepository>, borrows: Arc<dyn BorrowRepository>) -> Self {
        Self { books, borrows }
    }

    /// PostgreSQL-backed repository
    pub fn postgres(pool: Pool<Postgres>) -> Self {
        Self::new(
            Arc::new(PgBooksRepository::new(pool.clone())),
            Arc::new(PgBorrowsRepository::new(pool)),
        )
    }

    /// In-process repository; both handles share one store
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryRepository::new());
        Self::new(store.clone(), store)
    }
}
