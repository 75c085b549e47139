//! Data models

pub mod book;
pub mod borrow;
pub mod enums;

// Re-export commonly used types
pub use book::{Book, BookListing, BookPage, BookQuery, CreateBook, Pagination, UpdateBook};
pub use borrow::{Borrow, BorrowSummary, BorrowedBook, Checkout, CreateBorrow};
pub use enums::{BookSortField, Genre, SortOrder};
