//! In-process storage backend.
//!
//! Implements both repository traits over a single lock, so a checkout's
//! decrement and borrow insert land together, matching the PostgreSQL
//! transaction.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BookRepository, BorrowRepository};
use crate::{
    error::{AppError, AppResult},
    models::{
        Book, BookListing, BookSortField, Borrow, BorrowSummary, BorrowedBook, Checkout, SortOrder,
    },
};

#[derive(Default)]
struct Store {
    books: HashMap<Uuid, Book>,
    borrows: Vec<Borrow>,
}

impl Store {
    fn isbn_taken(&self, isbn: &str, exclude_id: Option<Uuid>) -> bool {
        self.books
            .values()
            .any(|b| b.isbn == isbn && Some(b.id) != exclude_id)
    }
}

#[derive(Default)]
pub struct InMemoryRepository {
    store: RwLock<Store>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare(a: &Book, b: &Book, field: BookSortField) -> Ordering {
    match field {
        BookSortField::CreatedAt => a.created_at.cmp(&b.created_at),
        BookSortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        BookSortField::Title => a.title.cmp(&b.title),
        BookSortField::Author => a.author.cmp(&b.author),
        BookSortField::Genre => a.genre.as_str().cmp(b.genre.as_str()),
        BookSortField::Isbn => a.isbn.cmp(&b.isbn),
        BookSortField::Copies => a.copies.cmp(&b.copies),
    }
    .then_with(|| a.id.cmp(&b.id))
}

fn duplicate_isbn(isbn: &str) -> AppError {
    AppError::Validation(format!("isbn {} is already used by another book", isbn))
}

#[async_trait]
impl BookRepository for InMemoryRepository {
    async fn create(&self, book: &Book) -> AppResult<Book> {
        let mut store = self.store.write().await;
        if store.isbn_taken(&book.isbn, None) {
            return Err(duplicate_isbn(&book.isbn));
        }
        store.books.insert(book.id, book.clone());
        Ok(book.clone())
    }

    async fn list(&self, listing: &BookListing) -> AppResult<(Vec<Book>, i64)> {
        let store = self.store.read().await;

        let mut books: Vec<&Book> = store
            .books
            .values()
            .filter(|b| listing.genre.map_or(true, |genre| b.genre == genre))
            .collect();

        books.sort_by(|a, b| {
            let ordering = compare(a, b, listing.sort_by);
            match listing.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = books.len() as i64;
        let page = books
            .into_iter()
            .skip(listing.offset.max(0) as usize)
            .take(listing.limit.max(0) as usize)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        Ok(self.store.read().await.books.get(&id).cloned())
    }

    async fn isbn_exists(&self, isbn: &str, exclude_id: Option<Uuid>) -> AppResult<bool> {
        Ok(self.store.read().await.isbn_taken(isbn, exclude_id))
    }

    async fn update(&self, book: &Book, expected_copies: i32) -> AppResult<Option<Book>> {
        let mut store = self.store.write().await;
        match store.books.get(&book.id) {
            Some(stored) if stored.copies == expected_copies => {}
            _ => return Ok(None),
        }
        if store.isbn_taken(&book.isbn, Some(book.id)) {
            return Err(duplicate_isbn(&book.isbn));
        }
        store.books.insert(book.id, book.clone());
        Ok(Some(book.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.store.write().await.books.remove(&id).is_some())
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

#[async_trait]
impl BorrowRepository for InMemoryRepository {
    async fn checkout(&self, checkout: &Checkout) -> AppResult<Option<Borrow>> {
        let mut store = self.store.write().await;

        match store.books.get_mut(&checkout.book.id) {
            Some(stored) if stored.copies == checkout.expected_copies => {
                stored.set_copies(checkout.book.copies);
                stored.updated_at = checkout.book.updated_at;
            }
            _ => return Ok(None),
        }

        let borrow = checkout.record();
        store.borrows.push(borrow.clone());
        Ok(Some(borrow))
    }

    async fn summary(&self) -> AppResult<Vec<BorrowSummary>> {
        let store = self.store.read().await;

        let mut totals: HashMap<Uuid, i64> = HashMap::new();
        for borrow in &store.borrows {
            *totals.entry(borrow.book).or_default() += i64::from(borrow.quantity);
        }

        let mut summary: Vec<BorrowSummary> = totals
            .into_iter()
            .filter_map(|(book_id, total_quantity)| {
                store.books.get(&book_id).map(|book| BorrowSummary {
                    book: BorrowedBook {
                        title: book.title.clone(),
                        isbn: book.isbn.clone(),
                    },
                    total_quantity,
                })
            })
            .collect();

        summary.sort_by(|a, b| {
            a.book
                .title
                .cmp(&b.book.title)
                .then_with(|| a.book.isbn.cmp(&b.book.isbn))
        });
        Ok(summary)
    }
}
