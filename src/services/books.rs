//! Book catalog service

use uuid::Uuid;
use validator::Validate;

use crate::{
    config::BorrowConfig,
    error::{validation_messages, AppError, AppResult},
    models::{Book, BookListing, BookPage, BookQuery, CreateBook, Genre, Pagination, UpdateBook},
    repository::Repository,
};

const DEFAULT_PAGE_SIZE: i64 = 10;

fn not_found() -> AppError {
    AppError::NotFound("Book not found".to_string())
}

fn parse_genre(raw: Option<&str>, problems: &mut Vec<String>) -> Option<Genre> {
    match raw?.parse::<Genre>() {
        Ok(genre) => Some(genre),
        Err(message) => {
            problems.push(message);
            None
        }
    }
}

fn reject_if_any(mut problems: Vec<String>) -> AppResult<()> {
    if problems.is_empty() {
        return Ok(());
    }
    problems.sort();
    Err(AppError::Validation(problems.join("; ")))
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
    max_retries: u32,
}

impl BooksService {
    pub fn new(repository: Repository, config: &BorrowConfig) -> Self {
        Self {
            repository,
            max_retries: config.max_retries,
        }
    }

    /// Create a book. All violated fields are reported together.
    pub async fn create(&self, data: CreateBook) -> AppResult<Book> {
        let mut problems = validation_messages(data.validate());
        let genre = parse_genre(data.genre.as_deref(), &mut problems);

        if let Some(isbn) = data.isbn.as_deref().filter(|isbn| !isbn.is_empty()) {
            if self.repository.books.isbn_exists(isbn, None).await? {
                problems.push(format!("isbn {} is already used by another book", isbn));
            }
        }
        reject_if_any(problems)?;

        let (Some(title), Some(author), Some(genre), Some(isbn)) =
            (data.title, data.author, genre, data.isbn)
        else {
            return Err(AppError::Internal("validated book is missing a required field".into()));
        };

        let book = Book::new(
            title,
            author,
            genre,
            isbn,
            data.description,
            data.copies.unwrap_or(1),
        );
        let created = self.repository.books.create(&book).await?;
        tracing::info!("Book created: id={} isbn={}", created.id, created.isbn);
        Ok(created)
    }

    /// List books with optional genre filter, sorting and pagination
    pub async fn list(&self, query: &BookQuery) -> AppResult<BookPage> {
        let page = query.page.unwrap_or(1);
        let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);

        let mut problems = Vec::new();
        if page < 1 {
            problems.push("page must be at least 1".to_string());
        }
        if limit < 1 {
            problems.push("limit must be at least 1".to_string());
        }
        reject_if_any(problems)?;

        let listing = BookListing {
            genre: query.filter,
            sort_by: query.sort_by.unwrap_or_default(),
            order: query.sort.unwrap_or_default(),
            limit,
            offset: (page - 1).saturating_mul(limit),
        };

        let (books, total) = self.repository.books.list(&listing).await?;

        Ok(BookPage {
            books,
            pagination: Pagination::new(total, page, limit),
        })
    }

    pub async fn get_by_id(&self, id: Uuid) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await?.ok_or_else(not_found)
    }

    /// Apply a partial update and recompute availability.
    ///
    /// The write only lands if the copy count is still the one the patch was
    /// applied to, so a borrow committed in between is never undone.
    pub async fn update(&self, id: Uuid, patch: UpdateBook) -> AppResult<Book> {
        let mut book = self.get_by_id(id).await?;

        let mut problems = validation_messages(patch.validate());
        let genre = parse_genre(patch.genre.as_deref(), &mut problems);

        if let Some(isbn) = patch.isbn.as_deref().filter(|isbn| !isbn.is_empty()) {
            if isbn != book.isbn && self.repository.books.isbn_exists(isbn, Some(id)).await? {
                problems.push(format!("isbn {} is already used by another book", isbn));
            }
        }
        reject_if_any(problems)?;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                book = self.get_by_id(id).await?;
            }

            let expected_copies = book.copies;
            book.apply(&patch, genre);
            if let Some(updated) = self.repository.books.update(&book, expected_copies).await? {
                return Ok(updated);
            }

            tracing::warn!(
                "Copy count of book {} changed during update, retrying (attempt {})",
                id,
                attempt + 1
            );
        }

        Err(AppError::Conflict(format!(
            "Book {} is being changed concurrently, please retry",
            id
        )))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.repository.books.delete(id).await? {
            return Err(not_found());
        }
        tracing::info!("Book deleted: id={}", id);
        Ok(())
    }
}
