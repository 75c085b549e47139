//! Books repository for PostgreSQL

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, Pool, Postgres};
use uuid::Uuid;

use super::BookRepository;
use crate::{
    error::{AppError, AppResult},
    models::{Book, BookListing, Genre},
};

const BOOK_COLUMNS: &str =
    "id, title, author, genre, isbn, description, copies, available, created_at, updated_at";

#[derive(FromRow)]
struct BookRow {
    id: Uuid,
    title: String,
    author: String,
    genre: String,
    isbn: String,
    description: Option<String>,
    copies: i32,
    available: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<BookRow> for Book {
    type Error = AppError;

    fn try_from(row: BookRow) -> Result<Self, Self::Error> {
        let genre = row
            .genre
            .parse::<Genre>()
            .map_err(|_| AppError::Internal(format!("Book {} has unknown genre {}", row.id, row.genre)))?;

        Ok(Book {
            id: row.id,
            title: row.title,
            author: row.author,
            genre,
            isbn: row.isbn,
            description: row.description,
            copies: row.copies,
            available: row.available,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Map a unique-constraint hit on `isbn` to the same error the service reports
/// for a duplicate found ahead of the write.
fn duplicate_isbn(error: sqlx::Error, isbn: &str) -> AppError {
    match error {
        sqlx::Error::Database(ref db) if db.is_unique_violation() => {
            AppError::Validation(format!("isbn {} is already used by another book", isbn))
        }
        other => AppError::Database(other),
    }
}

#[derive(Clone)]
pub struct PgBooksRepository {
    pool: Pool<Postgres>,
}

impl PgBooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepository for PgBooksRepository {
    async fn create(&self, book: &Book) -> AppResult<Book> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            INSERT INTO books (id, title, author, genre, isbn, description, copies, available, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.genre.as_str())
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(book.copies)
        .bind(book.available)
        .bind(book.created_at)
        .bind(book.updated_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| duplicate_isbn(e, &book.isbn))?;

        row.try_into()
    }

    async fn list(&self, listing: &BookListing) -> AppResult<(Vec<Book>, i64)> {
        let genre = listing.genre.map(|g| g.as_str());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM books WHERE ($1::text IS NULL OR genre = $1)",
        )
        .bind(genre)
        .fetch_one(&self.pool)
        .await?;

        // Sort column and direction come from closed enums, never from raw input.
        let select_query = format!(
            r#"
            SELECT {}
            FROM books
            WHERE ($1::text IS NULL OR genre = $1)
            ORDER BY {} {}, id {}
            LIMIT $2 OFFSET $3
            "#,
            BOOK_COLUMNS,
            listing.sort_by.column(),
            listing.order.as_sql(),
            listing.order.as_sql(),
        );

        let rows = sqlx::query_as::<_, BookRow>(&select_query)
            .bind(genre)
            .bind(listing.limit)
            .bind(listing.offset)
            .fetch_all(&self.pool)
            .await?;

        let books = rows
            .into_iter()
            .map(Book::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok((books, total))
    }

    async fn get_by_id(&self, id: Uuid) -> AppResult<Option<Book>> {
        sqlx::query_as::<_, BookRow>(&format!("SELECT {} FROM books WHERE id = $1", BOOK_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Book::try_from)
            .transpose()
    }

    async fn isbn_exists(&self, isbn: &str, exclude_id: Option<Uuid>) -> AppResult<bool> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM books WHERE isbn = $1 AND ($2::uuid IS NULL OR id <> $2))",
        )
        .bind(isbn)
        .bind(exclude_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update(&self, book: &Book, expected_copies: i32) -> AppResult<Option<Book>> {
        let row = sqlx::query_as::<_, BookRow>(&format!(
            r#"
            UPDATE books
            SET title = $2, author = $3, genre = $4, isbn = $5, description = $6,
                copies = $7, available = $8, updated_at = $9
            WHERE id = $1 AND copies = $10
            RETURNING {}
            "#,
            BOOK_COLUMNS
        ))
        .bind(book.id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.genre.as_str())
        .bind(&book.isbn)
        .bind(&book.description)
        .bind(book.copies)
        .bind(book.available)
        .bind(book.updated_at)
        .bind(expected_copies)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| duplicate_isbn(e, &book.isbn))?;

        row.map(Book::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
