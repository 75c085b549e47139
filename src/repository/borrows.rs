//! Borrows repository for PostgreSQL

use async_trait::async_trait;
use sqlx::{FromRow, Pool, Postgres};

use super::BorrowRepository;
use crate::{
    error::AppResult,
    models::{Borrow, BorrowSummary, BorrowedBook, Checkout},
};

#[derive(FromRow)]
struct SummaryRow {
    title: String,
    isbn: String,
    total_quantity: i64,
}

#[derive(Clone)]
pub struct PgBorrowsRepository {
    pool: Pool<Postgres>,
}

impl PgBorrowsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BorrowRepository for PgBorrowsRepository {
    async fn checkout(&self, checkout: &Checkout) -> AppResult<Option<Borrow>> {
        let mut tx = self.pool.begin().await?;

        let book = &checkout.book;
        let updated = sqlx::query(
            r#"
            UPDATE books
            SET copies = $2, available = $3, updated_at = $4
            WHERE id = $1 AND copies = $5
            "#,
        )
        .bind(book.id)
        .bind(book.copies)
        .bind(book.available)
        .bind(book.updated_at)
        .bind(checkout.expected_copies)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let record = checkout.record();
        let borrow = sqlx::query_as::<_, Borrow>(
            r#"
            INSERT INTO borrows (id, book_id, quantity, due_date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, book_id AS book, quantity, due_date, created_at, updated_at
            "#,
        )
        .bind(record.id)
        .bind(record.book)
        .bind(record.quantity)
        .bind(record.due_date)
        .bind(record.created_at)
        .bind(record.updated_at)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(Some(borrow))
    }

    async fn summary(&self) -> AppResult<Vec<BorrowSummary>> {
        let rows = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT bk.title, bk.isbn, SUM(b.quantity)::bigint AS total_quantity
            FROM borrows b
            JOIN books bk ON bk.id = b.book_id
            GROUP BY b.book_id, bk.title, bk.isbn
            ORDER BY bk.title, bk.isbn
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| BorrowSummary {
                book: BorrowedBook {
                    title: row.title,
                    isbn: row.isbn,
                },
                total_quantity: row.total_quantity,
            })
            .collect())
    }
}
