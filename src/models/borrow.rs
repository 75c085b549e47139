//! Borrow model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use super::book::Book;

/// Borrow record, written once per successful borrow and never modified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Borrow {
    #[serde(rename = "_id")]
    pub id: Uuid,
    /// Borrowed book id
    pub book: Uuid,
    pub quantity: i32,
    pub due_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Borrow request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBorrow {
    /// Book id
    #[validate(required(message = "book is required"))]
    pub book: Option<Uuid>,
    #[validate(
        required(message = "quantity is required"),
        range(min = 1, message = "quantity must be at least 1")
    )]
    pub quantity: Option<i32>,
    /// RFC 3339 timestamp or `YYYY-MM-DD` (midnight UTC)
    #[serde(default, deserialize_with = "deserialize_due_date")]
    #[schema(value_type = Option<String>, example = "2026-12-31")]
    #[validate(required(message = "dueDate is required"))]
    pub due_date: Option<DateTime<Utc>>,
}

/// Parse a due date given either as a full timestamp or as a calendar date.
pub fn parse_due_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(raw) => parse_due_date(&raw).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "dueDate `{}` is not a valid date (expected YYYY-MM-DD or RFC 3339)",
                raw
            ))
        }),
    }
}

/// The write half of a borrow: the book as it must look after the decrement,
/// guarded by the copy count it was read with.
#[derive(Debug, Clone)]
pub struct Checkout {
    pub book: Book,
    pub expected_copies: i32,
    pub quantity: i32,
    pub due_date: DateTime<Utc>,
}

impl Checkout {
    /// Caller has already checked `quantity <= book.copies`.
    pub fn new(book: &Book, quantity: i32, due_date: DateTime<Utc>) -> Self {
        let mut remaining = book.clone();
        remaining.set_copies(book.copies - quantity);
        remaining.updated_at = Utc::now();
        Self {
            book: remaining,
            expected_copies: book.copies,
            quantity,
            due_date,
        }
    }

    /// Borrow record to persist alongside the decrement
    pub fn record(&self) -> Borrow {
        let now = Utc::now();
        Borrow {
            id: Uuid::new_v4(),
            book: self.book.id,
            quantity: self.quantity,
            due_date: self.due_date,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Title and ISBN of a borrowed book
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct BorrowedBook {
    pub title: String,
    pub isbn: String,
}

/// Total quantity ever borrowed for one book
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BorrowSummary {
    pub book: BorrowedBook,
    pub total_quantity: i64,
}
