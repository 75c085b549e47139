//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::Validate;

use super::enums::{BookSortField, Genre, SortOrder};

/// A book is available while at least one copy is on the shelf.
pub fn is_available(copies: i32) -> bool {
    copies > 0
}

/// Book record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: Genre,
    pub isbn: String,
    pub description: Option<String>,
    /// Physical copies currently on the shelf
    pub copies: i32,
    /// Derived from `copies`, never set by callers
    pub available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Build a new, not yet persisted book
    pub fn new(
        title: String,
        author: String,
        genre: Genre,
        isbn: String,
        description: Option<String>,
        copies: i32,
    ) -> Self {
        let now = Utc::now();
        let mut book = Self {
            id: Uuid::new_v4(),
            title,
            author,
            genre,
            isbn,
            description,
            copies: 0,
            available: false,
            created_at: now,
            updated_at: now,
        };
        book.set_copies(copies);
        book
    }

    /// Set the copy count; the only place `available` is written.
    pub fn set_copies(&mut self, copies: i32) {
        self.copies = copies;
        self.available = is_available(copies);
    }

    /// Apply a validated patch. `available` is recomputed even when `copies`
    /// is untouched so a stale flag never survives an update.
    pub fn apply(&mut self, patch: &UpdateBook, genre: Option<Genre>) {
        if let Some(ref title) = patch.title {
            self.title = title.clone();
        }
        if let Some(ref author) = patch.author {
            self.author = author.clone();
        }
        if let Some(genre) = genre {
            self.genre = genre;
        }
        if let Some(ref isbn) = patch.isbn {
            self.isbn = isbn.clone();
        }
        if let Some(ref description) = patch.description {
            self.description = description.clone();
        }
        self.set_copies(patch.copies.unwrap_or(self.copies));
        self.updated_at = Utc::now();
    }
}

/// Create book request.
///
/// Every field is optional at the serde level so that a single response can
/// report all missing fields at once. Unknown keys such as `available` are
/// ignored.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(
        required(message = "title is required"),
        length(min = 1, message = "title must not be empty")
    )]
    pub title: Option<String>,
    #[validate(
        required(message = "author is required"),
        length(min = 1, message = "author must not be empty")
    )]
    pub author: Option<String>,
    /// One of FICTION, NON_FICTION, SCIENCE, HISTORY, BIOGRAPHY, FANTASY
    #[validate(required(message = "genre is required"))]
    pub genre: Option<String>,
    #[validate(
        required(message = "isbn is required"),
        length(min = 1, message = "isbn must not be empty")
    )]
    pub isbn: Option<String>,
    pub description: Option<String>,
    /// Defaults to 1
    #[validate(range(min = 0, message = "copies must not be negative"))]
    pub copies: Option<i32>,
}

/// Partial update request
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: Option<String>,
    #[validate(length(min = 1, message = "author must not be empty"))]
    pub author: Option<String>,
    pub genre: Option<String>,
    #[validate(length(min = 1, message = "isbn must not be empty"))]
    pub isbn: Option<String>,
    /// Absent leaves the description alone, `null` clears it
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[validate(range(min = 0, message = "copies must not be negative"))]
    pub copies: Option<i32>,
}

/// Book listing query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Restrict to one genre
    pub filter: Option<Genre>,
    /// Field to sort by (default: createdAt)
    pub sort_by: Option<BookSortField>,
    /// `asc` or `desc` (default: desc)
    pub sort: Option<SortOrder>,
    /// Page size (default: 10)
    pub limit: Option<i64>,
    /// 1-based page number (default: 1)
    pub page: Option<i64>,
}

/// Normalized listing request handed to the repository
#[derive(Debug, Clone, PartialEq)]
pub struct BookListing {
    pub genre: Option<Genre>,
    pub sort_by: BookSortField,
    pub order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl Pagination {
    pub fn new(total: i64, page: i64, limit: i64) -> Self {
        Self {
            total,
            page,
            limit,
            total_pages: if limit > 0 {
                total / limit + i64::from(total % limit != 0)
            } else {
                0
            },
        }
    }
}

/// One page of books
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub pagination: Pagination,
}
