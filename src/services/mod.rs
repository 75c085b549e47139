//! Business logic services

pub mod books;
pub mod borrows;

use crate::{config::AppConfig, repository::Repository};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub books: books::BooksService,
    pub borrows: borrows::BorrowsService,
    repository: Repository,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(repository: Repository, config: &AppConfig) -> Self {
        Self {
            books: books::BooksService::new(repository.clone(), &config.borrow),
            borrows: borrows::BorrowsService::new(repository.clone(), &config.borrow),
            repository,
        }
    }

    /// Whether the storage backend answers
    pub async fn storage_ready(&self) -> bool {
        match self.repository.books.ping().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Storage ping failed: {}", e);
                false
            }
        }
    }
}
