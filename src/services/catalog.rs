//! Catalog (book) management service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
    repository::Repository,
};

#[derive(Clone)]
pub struct CatalogService {
    repository: Repository,
}

impl CatalogService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn create_book(&self, request: CreateBook) -> AppResult<Book> {
        if let Some(isbn) = request.isbn.as_deref() {
            if self.repository.books.get_by_isbn(isbn).await?.is_some() {
                return Err(AppError::Conflict(format!(
                    "A book with ISBN {} already exists",
                    isbn
                )));
            }
        }

        let book = self.repository.books.create(&request).await?;
        tracing::info!(book_id = book.id, title = %book.title, "Book created");
        Ok(book)
    }

    pub async fn get_book(&self, id: i64) -> AppResult<Book> {
        self.repository.books.get_by_id(id).await
    }

    pub async fn get_book_by_isbn(&self, isbn: &str) -> AppResult<Book> {
        self.repository
            .books
            .get_by_isbn(isbn)
            .await?
            .ok_or_else(|| AppError::NotFound {
                entity: "Book",
                id: isbn.to_string(),
            })
    }

    pub async fn list_books(&self) -> AppResult<Vec<Book>> {
        self.repository.books.list().await
    }

    pub async fn search_books(&self, keyword: &str) -> AppResult<Vec<Book>> {
        self.repository.books.search_by_title(keyword).await
    }

    pub async fn books_by_author(&self, author: &str) -> AppResult<Vec<Book>> {
        self.repository.books.list_by_author(author).await
    }

    pub async fn update_book(&self, id: i64, request: UpdateBook) -> AppResult<Book> {
        self.repository.books.update(id, &request).await
    }

    /// Delete a book. Rejected while any loan references it, so the loan
    /// history stays intact.
    pub async fn delete_book(&self, id: i64) -> AppResult<()> {
        // Verify book exists
        self.repository.books.get_by_id(id).await?;

        let loans = self.repository.loans.count_by_book(id).await?;
        if loans > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete a book referenced by {} loans",
                loans
            )));
        }

        self.repository.books.delete(id).await?;
        tracing::info!(book_id = id, "Book deleted");
        Ok(())
    }

    /// Add copies to both ledger counters
    pub async fn increment_copies(&self, id: i64, quantity: i32) -> AppResult<Book> {
        if quantity < 1 {
            return Err(AppError::InvalidInput(
                "Quantity must be positive".to_string(),
            ));
        }
        self.repository.books.add_copies(id, quantity).await
    }

    /// Remove copies from both ledger counters. Copies out on loan cannot
    /// be removed.
    pub async fn decrement_copies(&self, id: i64, quantity: i32) -> AppResult<Book> {
        if quantity < 1 {
            return Err(AppError::InvalidInput(
                "Quantity must be positive".to_string(),
            ));
        }

        match self.repository.books.remove_copies(id, quantity).await? {
            Some(book) => Ok(book),
            None => {
                // Distinguish a missing book from an insufficient shelf
                let book = self.repository.books.get_by_id(id).await?;
                Err(AppError::Conflict(format!(
                    "Only {} of {} copies are on the shelf; cannot remove {}",
                    book.available_copies, book.total_copies, quantity
                )))
            }
        }
    }

    pub async fn is_available(&self, id: i64) -> AppResult<bool> {
        let book = self.repository.books.get_by_id(id).await?;
        Ok(book.is_available())
    }
}
