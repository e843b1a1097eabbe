//! Book model and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

/// Book model from database.
///
/// The copy ledger (`total_copies` / `available_copies`) is mutated only by
/// the loan lifecycle engine and the catalog copy operations; the invariant
/// `0 <= available_copies <= total_copies` holds after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub created_at: DateTime<Utc>,
}

impl Book {
    pub fn is_available(&self) -> bool {
        self.available_copies > 0
    }
}

/// Book representation for API responses, with the derived availability flag
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct BookResponse {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: Option<String>,
    pub publication_year: Option<i32>,
    pub total_copies: i32,
    pub available_copies: i32,
    pub available: bool,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        let available = book.is_available();
        BookResponse {
            id: book.id,
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            publication_year: book.publication_year,
            total_copies: book.total_copies,
            available_copies: book.available_copies,
            available,
        }
    }
}

/// Create book request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 100, message = "Author must be between 1 and 100 characters"))]
    pub author: String,
    #[validate(length(max = 20, message = "ISBN must be at most 20 characters"))]
    pub isbn: Option<String>,
    #[validate(range(min = 0, message = "Publication year cannot be negative"))]
    pub publication_year: Option<i32>,
    /// Defaults to 1 when omitted
    #[validate(range(min = 0, message = "Total copies cannot be negative"))]
    pub total_copies: Option<i32>,
}

/// Update book request. A change to `total_copies` shifts
/// `available_copies` by the same delta, floored at zero.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateBook {
    #[validate(length(min = 1, max = 200, message = "Title must be between 1 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Author must be between 1 and 100 characters"))]
    pub author: Option<String>,
    #[validate(range(min = 0, message = "Publication year cannot be negative"))]
    pub publication_year: Option<i32>,
    #[validate(range(min = 1, message = "Total copies must be at least 1"))]
    pub total_copies: Option<i32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(available: i32, total: i32) -> Book {
        Book {
            id: 1,
            title: "The Name of the Rose".to_string(),
            author: "Umberto Eco".to_string(),
            isbn: Some("9780151446476".to_string()),
            publication_year: Some(1980),
            total_copies: total,
            available_copies: available,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn availability_follows_the_ledger() {
        assert!(book(1, 3).is_available());
        assert!(!book(0, 3).is_available());
    }

    #[test]
    fn response_carries_derived_flag() {
        let response = BookResponse::from(book(0, 2));
        assert!(!response.available);
        assert_eq!(response.available_copies, 0);
        assert_eq!(response.total_copies, 2);
    }
}
