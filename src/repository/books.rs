//! Books repository for database operations

use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, CreateBook, UpdateBook},
};

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Postgres>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get book by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound { entity: "Book", id: id.to_string() })
    }

    /// Get book by ID, locking the row for the duration of the transaction.
    /// Serializes concurrent ledger mutations for the same book.
    pub async fn get_by_id_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
    ) -> AppResult<Book> {
        sqlx::query_as::<_, Book>("SELECT * FROM books WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound { entity: "Book", id: id.to_string() })
    }

    /// Get book by ISBN
    pub async fn get_by_isbn(&self, isbn: &str) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE isbn = $1")
            .bind(isbn)
            .fetch_optional(&self.pool)
            .await?;
        Ok(book)
    }

    /// List all books ordered by id
    pub async fn list(&self) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Case-insensitive title search
    pub async fn search_by_title(&self, keyword: &str) -> AppResult<Vec<Book>> {
        let pattern = format!("%{}%", keyword);
        let books =
            sqlx::query_as::<_, Book>("SELECT * FROM books WHERE title ILIKE $1 ORDER BY id")
                .bind(pattern)
                .fetch_all(&self.pool)
                .await?;
        Ok(books)
    }

    /// Books by exact author name
    pub async fn list_by_author(&self, author: &str) -> AppResult<Vec<Book>> {
        let books = sqlx::query_as::<_, Book>("SELECT * FROM books WHERE author = $1 ORDER BY id")
            .bind(author)
            .fetch_all(&self.pool)
            .await?;
        Ok(books)
    }

    /// Insert a new book. Both ledger counters start at `total_copies`.
    pub async fn create(&self, book: &CreateBook) -> AppResult<Book> {
        let total = book.total_copies.unwrap_or(1);
        let created = sqlx::query_as::<_, Book>(
            r#"
            INSERT INTO books (title, author, isbn, publication_year, total_copies, available_copies)
            VALUES ($1, $2, $3, $4, $5, $5)
            RETURNING *
            "#,
        )
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(book.publication_year)
        .bind(total)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    /// Update book fields. A `total_copies` change shifts `available_copies`
    /// by the same delta, floored at zero.
    pub async fn update(&self, id: i64, book: &UpdateBook) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET title = COALESCE($2, title),
                author = COALESCE($3, author),
                publication_year = COALESCE($4, publication_year),
                available_copies = CASE
                    WHEN $5::int IS NOT NULL
                        THEN GREATEST(0, available_copies + ($5 - total_copies))
                    ELSE available_copies
                END,
                total_copies = COALESCE($5, total_copies)
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.publication_year)
        .bind(book.total_copies)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound { entity: "Book", id: id.to_string() })
    }

    /// Delete a book
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound {
                entity: "Book",
                id: id.to_string(),
            });
        }
        Ok(())
    }

    /// Take one copy off the shelf. Returns false when no copy was left,
    /// keeping the check and the decrement in one guarded statement.
    pub async fn take_copy(&self, tx: &mut Transaction<'_, Postgres>, id: i64) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE books SET available_copies = available_copies - 1
             WHERE id = $1 AND available_copies > 0",
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;
        Ok(result.rows_affected() == 1)
    }

    /// Put one copy back on the shelf, capped at `total_copies`
    pub async fn put_copy_back(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
    ) -> AppResult<()> {
        sqlx::query(
            "UPDATE books SET available_copies = LEAST(available_copies + 1, total_copies)
             WHERE id = $1",
        )
        .bind(id)
        .execute(&mut **tx)
        .await?;
        Ok(())
    }

    /// Add copies to both ledger counters
    pub async fn add_copies(&self, id: i64, quantity: i32) -> AppResult<Book> {
        sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET total_copies = total_copies + $2,
                available_copies = available_copies + $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound { entity: "Book", id: id.to_string() })
    }

    /// Remove copies from both ledger counters. Fails when fewer than
    /// `quantity` copies are on the shelf, so copies out on loan are never
    /// removed. Returns the updated book, or None when the guard rejected.
    pub async fn remove_copies(&self, id: i64, quantity: i32) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>(
            r#"
            UPDATE books
            SET total_copies = total_copies - $2,
                available_copies = available_copies - $2
            WHERE id = $1 AND available_copies >= $2
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(quantity)
        .fetch_optional(&self.pool)
        .await?;
        Ok(book)
    }
}
