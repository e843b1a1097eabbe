//! Loans repository for database operations

use chrono::NaiveDate;
use sqlx::{Pool, Postgres, Transaction};

use crate::{
    error::{AppError, AppResult},
    models::loan::{Loan, LoanDetailsRow, LoanStatus},
};

#[derive(Clone)]
pub struct LoansRepository {
    pool: Pool<Postgres>,
}

const DETAILS_SELECT: &str = r#"
    SELECT l.id, l.user_id, u.name AS user_name,
           l.book_id, b.title AS book_title,
           l.loan_date, l.due_date, l.return_date,
           l.status, l.renewal_count
    FROM loans l
    JOIN users u ON l.user_id = u.id
    JOIN books b ON l.book_id = b.id
"#;

impl LoansRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get loan by ID
    pub async fn get_by_id(&self, id: i64) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound { entity: "Loan", id: id.to_string() })
    }

    /// Get loan by ID, locking the row for the duration of the transaction.
    /// Serializes concurrent return/extend on the same loan.
    pub async fn get_by_id_for_update(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
    ) -> AppResult<Loan> {
        sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or_else(|| AppError::NotFound { entity: "Loan", id: id.to_string() })
    }

    /// All loans of a user, read inside the caller's transaction. With the
    /// user row locked this is the eligibility snapshot.
    pub async fn list_by_user(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
    ) -> AppResult<Vec<Loan>> {
        let loans = sqlx::query_as::<_, Loan>("SELECT * FROM loans WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(&mut **tx)
            .await?;
        Ok(loans)
    }

    /// Insert a new ACTIVE loan
    pub async fn insert(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        user_id: i64,
        book_id: i64,
        loan_date: NaiveDate,
        due_date: NaiveDate,
    ) -> AppResult<Loan> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            INSERT INTO loans (user_id, book_id, loan_date, due_date, status, renewal_count)
            VALUES ($1, $2, $3, $4, 'ACTIVE', 0)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(book_id)
        .bind(loan_date)
        .bind(due_date)
        .fetch_one(&mut **tx)
        .await?;
        Ok(loan)
    }

    /// Move a loan to its terminal RETURNED state
    pub async fn mark_returned(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        return_date: NaiveDate,
    ) -> AppResult<Loan> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET status = 'RETURNED', return_date = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(return_date)
        .fetch_one(&mut **tx)
        .await?;
        Ok(loan)
    }

    /// Push the due date forward and bump the renewal counter.
    /// The loan date is never touched.
    pub async fn apply_extension(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        id: i64,
        new_due_date: NaiveDate,
        new_renewal_count: i32,
    ) -> AppResult<Loan> {
        let loan = sqlx::query_as::<_, Loan>(
            r#"
            UPDATE loans
            SET due_date = $2, renewal_count = $3
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(new_due_date)
        .bind(new_renewal_count)
        .fetch_one(&mut **tx)
        .await?;
        Ok(loan)
    }

    /// Loan with joined user/book display fields
    pub async fn get_details(&self, id: i64) -> AppResult<LoanDetailsRow> {
        let query = format!("{} WHERE l.id = $1", DETAILS_SELECT);
        sqlx::query_as::<_, LoanDetailsRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound { entity: "Loan", id: id.to_string() })
    }

    /// ACTIVE loans of a user with display fields, ordered by loan id
    pub async fn active_details_by_user(&self, user_id: i64) -> AppResult<Vec<LoanDetailsRow>> {
        let query = format!(
            "{} WHERE l.user_id = $1 AND l.status = 'ACTIVE' ORDER BY l.id",
            DETAILS_SELECT
        );
        let rows = sqlx::query_as::<_, LoanDetailsRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Loans whose stored status is OVERDUE, ordered by loan id.
    /// ACTIVE loans past their due date appear here only after the sweep
    /// has materialized the transition.
    pub async fn overdue_details(&self) -> AppResult<Vec<LoanDetailsRow>> {
        let query = format!("{} WHERE l.status = 'OVERDUE' ORDER BY l.id", DETAILS_SELECT);
        let rows = sqlx::query_as::<_, LoanDetailsRow>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    /// Count a user's loans in a given stored status
    pub async fn count_by_user_and_status(
        &self,
        user_id: i64,
        status: LoanStatus,
    ) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE user_id = $1 AND status = $2")
                .bind(user_id)
                .bind(status)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Count all loans referencing a book
    pub async fn count_by_book(&self, book_id: i64) -> AppResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM loans WHERE book_id = $1")
            .bind(book_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Materialize ACTIVE -> OVERDUE for loans past their due date.
    /// Returns the number of loans transitioned.
    pub async fn sweep_overdue(&self, today: NaiveDate) -> AppResult<u64> {
        let result = sqlx::query(
            "UPDATE loans SET status = 'OVERDUE' WHERE status = 'ACTIVE' AND due_date < $1",
        )
        .bind(today)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
