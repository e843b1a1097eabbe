//! Loan lifecycle engine
//!
//! Orchestrates creation, extension and return of loans. Every mutation runs
//! in a single transaction with the affected rows locked, so each call either
//! commits all of its effects or none of them.

use chrono::{Duration, NaiveDate, Utc};

use crate::{
    error::{AppError, AppResult},
    models::loan::{CreateLoan, Loan, LoanDetails, LoanStatus},
    repository::Repository,
    services::eligibility::{self, MAX_LOAN_DAYS, MAX_RENEWALS, MIN_LOAN_DAYS},
};

#[derive(Clone)]
pub struct LoansService {
    repository: Repository,
}

impl LoansService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    fn today() -> NaiveDate {
        Utc::now().date_naive()
    }

    /// Create a new loan (borrow a book).
    ///
    /// Lock order: user row, then book row. Concurrent creations for the
    /// same user or the same book serialize on those locks, so the
    /// eligibility snapshot and the availability check stay consistent with
    /// the insertion.
    pub async fn create_loan(&self, request: CreateLoan) -> AppResult<LoanDetails> {
        if !(MIN_LOAN_DAYS..=MAX_LOAN_DAYS).contains(&request.loan_days) {
            return Err(AppError::InvalidInput(format!(
                "Loan days must be {}-{}. Provided: {}",
                MIN_LOAN_DAYS, MAX_LOAN_DAYS, request.loan_days
            )));
        }

        let today = Self::today();
        let mut tx = self.repository.pool.begin().await?;

        let user = self
            .repository
            .users
            .get_by_id_for_update(&mut tx, request.user_id)
            .await?;
        let book = self
            .repository
            .books
            .get_by_id_for_update(&mut tx, request.book_id)
            .await?;

        let loans = self.repository.loans.list_by_user(&mut tx, user.id).await?;
        eligibility::can_borrow(&user, &loans, today).map_err(AppError::IneligibleBorrower)?;

        if !self.repository.books.take_copy(&mut tx, book.id).await? {
            return Err(AppError::BookUnavailable { book_id: book.id });
        }

        let due_date = today + Duration::days(request.loan_days);
        let loan = self
            .repository
            .loans
            .insert(&mut tx, user.id, book.id, today, due_date)
            .await?;

        tx.commit().await?;

        tracing::info!(
            loan_id = loan.id,
            user_id = user.id,
            book_id = book.id,
            due_date = %due_date,
            "Loan created"
        );

        Ok(Self::details(&loan, user.name, book.title, today))
    }

    /// Return a borrowed book. RETURNED is terminal; the ledger increment
    /// happens exactly once, capped at the book's total copies.
    pub async fn return_loan(&self, loan_id: i64) -> AppResult<LoanDetails> {
        let today = Self::today();
        let mut tx = self.repository.pool.begin().await?;

        let loan = self
            .repository
            .loans
            .get_by_id_for_update(&mut tx, loan_id)
            .await?;

        if loan.status == LoanStatus::Returned {
            return Err(AppError::AlreadyReturned {
                loan_id,
                returned_on: loan.return_date.unwrap_or(today),
            });
        }

        let returned = self
            .repository
            .loans
            .mark_returned(&mut tx, loan_id, today)
            .await?;
        self.repository
            .books
            .put_copy_back(&mut tx, loan.book_id)
            .await?;

        tx.commit().await?;

        tracing::info!(loan_id, book_id = loan.book_id, "Loan returned");

        let row = self.repository.loans.get_details(returned.id).await?;
        Ok(row.into_details(today))
    }

    /// Extend an active loan's due date. The loan date never changes.
    pub async fn extend_loan(&self, loan_id: i64, additional_days: i64) -> AppResult<LoanDetails> {
        if additional_days <= 0 {
            return Err(AppError::InvalidInput(format!(
                "Additional days must be positive. Provided: {}",
                additional_days
            )));
        }

        let mut tx = self.repository.pool.begin().await?;

        let loan = self
            .repository
            .loans
            .get_by_id_for_update(&mut tx, loan_id)
            .await?;

        if loan.renewal_count >= MAX_RENEWALS {
            return Err(AppError::RenewalLimitReached { max: MAX_RENEWALS });
        }
        if loan.status != LoanStatus::Active {
            return Err(AppError::LoanNotExtendable {
                status: loan.status,
            });
        }

        let new_due_date = Duration::try_days(additional_days)
            .and_then(|delta| loan.due_date.checked_add_signed(delta))
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Additional days out of range: {}", additional_days))
            })?;
        let extended = self
            .repository
            .loans
            .apply_extension(&mut tx, loan_id, new_due_date, loan.renewal_count + 1)
            .await?;

        tx.commit().await?;

        tracing::info!(
            loan_id,
            renewal_count = extended.renewal_count,
            due_date = %extended.due_date,
            "Loan extended"
        );

        let row = self.repository.loans.get_details(extended.id).await?;
        Ok(row.into_details(Self::today()))
    }

    /// Evaluate the overdue predicate for one loan
    pub async fn is_overdue(&self, loan_id: i64) -> AppResult<bool> {
        let loan = self.repository.loans.get_by_id(loan_id).await?;
        Ok(loan.is_overdue(Self::today()))
    }

    /// ACTIVE loans of a user
    pub async fn active_loans_by_user(&self, user_id: i64) -> AppResult<Vec<LoanDetails>> {
        // Verify user exists
        self.repository.users.get_by_id(user_id).await?;

        let today = Self::today();
        let rows = self.repository.loans.active_details_by_user(user_id).await?;
        Ok(rows.into_iter().map(|r| r.into_details(today)).collect())
    }

    /// Loans with a materialized OVERDUE status. ACTIVE loans past their due
    /// date show up here only once the sweep has transitioned them.
    pub async fn overdue_loans(&self) -> AppResult<Vec<LoanDetails>> {
        let today = Self::today();
        let rows = self.repository.loans.overdue_details().await?;
        Ok(rows.into_iter().map(|r| r.into_details(today)).collect())
    }

    /// Materialize ACTIVE -> OVERDUE transitions for loans past their due
    /// date. Called by the periodic sweep task.
    pub async fn sweep_overdue(&self) -> AppResult<u64> {
        let swept = self.repository.loans.sweep_overdue(Self::today()).await?;
        if swept > 0 {
            tracing::info!(count = swept, "Marked loans overdue");
        }
        Ok(swept)
    }

    fn details(loan: &Loan, user_name: String, book_title: String, today: NaiveDate) -> LoanDetails {
        LoanDetails {
            id: loan.id,
            user_id: loan.user_id,
            user_name,
            book_id: loan.book_id,
            book_title,
            loan_date: loan.loan_date,
            due_date: loan.due_date,
            return_date: loan.return_date,
            status: loan.status,
            renewal_count: loan.renewal_count,
            overdue: loan.is_overdue(today),
        }
    }
}
