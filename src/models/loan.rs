//! Loan model and related types

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

/// Stored loan status.
///
/// OVERDUE is materialized by the periodic sweep; a loan whose due date has
/// passed can still be stored as ACTIVE. Code that cares about overdue-ness
/// must use [`Loan::is_overdue`], which covers both forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum LoanStatus {
    Active,
    Returned,
    Overdue,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "ACTIVE",
            LoanStatus::Returned => "RETURNED",
            LoanStatus::Overdue => "OVERDUE",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ACTIVE" => Ok(LoanStatus::Active),
            "RETURNED" => Ok(LoanStatus::Returned),
            "OVERDUE" => Ok(LoanStatus::Overdue),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// SQLx conversion for LoanStatus (stored as TEXT)
impl sqlx::Type<Postgres> for LoanStatus {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for LoanStatus {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for LoanStatus {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        <String as Encode<Postgres>>::encode(self.as_str().to_string(), buf)
    }
}

/// Loan model from database.
///
/// The user and book references are set at creation and never change; the
/// record itself is never deleted.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Loan {
    pub id: i64,
    pub user_id: i64,
    pub book_id: i64,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
    pub renewal_count: i32,
    pub created_at: DateTime<Utc>,
}

impl Loan {
    /// The overdue predicate: stored OVERDUE, or ACTIVE with a due date
    /// strictly before `today`.
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.status == LoanStatus::Overdue
            || (self.status == LoanStatus::Active && self.due_date < today)
    }
}

/// Create loan command handed to the lifecycle engine
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLoan {
    pub user_id: i64,
    pub book_id: i64,
    pub loan_days: i64,
}

/// Internal row structure for loan queries joined with user and book
#[derive(Debug, Clone, FromRow)]
pub struct LoanDetailsRow {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub book_id: i64,
    pub book_title: String,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
    pub renewal_count: i32,
}

impl LoanDetailsRow {
    /// Attach the dynamic overdue flag evaluated at `today`
    pub fn into_details(self, today: NaiveDate) -> LoanDetails {
        let overdue = self.status == LoanStatus::Overdue
            || (self.status == LoanStatus::Active && self.due_date < today);
        LoanDetails {
            id: self.id,
            user_id: self.user_id,
            user_name: self.user_name,
            book_id: self.book_id,
            book_title: self.book_title,
            loan_date: self.loan_date,
            due_date: self.due_date,
            return_date: self.return_date,
            status: self.status,
            renewal_count: self.renewal_count,
            overdue,
        }
    }
}

/// Loan with joined display fields and the derived overdue flag
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoanDetails {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub book_id: i64,
    pub book_title: String,
    pub loan_date: NaiveDate,
    pub due_date: NaiveDate,
    pub return_date: Option<NaiveDate>,
    pub status: LoanStatus,
    pub renewal_count: i32,
    pub overdue: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loan(status: LoanStatus, due_date: NaiveDate) -> Loan {
        Loan {
            id: 1,
            user_id: 1,
            book_id: 1,
            loan_date: due_date - chrono::Duration::days(14),
            due_date,
            return_date: None,
            status,
            renewal_count: 0,
            created_at: Utc::now(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn active_loan_past_due_is_overdue_without_status_change() {
        let today = date(2024, 6, 15);
        let l = loan(LoanStatus::Active, date(2024, 6, 14));
        assert!(l.is_overdue(today));
        assert_eq!(l.status, LoanStatus::Active);
    }

    #[test]
    fn active_loan_due_today_is_not_overdue() {
        let today = date(2024, 6, 15);
        assert!(!loan(LoanStatus::Active, today).is_overdue(today));
    }

    #[test]
    fn stored_overdue_status_counts_regardless_of_date() {
        let today = date(2024, 6, 15);
        let l = loan(LoanStatus::Overdue, date(2024, 7, 1));
        assert!(l.is_overdue(today));
    }

    #[test]
    fn returned_loan_is_never_overdue() {
        let today = date(2024, 6, 15);
        let mut l = loan(LoanStatus::Returned, date(2024, 6, 1));
        l.return_date = Some(date(2024, 6, 10));
        assert!(!l.is_overdue(today));
    }

    #[test]
    fn status_round_trips_through_text() {
        assert_eq!("ACTIVE".parse::<LoanStatus>().unwrap(), LoanStatus::Active);
        assert_eq!(
            "returned".parse::<LoanStatus>().unwrap(),
            LoanStatus::Returned
        );
        assert_eq!(LoanStatus::Overdue.as_str(), "OVERDUE");
        assert!("LOST".parse::<LoanStatus>().is_err());
    }
}
