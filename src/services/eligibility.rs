//! Borrowing eligibility rules
//!
//! Pure decision logic over a snapshot of a user's loans. No side effects;
//! the loan lifecycle engine evaluates these rules inside its transaction
//! so the snapshot stays consistent with the eventual insertion.

use chrono::NaiveDate;

use crate::{
    error::IneligibilityReason,
    models::{
        loan::{Loan, LoanStatus},
        user::{Role, User},
    },
};

/// Maximum number of ACTIVE loans per user. The 5th loan is allowed,
/// a 6th is rejected.
pub const MAX_ACTIVE_LOANS: i64 = 5;

/// Maximum renewals per loan
pub const MAX_RENEWALS: i32 = 3;

/// Allowed loan duration bounds, in days
pub const MIN_LOAN_DAYS: i64 = 1;
pub const MAX_LOAN_DAYS: i64 = 60;

/// Roles allowed to open loans. Every representable role borrows today;
/// the gate keeps its shape for future non-borrowing roles.
fn role_may_borrow(role: Role) -> bool {
    matches!(role, Role::Reader | Role::Librarian)
}

/// Decide whether `user` may open a new loan, given the snapshot `loans` of
/// all their loans, as of `today`.
pub fn can_borrow(
    user: &User,
    loans: &[Loan],
    today: NaiveDate,
) -> Result<(), IneligibilityReason> {
    if !role_may_borrow(user.role) {
        return Err(IneligibilityReason::UnauthorizedRole);
    }

    if loans.iter().any(|loan| loan.is_overdue(today)) {
        return Err(IneligibilityReason::HasOverdueLoans);
    }

    let active = loans
        .iter()
        .filter(|loan| loan.status == LoanStatus::Active)
        .count() as i64;
    if active >= MAX_ACTIVE_LOANS {
        return Err(IneligibilityReason::LoanLimitReached { active });
    }

    Ok(())
}
