//! Loan lifecycle endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    error::AppResult,
    models::loan::{CreateLoan, LoanDetails},
};

use super::AuthenticatedUser;

/// Default loan duration when the request leaves it out
const DEFAULT_LOAN_DAYS: i64 = 14;

/// Create loan request
#[derive(Deserialize, ToSchema)]
pub struct CreateLoanRequest {
    /// Borrowing user ID
    pub user_id: i64,
    /// Book ID
    pub book_id: i64,
    /// Loan duration in days (1-60, default 14)
    pub loan_days: Option<i64>,
}

/// Extension query
#[derive(Deserialize, IntoParams)]
pub struct ExtendQuery {
    /// Number of days to add to the due date
    pub additional_days: i64,
}

/// Create a new loan (borrow a book)
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    security(("bearer_auth" = [])),
    request_body = CreateLoanRequest,
    responses(
        (status = 201, description = "Loan created", body = LoanDetails),
        (status = 400, description = "Invalid loan duration"),
        (status = 404, description = "User or book not found"),
        (status = 409, description = "Borrower ineligible or no copies available")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Json(request): Json<CreateLoanRequest>,
) -> AppResult<(StatusCode, Json<LoanDetails>)> {
    let loan = state
        .services
        .loans
        .create_loan(CreateLoan {
            user_id: request.user_id,
            book_id: request.book_id,
            loan_days: request.loan_days.unwrap_or(DEFAULT_LOAN_DAYS),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(loan)))
}

/// Return a borrowed book
#[utoipa::path(
    patch,
    path = "/loans/{id}/return",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Loan returned", body = LoanDetails),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Loan already returned")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state.services.loans.return_loan(id).await?;
    Ok(Json(loan))
}

/// Extend an active loan's due date
#[utoipa::path(
    patch,
    path = "/loans/{id}/extend",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Loan ID"),
        ExtendQuery
    ),
    responses(
        (status = 200, description = "Loan extended", body = LoanDetails),
        (status = 400, description = "Additional days must be positive"),
        (status = 404, description = "Loan not found"),
        (status = 409, description = "Renewal limit reached or loan not active")
    )
)]
pub async fn extend_loan(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Query(query): Query<ExtendQuery>,
) -> AppResult<Json<LoanDetails>> {
    let loan = state
        .services
        .loans
        .extend_loan(id, query.additional_days)
        .await?;
    Ok(Json(loan))
}

/// Active loans for a user
#[utoipa::path(
    get,
    path = "/loans/user/{user_id}/active",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("user_id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User's active loans", body = Vec<LoanDetails>),
        (status = 404, description = "User not found")
    )
)]
pub async fn active_loans_by_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(user_id): Path<i64>,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.active_loans_by_user(user_id).await?;
    Ok(Json(loans))
}

/// Loans with a materialized OVERDUE status
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Overdue loans", body = Vec<LoanDetails>)
    )
)]
pub async fn overdue_loans(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<LoanDetails>>> {
    let loans = state.services.loans.overdue_loans().await?;
    Ok(Json(loans))
}

/// Check whether a loan is overdue (dynamic predicate)
#[utoipa::path(
    get,
    path = "/loans/{id}/overdue",
    tag = "loans",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Loan ID")),
    responses(
        (status = 200, description = "Check completed", body = bool),
        (status = 404, description = "Loan not found")
    )
)]
pub async fn is_loan_overdue(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let overdue = state.services.loans.is_overdue(id).await?;
    Ok(Json(overdue))
}
