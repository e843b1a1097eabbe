//! Error types for the BookHub server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

use crate::models::loan::LoanStatus;

/// Reason a user may not open a new loan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IneligibilityReason {
    /// The user's role is not one of the recognized borrowing roles
    UnauthorizedRole,
    /// At least one of the user's loans is overdue
    HasOverdueLoans,
    /// The user already has the maximum number of active loans
    LoanLimitReached { active: i64 },
}

impl std::fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IneligibilityReason::UnauthorizedRole => write!(f, "unauthorized role for loans"),
            IneligibilityReason::HasOverdueLoans => write!(f, "user has overdue loans"),
            IneligibilityReason::LoanLimitReached { active } => {
                write!(f, "loan limit reached ({} active)", active)
            }
        }
    }
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Authorization failed: {0}")]
    Authorization(String),

    #[error("{entity} not found with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("User is not eligible to borrow: {0}")]
    IneligibleBorrower(IneligibilityReason),

    #[error("No copies of book {book_id} available")]
    BookUnavailable { book_id: i64 },

    #[error("Loan {loan_id} already returned on {returned_on}")]
    AlreadyReturned { loan_id: i64, returned_on: NaiveDate },

    #[error("Maximum of {max} renewals reached")]
    RenewalLimitReached { max: i32 },

    #[error("Loan cannot be extended from status {status}")]
    LoanNotExtendable { status: LoanStatus },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable error kind for API clients
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Authentication(_) => "authentication",
            AppError::Authorization(_) => "authorization",
            AppError::NotFound { .. } => "not_found",
            AppError::Validation(_) => "validation",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::IneligibleBorrower(_) => "ineligible_borrower",
            AppError::BookUnavailable { .. } => "book_unavailable",
            AppError::AlreadyReturned { .. } => "already_returned",
            AppError::RenewalLimitReached { .. } => "renewal_limit_reached",
            AppError::LoanNotExtendable { .. } => "loan_not_extendable",
            AppError::Conflict(_) => "conflict",
            AppError::Database(_) => "database",
            AppError::ExternalService(_) => "external_service",
            AppError::Internal(_) => "internal",
        }
    }
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::Authorization(_) => StatusCode::FORBIDDEN,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::IneligibleBorrower(_)
            | AppError::BookUnavailable { .. }
            | AppError::AlreadyReturned { .. }
            | AppError::RenewalLimitReached { .. }
            | AppError::LoanNotExtendable { .. }
            | AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::ExternalService(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let message = match &self {
            // Driver details stay out of client responses
            AppError::Database(_) => "Database error".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        };

        let body = Json(ErrorResponse {
            error: self.kind().to_string(),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_map_to_conflict() {
        let errors = [
            AppError::IneligibleBorrower(IneligibilityReason::HasOverdueLoans),
            AppError::BookUnavailable { book_id: 1 },
            AppError::RenewalLimitReached { max: 3 },
            AppError::LoanNotExtendable {
                status: LoanStatus::Returned,
            },
        ];
        for err in errors {
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::CONFLICT);
        }
    }

    #[test]
    fn not_found_maps_to_404() {
        let response = AppError::NotFound {
            entity: "Loan",
            id: "42".to_string(),
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn invalid_input_maps_to_400() {
        let response = AppError::InvalidInput("loan days must be 1-60".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
