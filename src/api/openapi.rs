//! OpenAPI documentation

use axum::Router;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api::{auth, books, google_books, health, loans, users};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "BookHub API",
        version = "1.0.0",
        description = "Library catalog and lending REST API",
        license(name = "AGPL-3.0", url = "https://www.gnu.org/licenses/agpl-3.0.html")
    ),
    servers(
        (url = "/api/v1", description = "API v1")
    ),
    paths(
        // Health
        health::health_check,
        health::readiness_check,
        // Auth
        auth::login,
        auth::me,
        // Users
        users::list_users,
        users::get_user,
        users::register_user,
        users::update_user,
        users::delete_user,
        users::get_user_by_email,
        users::change_user_role,
        users::check_email_exists,
        // Books
        books::list_books,
        books::get_book,
        books::create_book,
        books::update_book,
        books::delete_book,
        books::search_books,
        books::books_by_author,
        books::get_book_by_isbn,
        books::increment_copies,
        books::decrement_copies,
        books::is_book_available,
        // Loans
        loans::create_loan,
        loans::return_loan,
        loans::extend_loan,
        loans::active_loans_by_user,
        loans::overdue_loans,
        loans::is_loan_overdue,
        // Google Books
        google_books::search_volumes,
        google_books::get_volume,
        google_books::import_volume,
    ),
    components(
        schemas(
            // Auth
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UserInfo,
            // Users
            crate::models::user::User,
            crate::models::user::Role,
            crate::models::user::CreateUser,
            crate::models::user::UpdateUser,
            // Books
            crate::models::book::Book,
            crate::models::book::BookResponse,
            crate::models::book::CreateBook,
            crate::models::book::UpdateBook,
            // Loans
            loans::CreateLoanRequest,
            crate::models::loan::Loan,
            crate::models::loan::LoanStatus,
            crate::models::loan::LoanDetails,
            crate::models::loan::CreateLoan,
            // Google Books
            crate::models::remote_book::Volume,
            crate::models::remote_book::VolumeInfo,
            crate::models::remote_book::IndustryIdentifier,
            crate::models::remote_book::ImageLinks,
            // Health
            health::HealthResponse,
            // Errors
            crate::error::ErrorResponse,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "auth", description = "Authentication endpoints"),
        (name = "users", description = "User management"),
        (name = "books", description = "Catalog management"),
        (name = "loans", description = "Loan lifecycle"),
        (name = "google-books", description = "Google Books integration")
    )
)]
pub struct ApiDoc;

/// Create the OpenAPI documentation router
pub fn create_openapi_router() -> Router {
    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
