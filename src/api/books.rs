//! Catalog (book) endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::book::{BookResponse, CreateBook, UpdateBook},
};

use super::AuthenticatedUser;

/// Title search query
#[derive(Deserialize, IntoParams)]
pub struct SearchQuery {
    pub keyword: String,
}

/// Copy ledger adjustment query
#[derive(Deserialize, IntoParams)]
pub struct QuantityQuery {
    pub quantity: i32,
}

/// List all books
#[utoipa::path(
    get,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All books", body = Vec<BookResponse>)
    )
)]
pub async fn list_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
) -> AppResult<Json<Vec<BookResponse>>> {
    let books = state.services.catalog.list_books().await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// Get a book by ID
#[utoipa::path(
    get,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book found", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.catalog.get_book(id).await?;
    Ok(Json(book.into()))
}

/// Create a new book
#[utoipa::path(
    post,
    path = "/books",
    tag = "books",
    security(("bearer_auth" = [])),
    request_body = CreateBook,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "ISBN already registered")
    )
)]
pub async fn create_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Json(request): Json<CreateBook>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    claims.require_librarian()?;

    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.catalog.create_book(request).await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}

/// Update a book
#[utoipa::path(
    put,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    request_body = UpdateBook,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn update_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateBook>,
) -> AppResult<Json<BookResponse>> {
    claims.require_librarian()?;

    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let book = state.services.catalog.update_book(id, request).await?;
    Ok(Json(book.into()))
}

/// Delete a book
#[utoipa::path(
    delete,
    path = "/books/{id}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Book is referenced by loans")
    )
)]
pub async fn delete_book(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    claims.require_librarian()?;

    state.services.catalog.delete_book(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Search books by title keyword
#[utoipa::path(
    get,
    path = "/books/search",
    tag = "books",
    security(("bearer_auth" = [])),
    params(SearchQuery),
    responses(
        (status = 200, description = "Matching books", body = Vec<BookResponse>)
    )
)]
pub async fn search_books(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let books = state.services.catalog.search_books(&query.keyword).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// Books by author
#[utoipa::path(
    get,
    path = "/books/author/{author}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("author" = String, Path, description = "Author name")),
    responses(
        (status = 200, description = "Books by the author", body = Vec<BookResponse>)
    )
)]
pub async fn books_by_author(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(author): Path<String>,
) -> AppResult<Json<Vec<BookResponse>>> {
    let books = state.services.catalog.books_by_author(&author).await?;
    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

/// Get a book by ISBN
#[utoipa::path(
    get,
    path = "/books/isbn/{isbn}",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("isbn" = String, Path, description = "ISBN")),
    responses(
        (status = 200, description = "Book found", body = BookResponse),
        (status = 404, description = "Book not found")
    )
)]
pub async fn get_book_by_isbn(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(isbn): Path<String>,
) -> AppResult<Json<BookResponse>> {
    let book = state.services.catalog.get_book_by_isbn(&isbn).await?;
    Ok(Json(book.into()))
}

/// Add copies to a book's ledger
#[utoipa::path(
    patch,
    path = "/books/{id}/increment-copies",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID"),
        QuantityQuery
    ),
    responses(
        (status = 200, description = "Copies added", body = BookResponse),
        (status = 400, description = "Quantity must be positive"),
        (status = 404, description = "Book not found")
    )
)]
pub async fn increment_copies(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Query(query): Query<QuantityQuery>,
) -> AppResult<Json<BookResponse>> {
    claims.require_librarian()?;

    let book = state
        .services
        .catalog
        .increment_copies(id, query.quantity)
        .await?;
    Ok(Json(book.into()))
}

/// Remove copies from a book's ledger
#[utoipa::path(
    patch,
    path = "/books/{id}/decrement-copies",
    tag = "books",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "Book ID"),
        QuantityQuery
    ),
    responses(
        (status = 200, description = "Copies removed", body = BookResponse),
        (status = 400, description = "Quantity must be positive"),
        (status = 404, description = "Book not found"),
        (status = 409, description = "Not enough copies on the shelf")
    )
)]
pub async fn decrement_copies(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Query(query): Query<QuantityQuery>,
) -> AppResult<Json<BookResponse>> {
    claims.require_librarian()?;

    let book = state
        .services
        .catalog
        .decrement_copies(id, query.quantity)
        .await?;
    Ok(Json(book.into()))
}

/// Check whether a book has a copy available
#[utoipa::path(
    get,
    path = "/books/{id}/available",
    tag = "books",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Check completed", body = bool),
        (status = 404, description = "Book not found")
    )
)]
pub async fn is_book_available(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<bool>> {
    let available = state.services.catalog.is_available(id).await?;
    Ok(Json(available))
}
