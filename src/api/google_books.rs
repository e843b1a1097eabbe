//! Google Books integration endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{error::AppResult, models::book::BookResponse, models::remote_book::Volume};

use super::AuthenticatedUser;

/// Volume search query
#[derive(Deserialize, IntoParams)]
pub struct VolumeSearchQuery {
    /// Search term (e.g. 'rust programming', 'isbn:9780134685991')
    pub query: String,
    /// Maximum number of results (1-40, default 10)
    pub max_results: Option<u8>,
}

/// Import query
#[derive(Deserialize, IntoParams)]
pub struct ImportQuery {
    /// Number of copies to add (default 1)
    pub total_copies: Option<i32>,
}

/// Search for volumes in Google Books
#[utoipa::path(
    get,
    path = "/google-books/search",
    tag = "google-books",
    security(("bearer_auth" = [])),
    params(VolumeSearchQuery),
    responses(
        (status = 200, description = "Search completed", body = Vec<Volume>),
        (status = 503, description = "Google Books unavailable")
    )
)]
pub async fn search_volumes(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Query(query): Query<VolumeSearchQuery>,
) -> AppResult<Json<Vec<Volume>>> {
    let volumes = state
        .services
        .google_books
        .search(&query.query, query.max_results)
        .await?;
    Ok(Json(volumes))
}

/// Get volume details from Google Books
#[utoipa::path(
    get,
    path = "/google-books/{volume_id}",
    tag = "google-books",
    security(("bearer_auth" = [])),
    params(("volume_id" = String, Path, description = "Google Books volume ID")),
    responses(
        (status = 200, description = "Volume found", body = Volume),
        (status = 404, description = "Volume not found"),
        (status = 503, description = "Google Books unavailable")
    )
)]
pub async fn get_volume(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(volume_id): Path<String>,
) -> AppResult<Json<Volume>> {
    let volume = state.services.google_books.get_volume(&volume_id).await?;
    Ok(Json(volume))
}

/// Import a volume into the local catalog. An existing ISBN gains copies
/// instead of creating a duplicate entry.
#[utoipa::path(
    post,
    path = "/google-books/{volume_id}/import",
    tag = "google-books",
    security(("bearer_auth" = [])),
    params(
        ("volume_id" = String, Path, description = "Google Books volume ID"),
        ImportQuery
    ),
    responses(
        (status = 201, description = "Book imported", body = BookResponse),
        (status = 400, description = "Invalid copy count"),
        (status = 404, description = "Volume not found"),
        (status = 503, description = "Google Books unavailable")
    )
)]
pub async fn import_volume(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(volume_id): Path<String>,
    Query(query): Query<ImportQuery>,
) -> AppResult<(StatusCode, Json<BookResponse>)> {
    claims.require_librarian()?;

    let book = state
        .services
        .google_books
        .import_volume(&volume_id, query.total_copies.unwrap_or(1))
        .await?;
    Ok((StatusCode::CREATED, Json(book.into())))
}
