//! User management endpoints

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    error::{AppError, AppResult},
    models::user::{CreateUser, Role, UpdateUser, User},
};

use super::AuthenticatedUser;

/// Change role request
#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ChangeRoleQuery {
    /// New role (READER or LIBRARIAN)
    pub role: Role,
}

/// Email check query
#[derive(Deserialize, IntoParams)]
pub struct EmailQuery {
    pub email: String,
}

/// List all users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "All users", body = Vec<User>),
        (status = 403, description = "Librarian privileges required")
    )
)]
pub async fn list_users(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
) -> AppResult<Json<Vec<User>>> {
    claims.require_librarian()?;

    let users = state.services.users.list().await?;
    Ok(Json(users))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(_claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<Json<User>> {
    let user = state.services.users.get(id).await?;
    Ok(Json(user))
}

/// Register a new user account
#[utoipa::path(
    post,
    path = "/users/register",
    tag = "users",
    request_body = CreateUser,
    responses(
        (status = 201, description = "User registered", body = User),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register_user(
    State(state): State<crate::AppState>,
    Json(request): Json<CreateUser>,
) -> AppResult<(StatusCode, Json<User>)> {
    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.services.users.register(request).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// Update a user. Email cannot be changed.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUser,
    responses(
        (status = 200, description = "User updated", body = User),
        (status = 400, description = "Invalid input"),
        (status = 404, description = "User not found")
    )
)]
pub async fn update_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Json(request): Json<UpdateUser>,
) -> AppResult<Json<User>> {
    // Users may edit themselves; librarians may edit anyone
    if claims.user_id != id {
        claims.require_librarian()?;
    }

    request
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let user = state.services.users.update(id, request).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 404, description = "User not found"),
        (status = 409, description = "User has active loans")
    )
)]
pub async fn delete_user(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    claims.require_librarian()?;

    state.services.users.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get a user by email
#[utoipa::path(
    get,
    path = "/users/email/{email}",
    tag = "users",
    security(("bearer_auth" = [])),
    params(("email" = String, Path, description = "User email")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn get_user_by_email(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(email): Path<String>,
) -> AppResult<Json<User>> {
    claims.require_librarian()?;

    let user = state.services.users.get_by_email(&email).await?;
    Ok(Json(user))
}

/// Change a user's role
#[utoipa::path(
    patch,
    path = "/users/{id}/role",
    tag = "users",
    security(("bearer_auth" = [])),
    params(
        ("id" = i64, Path, description = "User ID"),
        ChangeRoleQuery
    ),
    responses(
        (status = 200, description = "Role changed", body = User),
        (status = 404, description = "User not found")
    )
)]
pub async fn change_user_role(
    State(state): State<crate::AppState>,
    AuthenticatedUser(claims): AuthenticatedUser,
    Path(id): Path<i64>,
    Query(query): Query<ChangeRoleQuery>,
) -> AppResult<Json<User>> {
    claims.require_librarian()?;

    let user = state.services.users.change_role(id, query.role).await?;
    Ok(Json(user))
}

/// Check whether an email is already registered
#[utoipa::path(
    get,
    path = "/users/check-email",
    tag = "users",
    params(EmailQuery),
    responses(
        (status = 200, description = "Check completed", body = bool)
    )
)]
pub async fn check_email_exists(
    State(state): State<crate::AppState>,
    Query(query): Query<EmailQuery>,
) -> AppResult<Json<bool>> {
    let exists = state.services.users.exists_by_email(&query.email).await?;
    Ok(Json(exists))
}
