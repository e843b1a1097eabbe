//! User management service

use crate::{
    error::{AppError, AppResult},
    models::{
        loan::LoanStatus,
        user::{CreateUser, Role, UpdateUser, User},
    },
    repository::Repository,
    services::auth::AuthService,
};

#[derive(Clone)]
pub struct UsersService {
    repository: Repository,
}

impl UsersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Register a new user with a hashed password
    pub async fn register(&self, request: CreateUser) -> AppResult<User> {
        if self.repository.users.email_exists(&request.email).await? {
            return Err(AppError::Conflict("E-mail already registered".to_string()));
        }

        let password_hash = AuthService::hash_password(&request.password)?;
        let role = request.role.unwrap_or(Role::Reader);

        let user = self
            .repository
            .users
            .create(&request.name, &request.email, &password_hash, role)
            .await?;

        tracing::info!(user_id = user.id, role = %user.role, "User registered");
        Ok(user)
    }

    pub async fn get(&self, id: i64) -> AppResult<User> {
        self.repository.users.get_by_id(id).await
    }

    pub async fn get_by_email(&self, email: &str) -> AppResult<User> {
        self.repository
            .users
            .get_by_email(email)
            .await?
            .ok_or_else(|| AppError::NotFound {
                entity: "User",
                id: email.to_string(),
            })
    }

    pub async fn list(&self) -> AppResult<Vec<User>> {
        self.repository.users.list().await
    }

    pub async fn exists_by_email(&self, email: &str) -> AppResult<bool> {
        self.repository.users.email_exists(email).await
    }

    /// Update name and/or password. Email is immutable.
    pub async fn update(&self, id: i64, request: UpdateUser) -> AppResult<User> {
        let password_hash = match request.password.as_deref() {
            Some(password) => Some(AuthService::hash_password(password)?),
            None => None,
        };

        self.repository
            .users
            .update(id, request.name.as_deref(), password_hash.as_deref())
            .await
    }

    pub async fn change_role(&self, id: i64, role: Role) -> AppResult<User> {
        let user = self.repository.users.update_role(id, role).await?;
        tracing::info!(user_id = id, role = %role, "User role changed");
        Ok(user)
    }

    /// Delete a user. Rejected while the user has active loans.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        // Verify user exists
        self.repository.users.get_by_id(id).await?;

        let active = self
            .repository
            .loans
            .count_by_user_and_status(id, LoanStatus::Active)
            .await?;
        if active > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete a user with {} active loans",
                active
            )));
        }

        self.repository.users.delete(id).await?;
        tracing::info!(user_id = id, "User deleted");
        Ok(())
    }
}
