//! Business logic services

pub mod auth;
pub mod catalog;
pub mod eligibility;
pub mod google_books;
pub mod loans;
pub mod users;

use std::sync::Arc;

use crate::{
    config::{AuthConfig, GoogleBooksConfig},
    error::AppResult,
    repository::Repository,
};

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub repository: Repository,
    pub auth: auth::AuthService,
    pub users: users::UsersService,
    pub catalog: catalog::CatalogService,
    pub loans: loans::LoansService,
    pub google_books: google_books::GoogleBooksService,
}

impl Services {
    /// Create all services with the given repository
    pub fn new(
        repository: Repository,
        auth_config: AuthConfig,
        google_config: &GoogleBooksConfig,
    ) -> AppResult<Self> {
        let google_client = Arc::new(google_books::GoogleBooksClient::new(google_config)?);

        Ok(Self {
            auth: auth::AuthService::new(repository.clone(), auth_config),
            users: users::UsersService::new(repository.clone()),
            catalog: catalog::CatalogService::new(repository.clone()),
            loans: loans::LoansService::new(repository.clone()),
            google_books: google_books::GoogleBooksService::new(google_client, repository.clone()),
            repository,
        })
    }
}
