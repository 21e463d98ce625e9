//! Driving port for account use-cases: registration, login, and profile
//! management.
//!
//! Inbound adapters call this port without knowing how accounts or tokens
//! are stored, which keeps handler tests independent of persistence.

use async_trait::async_trait;

use crate::domain::{
    AuthToken, Error, LoginCredentials, ProfileUpdate, Registration, User, UserId,
};

#[async_trait]
pub trait AccountService: Send + Sync {
    /// Register a regular, active account.
    async fn create_user(&self, registration: Registration) -> Result<User, Error>;

    /// Register an active staff account holding every permission.
    async fn create_superuser(&self, registration: Registration) -> Result<User, Error>;

    /// Check credentials. `Ok(None)` means they do not match an active
    /// account; callers must not reveal which part was wrong.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Option<User>, Error>;

    /// Issue a new bearer token for `user`.
    async fn issue_token(&self, user: &User) -> Result<AuthToken, Error>;

    /// Resolve a presented token to its active account.
    async fn resolve_token(&self, token: &AuthToken) -> Result<Option<User>, Error>;

    async fn profile(&self, user_id: &UserId) -> Result<User, Error>;

    /// Change name and/or password. A new password is re-hashed.
    async fn update_profile(&self, user_id: &UserId, update: ProfileUpdate)
    -> Result<User, Error>;
}
