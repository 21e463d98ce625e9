//! Account domain service.
//!
//! Implements the [`AccountService`] driving port on top of the user and
//! token repositories and a credential hasher.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::domain::ports::{
    AccountService, CredentialHasher, CredentialHasherError, TokenRepository,
    TokenRepositoryError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AuthToken, EmailAddress, Error, LoginCredentials, Password, PasswordDigest, ProfileUpdate,
    Registration, User, UserFlags, UserId,
};

/// Plaintext behind the digest that failed logins are verified against.
const DECOY_PASSWORD: &str = "no-account-has-this-password";

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { email } => {
            Error::invalid_request(format!("an account with email {email} already exists"))
                .with_details(json!({ "field": "email", "code": "duplicate_email" }))
        }
    }
}

fn map_token_error(error: TokenRepositoryError) -> Error {
    match error {
        TokenRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("token repository unavailable: {message}"))
        }
        TokenRepositoryError::Query { message } => {
            Error::internal(format!("token repository error: {message}"))
        }
    }
}

fn map_hasher_error(error: CredentialHasherError) -> Error {
    Error::internal(error.to_string())
}

/// Account service backed by driven ports.
#[derive(Clone)]
pub struct AccountServiceImpl<U, T, H> {
    users: Arc<U>,
    tokens: Arc<T>,
    hasher: Arc<H>,
    decoy: Arc<OnceCell<PasswordDigest>>,
}

impl<U, T, H> AccountServiceImpl<U, T, H> {
    pub fn new(users: Arc<U>, tokens: Arc<T>, hasher: Arc<H>) -> Self {
        Self {
            users,
            tokens,
            hasher,
            decoy: Arc::new(OnceCell::new()),
        }
    }
}

impl<U, T, H> AccountServiceImpl<U, T, H>
where
    U: UserRepository,
    T: TokenRepository,
    H: CredentialHasher,
{
    async fn register(&self, registration: Registration, flags: UserFlags) -> Result<User, Error> {
        let Registration {
            email,
            password,
            name,
        } = registration;
        let digest = self.hasher.hash(&password).await.map_err(map_hasher_error)?;
        let user = User::new(UserId::random(), email, name, digest, flags);
        self.users.insert(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), superuser = flags.is_superuser, "account created");
        Ok(user)
    }

    /// Digest of [`DECOY_PASSWORD`], derived by the configured hasher on
    /// first use.
    async fn decoy_digest(&self) -> Result<&PasswordDigest, Error> {
        self.decoy
            .get_or_try_init(|| async {
                let password = Password::new(DECOY_PASSWORD)
                    .map_err(|err| Error::internal(format!("invalid decoy password: {err}")))?;
                self.hasher.hash(&password).await.map_err(map_hasher_error)
            })
            .await
    }

    /// Reject a login after one full verification, so a missing account
    /// costs as much as a wrong password.
    async fn reject(&self, password: &str) -> Result<Option<User>, Error> {
        let decoy = self.decoy_digest().await?;
        self.hasher.verify(password, decoy).await;
        Ok(None)
    }

    async fn find_active(&self, user_id: &UserId) -> Result<Option<User>, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?;
        Ok(user.filter(User::is_active))
    }
}

#[async_trait]
impl<U, T, H> AccountService for AccountServiceImpl<U, T, H>
where
    U: UserRepository,
    T: TokenRepository,
    H: CredentialHasher,
{
    async fn create_user(&self, registration: Registration) -> Result<User, Error> {
        self.register(registration, UserFlags::regular()).await
    }

    async fn create_superuser(&self, registration: Registration) -> Result<User, Error> {
        self.register(registration, UserFlags::superuser()).await
    }

    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<Option<User>, Error> {
        let Ok(email) = EmailAddress::parse(credentials.email()) else {
            debug!("login rejected: malformed email");
            return self.reject(credentials.password()).await;
        };
        let Some(user) = self
            .users
            .find_by_email(&email)
            .await
            .map_err(map_user_error)?
        else {
            debug!("login rejected: unknown email");
            return self.reject(credentials.password()).await;
        };
        if !user.is_active() {
            debug!(user_id = %user.id(), "login rejected: inactive account");
            return self.reject(credentials.password()).await;
        }
        if self
            .hasher
            .verify(credentials.password(), user.password())
            .await
        {
            Ok(Some(user))
        } else {
            debug!(user_id = %user.id(), "login rejected: password mismatch");
            Ok(None)
        }
    }

    async fn issue_token(&self, user: &User) -> Result<AuthToken, Error> {
        let token = AuthToken::generate();
        self.tokens
            .store(&token.digest(), user.id())
            .await
            .map_err(map_token_error)?;
        info!(user_id = %user.id(), "token issued");
        Ok(token)
    }

    async fn resolve_token(&self, token: &AuthToken) -> Result<Option<User>, Error> {
        let Some(user_id) = self
            .tokens
            .find_user_id(&token.digest())
            .await
            .map_err(map_token_error)?
        else {
            return Ok(None);
        };
        self.find_active(&user_id).await
    }

    async fn profile(&self, user_id: &UserId) -> Result<User, Error> {
        self.find_active(user_id)
            .await?
            .ok_or_else(|| Error::not_found("user not found"))
    }

    async fn update_profile(
        &self,
        user_id: &UserId,
        update: ProfileUpdate,
    ) -> Result<User, Error> {
        let ProfileUpdate { name, password } = update;
        let mut user = self.profile(user_id).await?;
        if let Some(name) = name {
            user = user.with_name(name);
        }
        if let Some(password) = password {
            let digest = self.hasher.hash(&password).await.map_err(map_hasher_error)?;
            user = user.with_password(digest);
        }
        self.users.update(&user).await.map_err(map_user_error)?;
        Ok(user)
    }
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
