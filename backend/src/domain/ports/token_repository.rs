//! Port for persisting issued API token digests.

use async_trait::async_trait;

use crate::domain::{TokenDigest, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by token repository adapters.
    pub enum TokenRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "token repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "token repository query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TokenRepository: Send + Sync {
    /// Record a token digest for `user_id`.
    async fn store(&self, digest: &TokenDigest, user_id: &UserId)
    -> Result<(), TokenRepositoryError>;

    /// Resolve a digest to the account that owns it.
    async fn find_user_id(
        &self,
        digest: &TokenDigest,
    ) -> Result<Option<UserId>, TokenRepositoryError>;
}
