//! Port for one-way password hashing.

use async_trait::async_trait;

use crate::domain::{Password, PasswordDigest};

use super::define_port_error;

define_port_error! {
    /// Failures while deriving a password digest.
    pub enum CredentialHasherError {
        Hash { message: String } => "password hashing failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Derive a salted digest for storage.
    async fn hash(&self, password: &Password) -> Result<PasswordDigest, CredentialHasherError>;

    /// Check a candidate password. Malformed digests never verify.
    async fn verify(&self, password: &str, digest: &PasswordDigest) -> bool;
}
