//! Argon2id password hashing.
//!
//! Digests are PHC strings (`$argon2id$v=19$...`) carrying their own salt
//! and parameters. Hashing is CPU-bound and runs on the blocking pool.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use async_trait::async_trait;
use rand::RngCore;
use tracing::debug;
use zeroize::Zeroizing;

use crate::domain::ports::{CredentialHasher, CredentialHasherError};
use crate::domain::{Password, PasswordDigest};

const SALT_LEN: usize = 16;

/// Argon2id hasher with the crate's default parameters.
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2CredentialHasher;

impl Argon2CredentialHasher {
    pub fn new() -> Self {
        Self
    }
}

fn hash_blocking(password: &[u8]) -> Result<String, CredentialHasherError> {
    let mut salt_bytes = [0_u8; SALT_LEN];
    rand::thread_rng().fill_bytes(&mut salt_bytes);
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|err| CredentialHasherError::hash(err.to_string()))?;

    Argon2::default()
        .hash_password(password, &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| CredentialHasherError::hash(err.to_string()))
}

fn verify_blocking(password: &[u8], encoded: &str) -> bool {
    match PasswordHash::new(encoded) {
        Ok(parsed) => Argon2::default().verify_password(password, &parsed).is_ok(),
        Err(err) => {
            debug!(error = %err, "stored password digest is malformed");
            false
        }
    }
}

#[async_trait]
impl CredentialHasher for Argon2CredentialHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordDigest, CredentialHasherError> {
        let secret = Zeroizing::new(password.expose().as_bytes().to_vec());
        tokio::task::spawn_blocking(move || hash_blocking(&secret))
            .await
            .map_err(|err| CredentialHasherError::hash(format!("hashing task failed: {err}")))?
            .map(PasswordDigest::new)
    }

    async fn verify(&self, password: &str, digest: &PasswordDigest) -> bool {
        let secret = Zeroizing::new(password.as_bytes().to_vec());
        let encoded = digest.as_ref().to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&secret, &encoded))
            .await
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn password(raw: &str) -> Password {
        Password::new(raw).expect("valid password")
    }

    #[rstest]
    #[tokio::test]
    async fn hashes_verify_against_the_original_password() {
        let hasher = Argon2CredentialHasher::new();
        let digest = hasher.hash(&password("pass123")).await.expect("hash");

        assert!(digest.as_ref().starts_with("$argon2id$"));
        assert!(hasher.verify("pass123", &digest).await);
        assert!(!hasher.verify("pass124", &digest).await);
    }

    #[rstest]
    #[tokio::test]
    async fn equal_passwords_get_distinct_salts() {
        let hasher = Argon2CredentialHasher::new();
        let first = hasher.hash(&password("same")).await.expect("hash");
        let second = hasher.hash(&password("same")).await.expect("hash");

        assert_ne!(first.as_ref(), second.as_ref());
    }

    #[rstest]
    #[tokio::test]
    async fn malformed_digests_never_verify() {
        let hasher = Argon2CredentialHasher::new();
        assert!(!hasher.verify("pass", &PasswordDigest::new("plain-text")).await);
    }
}
