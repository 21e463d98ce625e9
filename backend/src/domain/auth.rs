//! Authentication primitives: login credentials and API tokens.
//!
//! Inbound payload parsing stays outside the domain; handlers build these
//! values from raw strings before talking to a service.

use std::fmt;

use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Number of random bytes in a freshly issued token.
const TOKEN_BYTES: usize = 32;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials used by the account service.
///
/// ## Invariants
/// - `email` is trimmed and must not be empty after trimming. It is not
///   normalised here; lookups normalise it so malformed addresses simply
///   fail to authenticate.
/// - `password` is required to be non-empty but retains caller-provided
///   whitespace.
///
/// # Examples
/// ```
/// use backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" cook@example.com ", "secret").unwrap();
/// assert_eq!(creds.email(), "cook@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let trimmed = email.trim();
        if trimmed.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }

        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: trimmed.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Bearer secret handed to a client after a successful login.
///
/// Only its [`TokenDigest`] is ever persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthToken(Zeroizing<String>);

impl AuthToken {
    /// Issue a new random token: 32 bytes from the thread RNG, hex encoded.
    #[must_use]
    pub fn generate() -> Self {
        let mut bytes = Zeroizing::new([0_u8; TOKEN_BYTES]);
        rand::thread_rng().fill_bytes(&mut *bytes);
        Self(Zeroizing::new(hex::encode(&*bytes)))
    }

    /// Wrap a token presented by a client.
    #[must_use]
    pub fn from_presented(raw: &str) -> Self {
        Self(Zeroizing::new(raw.to_owned()))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    #[must_use]
    pub fn digest(&self) -> TokenDigest {
        TokenDigest::of(self.expose())
    }
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(<redacted>)")
    }
}

/// Lower-case hex SHA-256 digest of a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenDigest(String);

impl TokenDigest {
    #[must_use]
    pub fn of(raw_token: &str) -> Self {
        Self(hex::encode(Sha256::digest(raw_token.as_bytes())))
    }

    /// Rehydrate a digest loaded from storage.
    #[must_use]
    pub fn from_stored(hex_digest: impl Into<String>) -> Self {
        Self(hex_digest.into())
    }
}

impl AsRef<str> for TokenDigest {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
