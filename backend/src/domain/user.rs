//! User identity model.
//!
//! Accounts are keyed by a UUID and identified externally by a normalised
//! email address. Password digests are opaque strings produced by a
//! credential hasher adapter and never leave the domain in serialised form.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;
use zeroize::Zeroizing;

/// Maximum length, in characters, of an email address.
pub const EMAIL_MAX: usize = 255;
/// Maximum length, in characters, of a user's display name.
pub const USER_NAME_MAX: usize = 255;

/// Validation errors returned by the user value constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyEmail,
    InvalidEmail,
    EmailTooLong { max: usize },
    NameTooLong { max: usize },
    EmptyPassword,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must contain a single @ between a local part and a domain"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserId(Uuid);

impl UserId {
    /// Generate a new random [`UserId`].
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    #[must_use]
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Deliberately permissive: dotless domains such as `t@emamil` are accepted.
        Regex::new(r"^[^@\s]+@[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Normalised email address used as the login identifier.
///
/// ## Invariants
/// - Surrounding whitespace is trimmed and the address is lower-cased, so
///   equality is case-insensitive.
/// - Exactly one `@` separates a non-empty local part from a non-empty domain.
///
/// # Examples
/// ```
/// use backend::domain::EmailAddress;
///
/// let email = EmailAddress::parse("  Test@LONDONAPPDEV.com ").unwrap();
/// assert_eq!(email.as_ref(), "test@londonappdev.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and normalise a raw email address.
    pub fn parse(raw: &str) -> Result<Self, UserValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if trimmed.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(trimmed) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(trimmed.to_lowercase()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Free-form display name; may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserName(String);

impl UserName {
    /// Validate a display name. Surrounding whitespace is trimmed.
    pub fn new(name: &str) -> Result<Self, UserValidationError> {
        let trimmed = name.trim();
        if trimmed.chars().count() > USER_NAME_MAX {
            return Err(UserValidationError::NameTooLong { max: USER_NAME_MAX });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Opaque password digest in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordDigest(String);

impl PasswordDigest {
    #[must_use]
    pub fn new(encoded: impl Into<String>) -> Self {
        Self(encoded.into())
    }
}

impl AsRef<str> for PasswordDigest {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for PasswordDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordDigest(<redacted>)")
    }
}

/// Non-empty plaintext password held only long enough to hash or verify.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Reject empty passwords; whitespace is significant and kept.
    pub fn new(raw: &str) -> Result<Self, UserValidationError> {
        if raw.is_empty() {
            return Err(UserValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(raw.to_owned())))
    }

    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }

    /// Length in characters, used by transport-level password policies.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Account privileges and status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserFlags {
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl UserFlags {
    /// An active account without administrative rights.
    #[must_use]
    pub fn regular() -> Self {
        Self {
            is_active: true,
            is_staff: false,
            is_superuser: false,
        }
    }

    /// An active staff account with every permission.
    #[must_use]
    pub fn superuser() -> Self {
        Self {
            is_active: true,
            is_staff: true,
            is_superuser: true,
        }
    }
}

/// Registered account.
///
/// # Examples
/// ```
/// use backend::domain::{EmailAddress, PasswordDigest, User, UserFlags, UserId, UserName};
///
/// let user = User::new(
///     UserId::random(),
///     EmailAddress::parse("cook@example.com").unwrap(),
///     UserName::new("Cook").unwrap(),
///     PasswordDigest::new("$argon2id$stub"),
///     UserFlags::regular(),
/// );
/// assert_eq!(user.email().as_ref(), "cook@example.com");
/// assert!(user.is_active());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    id: UserId,
    email: EmailAddress,
    name: UserName,
    password: PasswordDigest,
    flags: UserFlags,
}

impl User {
    #[must_use]
    pub fn new(
        id: UserId,
        email: EmailAddress,
        name: UserName,
        password: PasswordDigest,
        flags: UserFlags,
    ) -> Self {
        Self {
            id,
            email,
            name,
            password,
            flags,
        }
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    #[must_use]
    pub fn name(&self) -> &UserName {
        &self.name
    }

    #[must_use]
    pub fn password(&self) -> &PasswordDigest {
        &self.password
    }

    #[must_use]
    pub fn flags(&self) -> UserFlags {
        self.flags
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.flags.is_active
    }

    #[must_use]
    pub fn with_name(mut self, name: UserName) -> Self {
        self.name = name;
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: PasswordDigest) -> Self {
        self.password = password;
        self
    }
}

/// Validated input for creating an account.
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: EmailAddress,
    pub password: Password,
    pub name: UserName,
}

impl Registration {
    /// Validate raw registration fields.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::{Registration, UserValidationError};
    ///
    /// let err = Registration::try_from_parts("", "secret", None).unwrap_err();
    /// assert_eq!(err, UserValidationError::EmptyEmail);
    /// ```
    pub fn try_from_parts(
        email: &str,
        password: &str,
        name: Option<&str>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self {
            email: EmailAddress::parse(email)?,
            password: Password::new(password)?,
            name: name.map(UserName::new).transpose()?.unwrap_or_default(),
        })
    }
}

/// Requested profile changes; `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub name: Option<UserName>,
    pub password: Option<Password>,
}
