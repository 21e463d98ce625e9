//! Owner-scoped classification items: tags and ingredients.
//!
//! Both kinds share one shape and one set of operations. The kind travels
//! with every item so an identifier of one kind is never accepted where the
//! other is expected.

use std::fmt;
use std::str::FromStr;

use super::UserId;

/// Maximum length, in characters, of a tag or ingredient name.
pub const TAXONOMY_NAME_MAX: usize = 255;

/// Which taxonomy an item belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TaxonomyKind {
    Tag,
    Ingredient,
}

impl TaxonomyKind {
    /// Storage discriminator.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Tag => "tag",
            Self::Ingredient => "ingredient",
        }
    }

    /// Request field that lists identifiers of this kind on a recipe.
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Tag => "tags",
            Self::Ingredient => "ingredients",
        }
    }
}

impl fmt::Display for TaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a storage discriminator is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTaxonomyKind(pub String);

impl fmt::Display for UnknownTaxonomyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown taxonomy kind: {}", self.0)
    }
}

impl std::error::Error for UnknownTaxonomyKind {}

impl FromStr for TaxonomyKind {
    type Err = UnknownTaxonomyKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tag" => Ok(Self::Tag),
            "ingredient" => Ok(Self::Ingredient),
            other => Err(UnknownTaxonomyKind(other.to_owned())),
        }
    }
}

/// Storage-assigned identifier of a tag or ingredient.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaxonomyItemId(i64);

impl TaxonomyItemId {
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TaxonomyItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation errors for taxonomy names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaxonomyValidationError {
    EmptyName,
    NameTooLong { max: usize },
}

impl fmt::Display for TaxonomyValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
        }
    }
}

impl std::error::Error for TaxonomyValidationError {}

/// Trimmed, non-empty item name.
///
/// # Examples
/// ```
/// use backend::domain::TaxonomyName;
///
/// assert_eq!(TaxonomyName::new("  Vegan ").unwrap().as_ref(), "Vegan");
/// assert!(TaxonomyName::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct TaxonomyName(String);

impl TaxonomyName {
    pub fn new(raw: &str) -> Result<Self, TaxonomyValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(TaxonomyValidationError::EmptyName);
        }
        if trimmed.chars().count() > TAXONOMY_NAME_MAX {
            return Err(TaxonomyValidationError::NameTooLong {
                max: TAXONOMY_NAME_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for TaxonomyName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// A tag or ingredient owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonomyItem {
    id: TaxonomyItemId,
    owner: UserId,
    kind: TaxonomyKind,
    name: TaxonomyName,
}

impl TaxonomyItem {
    #[must_use]
    pub fn new(id: TaxonomyItemId, owner: UserId, kind: TaxonomyKind, name: TaxonomyName) -> Self {
        Self {
            id,
            owner,
            kind,
            name,
        }
    }

    #[must_use]
    pub fn id(&self) -> TaxonomyItemId {
        self.id
    }

    #[must_use]
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    #[must_use]
    pub fn kind(&self) -> TaxonomyKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &TaxonomyName {
        &self.name
    }

    #[must_use]
    pub fn with_name(mut self, name: TaxonomyName) -> Self {
        self.name = name;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", TaxonomyValidationError::EmptyName)]
    #[case(" \t ", TaxonomyValidationError::EmptyName)]
    fn blank_names_are_rejected(#[case] raw: &str, #[case] expected: TaxonomyValidationError) {
        assert_eq!(TaxonomyName::new(raw), Err(expected));
    }

    #[rstest]
    fn overlong_names_are_rejected() {
        let raw = "x".repeat(TAXONOMY_NAME_MAX + 1);
        assert_eq!(
            TaxonomyName::new(&raw),
            Err(TaxonomyValidationError::NameTooLong {
                max: TAXONOMY_NAME_MAX
            })
        );
    }

    #[rstest]
    fn names_at_the_limit_are_accepted() {
        let raw = "é".repeat(TAXONOMY_NAME_MAX);
        assert!(TaxonomyName::new(&raw).is_ok());
    }

    #[rstest]
    #[case(TaxonomyKind::Tag, "tag", "tags")]
    #[case(TaxonomyKind::Ingredient, "ingredient", "ingredients")]
    fn kind_discriminators_round_trip(
        #[case] kind: TaxonomyKind,
        #[case] stored: &str,
        #[case] field: &str,
    ) {
        assert_eq!(kind.as_str(), stored);
        assert_eq!(kind.field_name(), field);
        assert_eq!(stored.parse::<TaxonomyKind>(), Ok(kind));
    }

    #[rstest]
    fn unknown_kind_is_an_error() {
        assert_eq!(
            "spice".parse::<TaxonomyKind>(),
            Err(UnknownTaxonomyKind("spice".to_owned()))
        );
    }
}
