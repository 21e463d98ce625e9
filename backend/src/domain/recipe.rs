//! Recipe aggregate and its value objects.

use std::collections::BTreeSet;
use std::fmt;

use super::{StoredImage, TaxonomyItem, TaxonomyItemId, TaxonomyKind, UserId};

/// Maximum length, in characters, of a recipe title.
pub const RECIPE_TITLE_MAX: usize = 255;
/// Maximum length, in characters, of a recipe link.
pub const RECIPE_LINK_MAX: usize = 255;
/// Largest representable price: five digits with two of them decimals.
pub const PRICE_MAX_CENTS: i64 = 99_999;

/// Validation errors for recipe fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipeValidationError {
    EmptyTitle,
    TitleTooLong { max: usize },
    NegativeTime,
    TimeTooLarge,
    InvalidPrice,
    PriceTooPrecise,
    PriceOutOfRange,
    LinkTooLong { max: usize },
}

impl fmt::Display for RecipeValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
            Self::TitleTooLong { max } => write!(f, "title must be at most {max} characters"),
            Self::NegativeTime => write!(f, "time_minutes must not be negative"),
            Self::TimeTooLarge => write!(f, "time_minutes is too large"),
            Self::InvalidPrice => write!(f, "price must be a decimal number"),
            Self::PriceTooPrecise => write!(f, "price must have at most 2 decimal places"),
            Self::PriceOutOfRange => write!(f, "price must be between 0.00 and 999.99"),
            Self::LinkTooLong { max } => write!(f, "link must be at most {max} characters"),
        }
    }
}

impl std::error::Error for RecipeValidationError {}

/// Storage-assigned recipe identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecipeId(i64);

impl RecipeId {
    #[must_use]
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for RecipeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Trimmed, non-empty recipe title.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RecipeTitle(String);

impl RecipeTitle {
    pub fn new(raw: &str) -> Result<Self, RecipeValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RecipeValidationError::EmptyTitle);
        }
        if trimmed.chars().count() > RECIPE_TITLE_MAX {
            return Err(RecipeValidationError::TitleTooLong {
                max: RECIPE_TITLE_MAX,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for RecipeTitle {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Preparation time in whole minutes; never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct TimeMinutes(i32);

impl TimeMinutes {
    pub fn new(minutes: i64) -> Result<Self, RecipeValidationError> {
        if minutes < 0 {
            return Err(RecipeValidationError::NegativeTime);
        }
        i32::try_from(minutes)
            .map(Self)
            .map_err(|_| RecipeValidationError::TimeTooLarge)
    }

    #[must_use]
    pub fn value(self) -> i32 {
        self.0
    }
}

/// Fixed-point price with two decimal places, held in cents.
///
/// Accepts decimal text with at most three integer digits and two decimals.
/// Exponent notation is rejected. Displays with exactly two decimals.
///
/// # Examples
/// ```
/// use backend::domain::Price;
///
/// assert_eq!(Price::parse("5").unwrap().to_string(), "5.00");
/// assert_eq!(Price::parse("10.5").unwrap().to_string(), "10.50");
/// assert!(Price::parse("1000").is_err());
/// assert!(Price::parse("1.005").is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Price(i64);

impl Price {
    /// Wrap a cent amount, enforcing the representable range.
    pub fn from_cents(cents: i64) -> Result<Self, RecipeValidationError> {
        if (0..=PRICE_MAX_CENTS).contains(&cents) {
            Ok(Self(cents))
        } else {
            Err(RecipeValidationError::PriceOutOfRange)
        }
    }

    /// Parse decimal text such as `"5"`, `"5.0"`, or `"12.99"`.
    pub fn parse(raw: &str) -> Result<Self, RecipeValidationError> {
        let text = raw.trim();
        let (negative, unsigned) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));

        let all_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction)
        {
            return Err(RecipeValidationError::InvalidPrice);
        }
        if fraction.len() > 2 {
            return Err(RecipeValidationError::PriceTooPrecise);
        }

        let significant = whole.trim_start_matches('0');
        if significant.len() > 3 {
            return Err(RecipeValidationError::PriceOutOfRange);
        }
        let units = if significant.is_empty() {
            0
        } else {
            significant
                .parse::<i64>()
                .map_err(|_| RecipeValidationError::InvalidPrice)?
        };
        let hundredths = match fraction.len() {
            0 => 0,
            1 => parse_digits(fraction)? * 10,
            _ => parse_digits(fraction)?,
        };

        let cents = units * 100 + hundredths;
        if negative && cents != 0 {
            return Err(RecipeValidationError::PriceOutOfRange);
        }
        Self::from_cents(cents)
    }

    #[must_use]
    pub fn cents(self) -> i64 {
        self.0
    }
}

fn parse_digits(digits: &str) -> Result<i64, RecipeValidationError> {
    digits
        .parse::<i64>()
        .map_err(|_| RecipeValidationError::InvalidPrice)
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Optional external link; empty input means no link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeLink(String);

impl RecipeLink {
    /// Returns `Ok(None)` for blank input.
    pub fn parse(raw: &str) -> Result<Option<Self>, RecipeValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(None);
        }
        if trimmed.chars().count() > RECIPE_LINK_MAX {
            return Err(RecipeValidationError::LinkTooLong {
                max: RECIPE_LINK_MAX,
            });
        }
        Ok(Some(Self(trimmed.to_owned())))
    }
}

impl AsRef<str> for RecipeLink {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Complete set of writable recipe fields.
///
/// Used for creation and full replacement. Absent reference lists are empty
/// sets, so a full replacement without `tags` clears them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    pub title: RecipeTitle,
    pub time_minutes: TimeMinutes,
    pub price: Price,
    pub link: Option<RecipeLink>,
    pub tags: BTreeSet<TaxonomyItemId>,
    pub ingredients: BTreeSet<TaxonomyItemId>,
}

impl RecipeDraft {
    /// Referenced identifiers of the given kind.
    #[must_use]
    pub fn ids(&self, kind: TaxonomyKind) -> &BTreeSet<TaxonomyItemId> {
        match kind {
            TaxonomyKind::Tag => &self.tags,
            TaxonomyKind::Ingredient => &self.ingredients,
        }
    }

    /// Express the draft as a change set that overwrites every field.
    #[must_use]
    pub fn into_changes(self) -> RecipeChanges {
        RecipeChanges {
            title: Some(self.title),
            time_minutes: Some(self.time_minutes),
            price: Some(self.price),
            link: Some(self.link),
            tags: Some(self.tags),
            ingredients: Some(self.ingredients),
        }
    }
}

/// Partial update. `None` leaves a field unchanged; `Some` replaces it.
///
/// Reference sets are replaced wholesale when present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeChanges {
    pub title: Option<RecipeTitle>,
    pub time_minutes: Option<TimeMinutes>,
    pub price: Option<Price>,
    pub link: Option<Option<RecipeLink>>,
    pub tags: Option<BTreeSet<TaxonomyItemId>>,
    pub ingredients: Option<BTreeSet<TaxonomyItemId>>,
}

impl RecipeChanges {
    #[must_use]
    pub fn ids(&self, kind: TaxonomyKind) -> Option<&BTreeSet<TaxonomyItemId>> {
        match kind {
            TaxonomyKind::Tag => self.tags.as_ref(),
            TaxonomyKind::Ingredient => self.ingredients.as_ref(),
        }
    }

    /// True when any column other than the reference sets changes.
    #[must_use]
    pub fn has_scalar_changes(&self) -> bool {
        self.title.is_some()
            || self.time_minutes.is_some()
            || self.price.is_some()
            || self.link.is_some()
    }
}

/// A recipe owned by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    id: RecipeId,
    owner: UserId,
    title: RecipeTitle,
    time_minutes: TimeMinutes,
    price: Price,
    link: Option<RecipeLink>,
    image: Option<StoredImage>,
    tags: BTreeSet<TaxonomyItemId>,
    ingredients: BTreeSet<TaxonomyItemId>,
}

impl Recipe {
    /// Materialise a stored recipe from its draft fields. No image is set.
    #[must_use]
    pub fn new(id: RecipeId, owner: UserId, draft: RecipeDraft) -> Self {
        let RecipeDraft {
            title,
            time_minutes,
            price,
            link,
            tags,
            ingredients,
        } = draft;
        Self {
            id,
            owner,
            title,
            time_minutes,
            price,
            link,
            image: None,
            tags,
            ingredients,
        }
    }

    #[must_use]
    pub fn id(&self) -> RecipeId {
        self.id
    }

    #[must_use]
    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    #[must_use]
    pub fn title(&self) -> &RecipeTitle {
        &self.title
    }

    #[must_use]
    pub fn time_minutes(&self) -> TimeMinutes {
        self.time_minutes
    }

    #[must_use]
    pub fn price(&self) -> Price {
        self.price
    }

    #[must_use]
    pub fn link(&self) -> Option<&RecipeLink> {
        self.link.as_ref()
    }

    #[must_use]
    pub fn image(&self) -> Option<&StoredImage> {
        self.image.as_ref()
    }

    #[must_use]
    pub fn tags(&self) -> &BTreeSet<TaxonomyItemId> {
        &self.tags
    }

    #[must_use]
    pub fn ingredients(&self) -> &BTreeSet<TaxonomyItemId> {
        &self.ingredients
    }

    #[must_use]
    pub fn ids(&self, kind: TaxonomyKind) -> &BTreeSet<TaxonomyItemId> {
        match kind {
            TaxonomyKind::Tag => &self.tags,
            TaxonomyKind::Ingredient => &self.ingredients,
        }
    }

    #[must_use]
    pub fn with_image(mut self, image: Option<StoredImage>) -> Self {
        self.image = image;
        self
    }

    /// Apply a change set, leaving unspecified fields as they are.
    #[must_use]
    pub fn apply(mut self, changes: &RecipeChanges) -> Self {
        if let Some(title) = &changes.title {
            self.title = title.clone();
        }
        if let Some(time_minutes) = changes.time_minutes {
            self.time_minutes = time_minutes;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(link) = &changes.link {
            self.link = link.clone();
        }
        if let Some(tags) = &changes.tags {
            self.tags = tags.clone();
        }
        if let Some(ingredients) = &changes.ingredients {
            self.ingredients = ingredients.clone();
        }
        self
    }

    /// Drop references to a deleted taxonomy item.
    pub fn unlink(&mut self, kind: TaxonomyKind, id: TaxonomyItemId) {
        match kind {
            TaxonomyKind::Tag => self.tags.remove(&id),
            TaxonomyKind::Ingredient => self.ingredients.remove(&id),
        };
    }
}

/// Listing filter. Empty sets impose no constraint.
///
/// A recipe matches when it carries any listed tag and any listed
/// ingredient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeFilter {
    pub tags: BTreeSet<TaxonomyItemId>,
    pub ingredients: BTreeSet<TaxonomyItemId>,
}

impl RecipeFilter {
    #[must_use]
    pub fn ids(&self, kind: TaxonomyKind) -> &BTreeSet<TaxonomyItemId> {
        match kind {
            TaxonomyKind::Tag => &self.tags,
            TaxonomyKind::Ingredient => &self.ingredients,
        }
    }
}

/// Recipe with its references resolved to full items, for the detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDetail {
    pub recipe: Recipe,
    pub tags: Vec<TaxonomyItem>,
    pub ingredients: Vec<TaxonomyItem>,
    pub image_url: Option<String>,
}

/// Result of attaching an image to a recipe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeImage {
    pub id: RecipeId,
    pub image_url: String,
}
