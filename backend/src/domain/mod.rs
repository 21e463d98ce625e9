//! Domain primitives, aggregates, services, and ports.
//!
//! Purpose: define strongly typed entities shared by the API and the
//! persistence adapters, and the services that enforce ownership and
//! validation rules. Nothing here knows about HTTP or SQL.
//!
//! Public surface:
//! - `Error`/`ErrorCode`: transport-agnostic failure payload.
//! - `User`, `EmailAddress`, `Registration`: accounts.
//! - `TaxonomyItem`, `TaxonomyKind`: tags and ingredients.
//! - `Recipe`, `RecipeDraft`, `RecipeChanges`, `Price`: recipes.
//! - `UploadedImage`, `StoredImage`: recipe images.
//! - `*ServiceImpl`: implementations of the driving ports in [`ports`].

pub mod account_service;
pub mod auth;
pub mod error;
pub mod listing;
pub mod ports;
pub mod recipe;
pub mod recipe_image;
pub mod recipe_service;
pub mod taxonomy;
pub mod taxonomy_service;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountServiceImpl;
pub use self::auth::{AuthToken, LoginCredentials, LoginValidationError, TokenDigest};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::recipe::{
    Price, Recipe, RecipeChanges, RecipeDetail, RecipeDraft, RecipeFilter, RecipeId, RecipeImage,
    RecipeLink, RecipeTitle, RecipeValidationError, TimeMinutes,
};
pub use self::recipe_image::{ImageValidationError, InvalidImagePath, StoredImage, UploadedImage};
pub use self::recipe_service::RecipeServiceImpl;
pub use self::taxonomy::{
    TaxonomyItem, TaxonomyItemId, TaxonomyKind, TaxonomyName, TaxonomyValidationError,
    UnknownTaxonomyKind,
};
pub use self::taxonomy_service::TaxonomyServiceImpl;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    EmailAddress, Password, PasswordDigest, ProfileUpdate, Registration, User, UserFlags, UserId,
    UserName, UserValidationError,
};
