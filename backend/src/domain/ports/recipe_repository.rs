//! Port for recipe persistence.
//!
//! Writes are atomic: reference ownership is checked inside the same
//! transaction that stores the recipe, so a concurrent delete of a tag can
//! never leave a recipe pointing at another owner's item.

use async_trait::async_trait;

use crate::domain::{
    Recipe, RecipeChanges, RecipeDraft, RecipeFilter, RecipeId, StoredImage, TaxonomyKind, UserId,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by recipe repository adapters.
    pub enum RecipeRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "recipe repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "recipe repository query failed: {message}",
        /// Some referenced ids are not items of `kind` owned by the recipe owner.
        UnownedReference { kind: TaxonomyKind, ids: Vec<i64> } =>
            "{kind} references not owned by the recipe owner: {ids:?}",
    }
}

/// Outcome of pointing a recipe at a new image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageReplacement {
    pub recipe: Recipe,
    pub previous: Option<StoredImage>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Owner's recipes matching `filter`, in ascending id order.
    async fn list(
        &self,
        owner: &UserId,
        filter: &RecipeFilter,
    ) -> Result<Vec<Recipe>, RecipeRepositoryError>;

    async fn find(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError>;

    async fn insert(
        &self,
        owner: &UserId,
        draft: &RecipeDraft,
    ) -> Result<Recipe, RecipeRepositoryError>;

    /// Apply `changes`. Returns `None` when the recipe is not the owner's.
    async fn update(
        &self,
        owner: &UserId,
        id: RecipeId,
        changes: &RecipeChanges,
    ) -> Result<Option<Recipe>, RecipeRepositoryError>;

    /// Point the recipe at `image`, reporting the image it replaced.
    async fn replace_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        image: &StoredImage,
    ) -> Result<Option<ImageReplacement>, RecipeRepositoryError>;

    /// Remove the recipe and its links, returning what was removed.
    async fn delete(
        &self,
        owner: &UserId,
        id: RecipeId,
    ) -> Result<Option<Recipe>, RecipeRepositoryError>;
}
