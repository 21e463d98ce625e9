//! Driving port for recipe management.

use async_trait::async_trait;

use crate::domain::{
    Error, Recipe, RecipeChanges, RecipeDetail, RecipeDraft, RecipeFilter, RecipeId, RecipeImage,
    UserId,
};

/// Raw upload as received from a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
}

#[async_trait]
pub trait RecipeService: Send + Sync {
    /// Owner's recipes matching `filter`, title descending.
    async fn list(&self, owner: &UserId, filter: &RecipeFilter) -> Result<Vec<Recipe>, Error>;

    /// Recipe with nested tags and ingredients.
    async fn get(&self, owner: &UserId, id: RecipeId) -> Result<RecipeDetail, Error>;

    async fn create(&self, owner: &UserId, draft: RecipeDraft) -> Result<Recipe, Error>;

    /// Replace every writable field.
    async fn update_full(
        &self,
        owner: &UserId,
        id: RecipeId,
        draft: RecipeDraft,
    ) -> Result<Recipe, Error>;

    /// Replace only the fields present in `changes`.
    async fn update_partial(
        &self,
        owner: &UserId,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<Recipe, Error>;

    /// Validate and store an image, replacing any previous one.
    async fn attach_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        upload: ImageUpload,
    ) -> Result<RecipeImage, Error>;

    /// Delete the recipe and its stored image.
    async fn delete(&self, owner: &UserId, id: RecipeId) -> Result<(), Error>;
}
