//! Recipe domain service.
//!
//! Coordinates the recipe and taxonomy repositories with the image store.
//! Image blobs are written before the row points at them and removed only
//! after the row stops pointing at them, so a stored path always resolves.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{error, info, warn};

use crate::domain::listing::sort_recipes_by_title_desc;
use crate::domain::ports::{
    ImageStore, ImageStoreError, ImageUpload, RecipeRepository, RecipeRepositoryError,
    RecipeService, TaxonomyRepository, TaxonomyRepositoryError,
};
use crate::domain::{
    Error, ImageValidationError, Recipe, RecipeChanges, RecipeDetail, RecipeDraft, RecipeFilter,
    RecipeId, RecipeImage, StoredImage, TaxonomyKind, UploadedImage, UserId,
};

fn map_recipe_error(error: RecipeRepositoryError) -> Error {
    match error {
        RecipeRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("recipe repository unavailable: {message}"))
        }
        RecipeRepositoryError::Query { message } => {
            Error::internal(format!("recipe repository error: {message}"))
        }
        RecipeRepositoryError::UnownedReference { kind, ids } => {
            let field = kind.field_name();
            Error::invalid_request(format!("unknown {kind} ids: {ids:?}"))
                .with_details(json!({ "field": field, "code": "unknown_reference", "ids": ids }))
        }
    }
}

fn map_taxonomy_error(error: TaxonomyRepositoryError) -> Error {
    match error {
        TaxonomyRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("taxonomy repository unavailable: {message}"))
        }
        TaxonomyRepositoryError::Query { message } => {
            Error::internal(format!("taxonomy repository error: {message}"))
        }
    }
}

fn map_store_error(error: ImageStoreError) -> Error {
    Error::internal(error.to_string())
}

fn map_image_error(error: &ImageValidationError) -> Error {
    Error::invalid_request(error.to_string())
        .with_details(json!({ "field": "image", "code": "invalid_image" }))
}

fn not_found(id: RecipeId) -> Error {
    Error::not_found(format!("recipe {id} not found"))
}

/// Recipe service backed by driven ports.
#[derive(Clone)]
pub struct RecipeServiceImpl<R, T, S> {
    recipes: Arc<R>,
    taxonomy: Arc<T>,
    images: Arc<S>,
}

impl<R, T, S> RecipeServiceImpl<R, T, S> {
    pub fn new(recipes: Arc<R>, taxonomy: Arc<T>, images: Arc<S>) -> Self {
        Self {
            recipes,
            taxonomy,
            images,
        }
    }
}

impl<R, T, S> RecipeServiceImpl<R, T, S>
where
    R: RecipeRepository,
    T: TaxonomyRepository,
    S: ImageStore,
{
    async fn apply(
        &self,
        owner: &UserId,
        id: RecipeId,
        changes: &RecipeChanges,
    ) -> Result<Recipe, Error> {
        self.recipes
            .update(owner, id, changes)
            .await
            .map_err(map_recipe_error)?
            .ok_or_else(|| not_found(id))
    }

    /// Best-effort removal of a blob nothing points at any more.
    async fn discard(&self, image: &StoredImage) {
        if let Err(err) = self.images.delete(image).await {
            warn!(path = image.as_ref(), error = %err, "failed to remove unreferenced image");
        }
    }
}

#[async_trait]
impl<R, T, S> RecipeService for RecipeServiceImpl<R, T, S>
where
    R: RecipeRepository,
    T: TaxonomyRepository,
    S: ImageStore,
{
    async fn list(&self, owner: &UserId, filter: &RecipeFilter) -> Result<Vec<Recipe>, Error> {
        let mut recipes = self
            .recipes
            .list(owner, filter)
            .await
            .map_err(map_recipe_error)?;
        sort_recipes_by_title_desc(&mut recipes);
        Ok(recipes)
    }

    async fn get(&self, owner: &UserId, id: RecipeId) -> Result<RecipeDetail, Error> {
        let recipe = self
            .recipes
            .find(owner, id)
            .await
            .map_err(map_recipe_error)?
            .ok_or_else(|| not_found(id))?;
        let tags = self
            .taxonomy
            .find_many(owner, TaxonomyKind::Tag, recipe.tags())
            .await
            .map_err(map_taxonomy_error)?;
        let ingredients = self
            .taxonomy
            .find_many(owner, TaxonomyKind::Ingredient, recipe.ingredients())
            .await
            .map_err(map_taxonomy_error)?;
        let image_url = recipe.image().map(|image| self.images.url_of(image));
        Ok(RecipeDetail {
            recipe,
            tags,
            ingredients,
            image_url,
        })
    }

    async fn create(&self, owner: &UserId, draft: RecipeDraft) -> Result<Recipe, Error> {
        let recipe = self
            .recipes
            .insert(owner, &draft)
            .await
            .map_err(map_recipe_error)?;
        info!(id = %recipe.id(), owner = %owner, "recipe created");
        Ok(recipe)
    }

    async fn update_full(
        &self,
        owner: &UserId,
        id: RecipeId,
        draft: RecipeDraft,
    ) -> Result<Recipe, Error> {
        self.apply(owner, id, &draft.into_changes()).await
    }

    async fn update_partial(
        &self,
        owner: &UserId,
        id: RecipeId,
        changes: RecipeChanges,
    ) -> Result<Recipe, Error> {
        self.apply(owner, id, &changes).await
    }

    async fn attach_image(
        &self,
        owner: &UserId,
        id: RecipeId,
        upload: ImageUpload,
    ) -> Result<RecipeImage, Error> {
        self.recipes
            .find(owner, id)
            .await
            .map_err(map_recipe_error)?
            .ok_or_else(|| not_found(id))?;

        let ImageUpload { bytes, filename } = upload;
        let image =
            UploadedImage::decode(bytes, filename.as_deref()).map_err(|err| map_image_error(&err))?;
        let stored = self
            .images
            .save(image.bytes(), &image.storage_path())
            .await
            .map_err(map_store_error)?;

        match self.recipes.replace_image(owner, id, &stored).await {
            Ok(Some(replacement)) => {
                if let Some(previous) = replacement.previous.filter(|prev| *prev != stored) {
                    self.discard(&previous).await;
                }
                info!(%id, path = stored.as_ref(), "recipe image stored");
                Ok(RecipeImage {
                    id,
                    image_url: self.images.url_of(&stored),
                })
            }
            Ok(None) => {
                // Deleted between the existence check and the update.
                self.discard(&stored).await;
                Err(not_found(id))
            }
            Err(err) => {
                self.discard(&stored).await;
                Err(map_recipe_error(err))
            }
        }
    }

    async fn delete(&self, owner: &UserId, id: RecipeId) -> Result<(), Error> {
        let removed = self
            .recipes
            .delete(owner, id)
            .await
            .map_err(map_recipe_error)?
            .ok_or_else(|| not_found(id))?;
        if let Some(image) = removed.image() {
            if let Err(err) = self.images.delete(image).await {
                error!(%id, path = image.as_ref(), error = %err, "failed to remove image of deleted recipe");
            }
        }
        info!(%id, owner = %owner, "recipe deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "recipe_service_tests.rs"]
mod tests;
