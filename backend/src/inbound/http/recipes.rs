//! Recipe API handlers.
//!
//! ```text
//! GET    /api/recipes?tags=1,2&ingredients=3
//! POST   /api/recipes           {"title":"Soup","time_minutes":20,"price":"4.50","tags":[1]}
//! GET    /api/recipes/{id}
//! PUT    /api/recipes/{id}
//! PATCH  /api/recipes/{id}      {"title":"Better soup"}
//! DELETE /api/recipes/{id}
//! POST   /api/recipes/{id}/image   multipart/form-data, field `image`
//! ```
//!
//! Write responses and list entries carry tag and ingredient ids; the detail
//! view nests the full items and the image URL.

use std::collections::BTreeSet;

use actix_multipart::{Multipart, MultipartError};
use actix_web::{HttpResponse, web};
use futures_util::TryStreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;
use utoipa::{IntoParams, ToSchema};

use crate::domain::ports::ImageUpload;
use crate::domain::{
    Error, Recipe, RecipeChanges, RecipeDetail, RecipeDraft, RecipeFilter, RecipeId, RecipeLink,
    RecipeTitle, TaxonomyItemId, TimeMinutes,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::method_not_allowed;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::taxonomy::TaxonomyItemResponse;
use crate::inbound::http::validation::{
    ErrorCode, FieldName, PriceInput, field_error, map_recipe_validation_error,
    missing_field_error, parse_id_list, parse_path_id,
};

/// Largest accepted image upload.
pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const IMAGE_FIELD: &str = "image";

/// Recipe body for create, replace and partial update.
///
/// Create and replace require `title`, `time_minutes` and `price`; absent
/// reference lists become empty. Partial updates change only what is
/// present, and an empty `link` clears the stored one.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct RecipeRequest {
    #[serde(default)]
    #[schema(example = "Tomato soup")]
    pub title: Option<String>,
    #[serde(default)]
    #[schema(example = 20)]
    pub time_minutes: Option<i64>,
    #[serde(default)]
    #[schema(value_type = Option<String>, example = "4.50")]
    pub price: Option<PriceInput>,
    #[serde(default)]
    #[schema(example = "https://example.com/soup")]
    pub link: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<i64>>,
    #[serde(default)]
    pub ingredients: Option<Vec<i64>>,
}

fn id_set(ids: Option<Vec<i64>>) -> Option<BTreeSet<TaxonomyItemId>> {
    ids.map(|ids| ids.into_iter().map(TaxonomyItemId::new).collect())
}

fn parse_title(raw: &str) -> Result<RecipeTitle, Error> {
    RecipeTitle::new(raw).map_err(map_recipe_validation_error)
}

fn parse_time(raw: i64) -> Result<TimeMinutes, Error> {
    TimeMinutes::new(raw).map_err(map_recipe_validation_error)
}

fn parse_link(raw: &str) -> Result<Option<RecipeLink>, Error> {
    RecipeLink::parse(raw).map_err(map_recipe_validation_error)
}

impl RecipeRequest {
    fn into_draft(self) -> Result<RecipeDraft, Error> {
        let title = self
            .title
            .as_deref()
            .ok_or_else(|| missing_field_error(FieldName::new("title")))
            .and_then(parse_title)?;
        let time_minutes = self
            .time_minutes
            .ok_or_else(|| missing_field_error(FieldName::new("time_minutes")))
            .and_then(parse_time)?;
        let price = self
            .price
            .as_ref()
            .ok_or_else(|| missing_field_error(FieldName::new("price")))?
            .parse()?;
        let link = match self.link.as_deref() {
            Some(raw) => parse_link(raw)?,
            None => None,
        };
        Ok(RecipeDraft {
            title,
            time_minutes,
            price,
            link,
            tags: id_set(self.tags).unwrap_or_default(),
            ingredients: id_set(self.ingredients).unwrap_or_default(),
        })
    }

    fn into_changes(self) -> Result<RecipeChanges, Error> {
        Ok(RecipeChanges {
            title: self.title.as_deref().map(parse_title).transpose()?,
            time_minutes: self.time_minutes.map(parse_time).transpose()?,
            price: self.price.as_ref().map(PriceInput::parse).transpose()?,
            link: self.link.as_deref().map(parse_link).transpose()?,
            tags: id_set(self.tags),
            ingredients: id_set(self.ingredients),
        })
    }
}

/// Recipe summary returned by list and write operations.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct RecipeResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Tomato soup")]
    pub title: String,
    #[schema(example = 20)]
    pub time_minutes: i32,
    /// Fixed-point decimal string.
    #[schema(example = "4.50")]
    pub price: String,
    pub link: Option<String>,
    pub tags: Vec<i64>,
    pub ingredients: Vec<i64>,
}

impl From<&Recipe> for RecipeResponse {
    fn from(recipe: &Recipe) -> Self {
        Self {
            id: recipe.id().value(),
            title: recipe.title().as_ref().to_owned(),
            time_minutes: recipe.time_minutes().value(),
            price: recipe.price().to_string(),
            link: recipe.link().map(|link| link.as_ref().to_owned()),
            tags: recipe.tags().iter().map(|id| id.value()).collect(),
            ingredients: recipe.ingredients().iter().map(|id| id.value()).collect(),
        }
    }
}

/// Recipe with nested tags, ingredients and image URL.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct RecipeDetailResponse {
    pub id: i64,
    pub title: String,
    pub time_minutes: i32,
    #[schema(example = "4.50")]
    pub price: String,
    pub link: Option<String>,
    pub tags: Vec<TaxonomyItemResponse>,
    pub ingredients: Vec<TaxonomyItemResponse>,
    #[schema(example = "/media/uploads/recipe/5f0c.png")]
    pub image: Option<String>,
}

impl From<&RecipeDetail> for RecipeDetailResponse {
    fn from(detail: &RecipeDetail) -> Self {
        let summary = RecipeResponse::from(&detail.recipe);
        Self {
            id: summary.id,
            title: summary.title,
            time_minutes: summary.time_minutes,
            price: summary.price,
            link: summary.link,
            tags: detail.tags.iter().map(TaxonomyItemResponse::from).collect(),
            ingredients: detail
                .ingredients
                .iter()
                .map(TaxonomyItemResponse::from)
                .collect(),
            image: detail.image_url.clone(),
        }
    }
}

/// Result of an image upload.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct RecipeImageResponse {
    pub id: i64,
    #[schema(example = "/media/uploads/recipe/5f0c.png")]
    pub image: String,
}

/// Multipart form accepted by the image upload endpoint.
#[derive(Debug, ToSchema)]
pub struct RecipeImageForm {
    #[schema(value_type = String, format = Binary)]
    pub image: Vec<u8>,
}

/// Query string accepted by the recipe list.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RecipeListQuery {
    /// Comma-separated tag ids; recipes linked to any of them match.
    #[param(example = "1,2")]
    pub tags: Option<String>,
    /// Comma-separated ingredient ids; recipes linked to any of them match.
    #[param(example = "3")]
    pub ingredients: Option<String>,
}

impl RecipeListQuery {
    fn to_filter(&self) -> Result<RecipeFilter, Error> {
        Ok(RecipeFilter {
            tags: parse_id_list(self.tags.as_deref(), FieldName::new("tags"))?,
            ingredients: parse_id_list(
                self.ingredients.as_deref(),
                FieldName::new("ingredients"),
            )?,
        })
    }
}

fn recipe_id(raw: &str) -> Result<RecipeId, Error> {
    parse_path_id(raw, "recipe").map(RecipeId::new)
}

fn multipart_error(err: MultipartError) -> Error {
    debug!(error = %err, "multipart body rejected");
    field_error(
        FieldName::new(IMAGE_FIELD),
        ErrorCode::MalformedMultipart,
        format!("malformed multipart body: {err}"),
    )
}

/// Read the `image` part of a multipart body. Other parts are drained.
async fn read_image_upload(mut payload: Multipart) -> Result<ImageUpload, Error> {
    let mut upload = None;
    while let Some(mut field) = payload.try_next().await.map_err(multipart_error)? {
        let is_image = field.name() == Some(IMAGE_FIELD);
        let filename = field
            .content_disposition()
            .and_then(|disposition| disposition.get_filename())
            .map(str::to_owned);
        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(multipart_error)? {
            if !is_image {
                continue;
            }
            if bytes.len() + chunk.len() > MAX_IMAGE_BYTES {
                return Err(field_error(
                    FieldName::new(IMAGE_FIELD),
                    ErrorCode::TooLarge,
                    format!("image must be at most {MAX_IMAGE_BYTES} bytes"),
                ));
            }
            bytes.extend_from_slice(&chunk);
        }
        if is_image && upload.is_none() {
            upload = Some(ImageUpload { bytes, filename });
        }
    }
    upload.ok_or_else(|| missing_field_error(FieldName::new(IMAGE_FIELD)))
}

/// List the caller's recipes, title descending.
#[utoipa::path(
    get,
    path = "/api/recipes",
    params(RecipeListQuery),
    responses(
        (status = 200, description = "Recipes", body = [RecipeResponse]),
        (status = 400, description = "Malformed id list", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "listRecipes"
)]
pub async fn list_recipes(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    query: web::Query<RecipeListQuery>,
) -> ApiResult<web::Json<Vec<RecipeResponse>>> {
    let filter = query.to_filter()?;
    let recipes = state.recipes.list(user.id(), &filter).await?;
    Ok(web::Json(recipes.iter().map(RecipeResponse::from).collect()))
}

/// Create a recipe.
#[utoipa::path(
    post,
    path = "/api/recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeResponse),
        (status = 400, description = "Invalid field or reference", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "createRecipe"
)]
pub async fn create_recipe(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<HttpResponse> {
    let draft = payload.into_inner().into_draft()?;
    let recipe = state.recipes.create(user.id(), draft).await?;
    Ok(HttpResponse::Created().json(RecipeResponse::from(&recipe)))
}

/// Fetch a recipe with nested tags and ingredients.
#[utoipa::path(
    get,
    path = "/api/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe", body = RecipeDetailResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 404, description = "No such recipe for this user", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "getRecipe"
)]
pub async fn get_recipe(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<RecipeDetailResponse>> {
    let id = recipe_id(&path)?;
    let detail = state.recipes.get(user.id(), id).await?;
    Ok(web::Json(RecipeDetailResponse::from(&detail)))
}

/// Replace every writable field of a recipe.
#[utoipa::path(
    put,
    path = "/api/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Replaced recipe", body = RecipeResponse),
        (status = 400, description = "Invalid field or reference", body = ErrorSchema),
        (status = 404, description = "No such recipe for this user", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "replaceRecipe"
)]
pub async fn replace_recipe(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let id = recipe_id(&path)?;
    let draft = payload.into_inner().into_draft()?;
    let recipe = state.recipes.update_full(user.id(), id, draft).await?;
    Ok(web::Json(RecipeResponse::from(&recipe)))
}

/// Change only the supplied fields of a recipe.
#[utoipa::path(
    patch,
    path = "/api/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Updated recipe", body = RecipeResponse),
        (status = 400, description = "Invalid field or reference", body = ErrorSchema),
        (status = 404, description = "No such recipe for this user", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "updateRecipe"
)]
pub async fn update_recipe(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<RecipeRequest>,
) -> ApiResult<web::Json<RecipeResponse>> {
    let id = recipe_id(&path)?;
    let changes = payload.into_inner().into_changes()?;
    let recipe = state.recipes.update_partial(user.id(), id, changes).await?;
    Ok(web::Json(RecipeResponse::from(&recipe)))
}

/// Delete a recipe and its stored image.
#[utoipa::path(
    delete,
    path = "/api/recipes/{id}",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 404, description = "No such recipe for this user", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "deleteRecipe"
)]
pub async fn delete_recipe(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = recipe_id(&path)?;
    state.recipes.delete(user.id(), id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Attach or replace a recipe's image.
#[utoipa::path(
    post,
    path = "/api/recipes/{id}/image",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body(content = RecipeImageForm, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Image stored", body = RecipeImageResponse),
        (status = 400, description = "Missing or undecodable image", body = ErrorSchema),
        (status = 404, description = "No such recipe for this user", body = ErrorSchema)
    ),
    tags = ["recipes"],
    operation_id = "uploadRecipeImage"
)]
pub async fn upload_image(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: Multipart,
) -> ApiResult<web::Json<RecipeImageResponse>> {
    let id = recipe_id(&path)?;
    let upload = read_image_upload(payload).await?;
    let image = state.recipes.attach_image(user.id(), id, upload).await?;
    Ok(web::Json(RecipeImageResponse {
        id: image.id.value(),
        image: image.image_url,
    }))
}

/// Register the recipe routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/recipes")
            .route(web::get().to(list_recipes))
            .route(web::post().to(create_recipe))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/recipes/{id}")
            .route(web::get().to(get_recipe))
            .route(web::put().to(replace_recipe))
            .route(web::patch().to(update_recipe))
            .route(web::delete().to(delete_recipe))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/recipes/{id}/image")
            .route(web::post().to(upload_image))
            .default_service(web::to(method_not_allowed)),
    );
}

#[cfg(test)]
#[path = "recipes_tests.rs"]
mod tests;
