//! Tag and ingredient API handlers.
//!
//! Both collections share one set of handlers parameterised by
//! [`TaxonomyKind`]; the per-kind functions below exist so each route
//! carries its own OpenAPI operation.

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{Error, TaxonomyItem, TaxonomyItemId, TaxonomyKind};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::method_not_allowed;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    FieldName, missing_field_error, parse_flag, parse_path_id,
};

/// Tag or ingredient as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, ToSchema)]
pub struct TaxonomyItemResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Vegan")]
    pub name: String,
}

impl From<&TaxonomyItem> for TaxonomyItemResponse {
    fn from(item: &TaxonomyItem) -> Self {
        Self {
            id: item.id().value(),
            name: item.name().as_ref().to_owned(),
        }
    }
}

/// Body for creating or renaming an item.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct TaxonomyItemRequest {
    #[serde(default)]
    #[schema(example = "Vegan")]
    pub name: Option<String>,
}

impl TaxonomyItemRequest {
    fn required_name(&self) -> Result<&str, Error> {
        self.name
            .as_deref()
            .ok_or_else(|| missing_field_error(FieldName::new("name")))
    }
}

/// Query string accepted by the list endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TaxonomyListQuery {
    /// `1` or `true` restricts the list to items used by at least one recipe.
    #[param(example = "1")]
    pub assigned_only: Option<String>,
}

fn item_id(kind: TaxonomyKind, raw: &str) -> Result<TaxonomyItemId, Error> {
    parse_path_id(raw, kind.as_str()).map(TaxonomyItemId::new)
}

async fn list_items(
    kind: TaxonomyKind,
    user: &AuthenticatedUser,
    state: &HttpState,
    query: &TaxonomyListQuery,
) -> ApiResult<web::Json<Vec<TaxonomyItemResponse>>> {
    let assigned_only = parse_flag(
        query.assigned_only.as_deref(),
        FieldName::new("assigned_only"),
    )?;
    let items = state.taxonomy.list(user.id(), kind, assigned_only).await?;
    Ok(web::Json(items.iter().map(TaxonomyItemResponse::from).collect()))
}

async fn create_item(
    kind: TaxonomyKind,
    user: &AuthenticatedUser,
    state: &HttpState,
    payload: &TaxonomyItemRequest,
) -> ApiResult<HttpResponse> {
    let name = payload.required_name()?;
    let item = state.taxonomy.create(user.id(), kind, name).await?;
    Ok(HttpResponse::Created().json(TaxonomyItemResponse::from(&item)))
}

async fn get_item(
    kind: TaxonomyKind,
    user: &AuthenticatedUser,
    state: &HttpState,
    raw_id: &str,
) -> ApiResult<web::Json<TaxonomyItemResponse>> {
    let id = item_id(kind, raw_id)?;
    let item = state.taxonomy.get(user.id(), kind, id).await?;
    Ok(web::Json(TaxonomyItemResponse::from(&item)))
}

/// PUT requires a name; PATCH without one leaves the item as it is.
async fn rename_item(
    kind: TaxonomyKind,
    user: &AuthenticatedUser,
    state: &HttpState,
    raw_id: &str,
    payload: &TaxonomyItemRequest,
    partial: bool,
) -> ApiResult<web::Json<TaxonomyItemResponse>> {
    let id = item_id(kind, raw_id)?;
    let item = match (payload.name.as_deref(), partial) {
        (None, true) => state.taxonomy.get(user.id(), kind, id).await?,
        (None, false) => return Err(missing_field_error(FieldName::new("name"))),
        (Some(name), _) => state.taxonomy.rename(user.id(), kind, id, name).await?,
    };
    Ok(web::Json(TaxonomyItemResponse::from(&item)))
}

async fn delete_item(
    kind: TaxonomyKind,
    user: &AuthenticatedUser,
    state: &HttpState,
    raw_id: &str,
) -> ApiResult<HttpResponse> {
    let id = item_id(kind, raw_id)?;
    state.taxonomy.delete(user.id(), kind, id).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// List the caller's tags, name descending.
#[utoipa::path(
    get,
    path = "/api/tags",
    params(TaxonomyListQuery),
    responses(
        (status = 200, description = "Tags", body = [TaxonomyItemResponse]),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "listTags"
)]
pub async fn list_tags(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    query: web::Query<TaxonomyListQuery>,
) -> ApiResult<web::Json<Vec<TaxonomyItemResponse>>> {
    list_items(TaxonomyKind::Tag, &user, &state, &query).await
}

/// Create a tag.
#[utoipa::path(
    post,
    path = "/api/tags",
    request_body = TaxonomyItemRequest,
    responses(
        (status = 201, description = "Tag created", body = TaxonomyItemResponse),
        (status = 400, description = "Invalid name", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "createTag"
)]
pub async fn create_tag(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    payload: web::Json<TaxonomyItemRequest>,
) -> ApiResult<HttpResponse> {
    create_item(TaxonomyKind::Tag, &user, &state, &payload).await
}

/// Fetch one of the caller's tags.
#[utoipa::path(
    get,
    path = "/api/tags/{id}",
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag", body = TaxonomyItemResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 404, description = "No such tag for this user", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "getTag"
)]
pub async fn get_tag(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<TaxonomyItemResponse>> {
    get_item(TaxonomyKind::Tag, &user, &state, &path).await
}

/// Rename a tag.
#[utoipa::path(
    put,
    path = "/api/tags/{id}",
    params(("id" = i64, Path, description = "Tag id")),
    request_body = TaxonomyItemRequest,
    responses(
        (status = 200, description = "Renamed tag", body = TaxonomyItemResponse),
        (status = 400, description = "Invalid name", body = ErrorSchema),
        (status = 404, description = "No such tag for this user", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "replaceTag"
)]
pub async fn replace_tag(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<TaxonomyItemRequest>,
) -> ApiResult<web::Json<TaxonomyItemResponse>> {
    rename_item(TaxonomyKind::Tag, &user, &state, &path, &payload, false).await
}

/// Rename a tag if a name is given.
#[utoipa::path(
    patch,
    path = "/api/tags/{id}",
    params(("id" = i64, Path, description = "Tag id")),
    request_body = TaxonomyItemRequest,
    responses(
        (status = 200, description = "Tag", body = TaxonomyItemResponse),
        (status = 400, description = "Invalid name", body = ErrorSchema),
        (status = 404, description = "No such tag for this user", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "updateTag"
)]
pub async fn update_tag(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<TaxonomyItemRequest>,
) -> ApiResult<web::Json<TaxonomyItemResponse>> {
    rename_item(TaxonomyKind::Tag, &user, &state, &path, &payload, true).await
}

/// Delete a tag and unlink it from every recipe.
#[utoipa::path(
    delete,
    path = "/api/tags/{id}",
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "No such tag for this user", body = ErrorSchema)
    ),
    tags = ["tags"],
    operation_id = "deleteTag"
)]
pub async fn delete_tag(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    delete_item(TaxonomyKind::Tag, &user, &state, &path).await
}

/// List the caller's ingredients, name descending.
#[utoipa::path(
    get,
    path = "/api/ingredients",
    params(TaxonomyListQuery),
    responses(
        (status = 200, description = "Ingredients", body = [TaxonomyItemResponse]),
        (status = 400, description = "Invalid query", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "listIngredients"
)]
pub async fn list_ingredients(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    query: web::Query<TaxonomyListQuery>,
) -> ApiResult<web::Json<Vec<TaxonomyItemResponse>>> {
    list_items(TaxonomyKind::Ingredient, &user, &state, &query).await
}

/// Create an ingredient.
#[utoipa::path(
    post,
    path = "/api/ingredients",
    request_body = TaxonomyItemRequest,
    responses(
        (status = 201, description = "Ingredient created", body = TaxonomyItemResponse),
        (status = 400, description = "Invalid name", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "createIngredient"
)]
pub async fn create_ingredient(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    payload: web::Json<TaxonomyItemRequest>,
) -> ApiResult<HttpResponse> {
    create_item(TaxonomyKind::Ingredient, &user, &state, &payload).await
}

/// Fetch one of the caller's ingredients.
#[utoipa::path(
    get,
    path = "/api/ingredients/{id}",
    params(("id" = i64, Path, description = "Ingredient id")),
    responses(
        (status = 200, description = "Ingredient", body = TaxonomyItemResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema),
        (status = 404, description = "No such ingredient for this user", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "getIngredient"
)]
pub async fn get_ingredient(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<TaxonomyItemResponse>> {
    get_item(TaxonomyKind::Ingredient, &user, &state, &path).await
}

/// Rename an ingredient.
#[utoipa::path(
    put,
    path = "/api/ingredients/{id}",
    params(("id" = i64, Path, description = "Ingredient id")),
    request_body = TaxonomyItemRequest,
    responses(
        (status = 200, description = "Renamed ingredient", body = TaxonomyItemResponse),
        (status = 400, description = "Invalid name", body = ErrorSchema),
        (status = 404, description = "No such ingredient for this user", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "replaceIngredient"
)]
pub async fn replace_ingredient(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<TaxonomyItemRequest>,
) -> ApiResult<web::Json<TaxonomyItemResponse>> {
    rename_item(TaxonomyKind::Ingredient, &user, &state, &path, &payload, false).await
}

/// Rename an ingredient if a name is given.
#[utoipa::path(
    patch,
    path = "/api/ingredients/{id}",
    params(("id" = i64, Path, description = "Ingredient id")),
    request_body = TaxonomyItemRequest,
    responses(
        (status = 200, description = "Ingredient", body = TaxonomyItemResponse),
        (status = 400, description = "Invalid name", body = ErrorSchema),
        (status = 404, description = "No such ingredient for this user", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "updateIngredient"
)]
pub async fn update_ingredient(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
    payload: web::Json<TaxonomyItemRequest>,
) -> ApiResult<web::Json<TaxonomyItemResponse>> {
    rename_item(TaxonomyKind::Ingredient, &user, &state, &path, &payload, true).await
}

/// Delete an ingredient and unlink it from every recipe.
#[utoipa::path(
    delete,
    path = "/api/ingredients/{id}",
    params(("id" = i64, Path, description = "Ingredient id")),
    responses(
        (status = 204, description = "Ingredient deleted"),
        (status = 404, description = "No such ingredient for this user", body = ErrorSchema)
    ),
    tags = ["ingredients"],
    operation_id = "deleteIngredient"
)]
pub async fn delete_ingredient(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    delete_item(TaxonomyKind::Ingredient, &user, &state, &path).await
}

/// Register the tag and ingredient routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/tags")
            .route(web::get().to(list_tags))
            .route(web::post().to(create_tag))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/tags/{id}")
            .route(web::get().to(get_tag))
            .route(web::put().to(replace_tag))
            .route(web::patch().to(update_tag))
            .route(web::delete().to(delete_tag))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/ingredients")
            .route(web::get().to(list_ingredients))
            .route(web::post().to(create_ingredient))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/ingredients/{id}")
            .route(web::get().to(get_ingredient))
            .route(web::put().to(replace_ingredient))
            .route(web::patch().to(update_ingredient))
            .route(web::delete().to(delete_ingredient))
            .default_service(web::to(method_not_allowed)),
    );
}

#[cfg(test)]
#[path = "taxonomy_tests.rs"]
mod tests;
