//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every handler under `/api`, the health probes, the
//! wire DTOs and the error envelope. Swagger UI serves it in debug builds and
//! `cargo run --bin openapi-dump` prints it for external tooling.

use crate::inbound::http::recipes::{
    RecipeDetailResponse, RecipeImageForm, RecipeImageResponse, RecipeRequest, RecipeResponse,
};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::taxonomy::{TaxonomyItemRequest, TaxonomyItemResponse};
use crate::inbound::http::users::{
    ProfileRequest, RegisterRequest, TokenRequest, TokenResponse, UserResponse,
};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the token security scheme in the generated document.
pub const TOKEN_SCHEME: &str = "TokenAuth";

/// Enrich the generated document with the token header security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            TOKEN_SCHEME,
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "`Token <key>` with a key issued by POST /api/users/token.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Recipe catalog API",
        description = "Per-user recipes, tags and ingredients with image uploads."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("TokenAuth" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::issue_token,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_current_user,
        crate::inbound::http::taxonomy::list_tags,
        crate::inbound::http::taxonomy::create_tag,
        crate::inbound::http::taxonomy::get_tag,
        crate::inbound::http::taxonomy::replace_tag,
        crate::inbound::http::taxonomy::update_tag,
        crate::inbound::http::taxonomy::delete_tag,
        crate::inbound::http::taxonomy::list_ingredients,
        crate::inbound::http::taxonomy::create_ingredient,
        crate::inbound::http::taxonomy::get_ingredient,
        crate::inbound::http::taxonomy::replace_ingredient,
        crate::inbound::http::taxonomy::update_ingredient,
        crate::inbound::http::taxonomy::delete_ingredient,
        crate::inbound::http::recipes::list_recipes,
        crate::inbound::http::recipes::create_recipe,
        crate::inbound::http::recipes::get_recipe,
        crate::inbound::http::recipes::replace_recipe,
        crate::inbound::http::recipes::update_recipe,
        crate::inbound::http::recipes::delete_recipe,
        crate::inbound::http::recipes::upload_image,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ErrorSchema,
        ErrorCodeSchema,
        RegisterRequest,
        TokenRequest,
        TokenResponse,
        ProfileRequest,
        UserResponse,
        TaxonomyItemRequest,
        TaxonomyItemResponse,
        RecipeRequest,
        RecipeResponse,
        RecipeDetailResponse,
        RecipeImageResponse,
        RecipeImageForm,
    )),
    tags(
        (name = "users", description = "Registration, tokens and the caller's profile"),
        (name = "tags", description = "Recipe tags owned by the caller"),
        (name = "ingredients", description = "Ingredients owned by the caller"),
        (name = "recipes", description = "Recipes owned by the caller"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
