//! Account API handlers.
//!
//! ```text
//! POST  /api/users        {"email":"cook@example.com","password":"secret","name":"Cook"}
//! POST  /api/users/token  {"email":"cook@example.com","password":"secret"}
//! GET   /api/users/me
//! PATCH /api/users/me     {"name":"Chef"}
//! ```

use actix_web::{HttpResponse, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{
    Error, LoginCredentials, Password, ProfileUpdate, Registration, User, UserName,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::method_not_allowed;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    ErrorCode, FieldName, check_password_policy, field_error, map_login_validation_error,
    map_user_validation_error,
};

/// Registration body for `POST /api/users`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "cook@example.com")]
    pub email: String,
    #[schema(example = "correct horse")]
    pub password: String,
    #[serde(default)]
    #[schema(example = "Cook")]
    pub name: Option<String>,
}

/// Credentials body for `POST /api/users/token`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenRequest {
    pub email: String,
    pub password: String,
}

/// Issued API token. Present it as `Authorization: Token <token>`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Profile changes for `PATCH /api/users/me`.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct ProfileRequest {
    /// Accepted only to reject it: the email cannot change.
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Public view of an account. Credentials are never serialised.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "cook@example.com")]
    pub email: String,
    #[schema(example = "Cook")]
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email().as_ref().to_owned(),
            name: user.name().as_ref().to_owned(),
        }
    }
}

impl ProfileRequest {
    fn into_update(self) -> Result<ProfileUpdate, Error> {
        if self.email.is_some() {
            return Err(field_error(
                FieldName::new("email"),
                ErrorCode::ReadOnly,
                "email cannot be changed",
            ));
        }
        let name = self
            .name
            .as_deref()
            .map(UserName::new)
            .transpose()
            .map_err(map_user_validation_error)?;
        let password = match self.password.as_deref() {
            Some(raw) => {
                check_password_policy(raw)?;
                Some(Password::new(raw).map_err(map_user_validation_error)?)
            }
            None => None,
        };
        Ok(ProfileUpdate { name, password })
    }
}

/// Register a new account.
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 400, description = "Invalid email, short password, or email taken", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "registerUser",
    security(())
)]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let RegisterRequest {
        email,
        password,
        name,
    } = payload.into_inner();
    let registration = Registration::try_from_parts(&email, &password, name.as_deref())
        .map_err(map_user_validation_error)?;
    check_password_policy(&password)?;

    let user = state.accounts.create_user(registration).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(&user)))
}

/// Exchange credentials for an API token.
#[utoipa::path(
    post,
    path = "/api/users/token",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Missing fields or bad credentials", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "issueToken",
    security(())
)]
pub async fn issue_token(
    state: web::Data<HttpState>,
    payload: web::Json<TokenRequest>,
) -> ApiResult<web::Json<TokenResponse>> {
    let request = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&request.email, &request.password)
        .map_err(map_login_validation_error)?;

    let Some(user) = state.accounts.authenticate(&credentials).await? else {
        return Err(Error::invalid_request(
            "unable to authenticate with provided credentials",
        )
        .with_details(json!({ "code": "invalid_credentials" })));
    };
    let token = state.accounts.issue_token(&user).await?;
    Ok(web::Json(TokenResponse {
        token: token.expose().to_owned(),
    }))
}

/// Fetch the caller's profile.
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Current account", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
pub async fn current_user(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<UserResponse>> {
    let profile = state.accounts.profile(user.id()).await?;
    Ok(web::Json(UserResponse::from(&profile)))
}

/// Update the caller's name or password.
#[utoipa::path(
    patch,
    path = "/api/users/me",
    request_body = ProfileRequest,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Invalid field", body = ErrorSchema),
        (status = 401, description = "Missing or invalid token", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "updateCurrentUser"
)]
pub async fn update_current_user(
    user: AuthenticatedUser,
    state: web::Data<HttpState>,
    payload: web::Json<ProfileRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let update = payload.into_inner().into_update()?;
    let updated = state.accounts.update_profile(user.id(), update).await?;
    Ok(web::Json(UserResponse::from(&updated)))
}

/// Register the account routes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/users")
            .route(web::post().to(register))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/users/token")
            .route(web::post().to(issue_token))
            .default_service(web::to(method_not_allowed)),
    )
    .service(
        web::resource("/users/me")
            .route(web::get().to(current_user))
            .route(web::patch().to(update_current_user))
            .default_service(web::to(method_not_allowed)),
    );
}
