//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use async_trait::async_trait;

use crate::domain::ports::{CredentialHasher, CredentialHasherError};
use crate::domain::{
    AccountServiceImpl, LoginCredentials, Password, PasswordDigest, RecipeServiceImpl,
    Registration, TaxonomyServiceImpl, User,
};
use crate::inbound::http::configure_api;
use crate::inbound::http::state::HttpState;
use crate::outbound::memory::InMemoryStore;
use crate::outbound::storage::InMemoryImageStore;

pub const TEST_MEDIA_URL: &str = "/media/";
pub const TEST_PASSWORD: &str = "testpass123";

/// Reversible digest so handler tests skip argon2's cost.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHasher;

#[async_trait]
impl CredentialHasher for PlainHasher {
    async fn hash(&self, password: &Password) -> Result<PasswordDigest, CredentialHasherError> {
        Ok(PasswordDigest::new(format!("plain${}", password.expose())))
    }

    async fn verify(&self, password: &str, digest: &PasswordDigest) -> bool {
        digest.as_ref() == format!("plain${password}")
    }
}

/// In-memory adapters wired behind the real services.
pub struct TestContext {
    pub store: InMemoryStore,
    pub images: InMemoryImageStore,
    pub state: web::Data<HttpState>,
}

impl TestContext {
    pub fn new() -> Self {
        let store = InMemoryStore::new();
        let images = InMemoryImageStore::new(TEST_MEDIA_URL);
        let shared = Arc::new(store.clone());
        let accounts = AccountServiceImpl::new(shared.clone(), shared.clone(), Arc::new(PlainHasher));
        let taxonomy = TaxonomyServiceImpl::new(shared.clone());
        let recipes = RecipeServiceImpl::new(shared.clone(), shared, Arc::new(images.clone()));
        let state = HttpState::new(Arc::new(accounts), Arc::new(taxonomy), Arc::new(recipes));
        Self {
            store,
            images,
            state: web::Data::new(state),
        }
    }

    /// Register `email` directly through the account service.
    pub async fn register(&self, email: &str) -> User {
        let registration = Registration::try_from_parts(email, TEST_PASSWORD, Some("Test User"))
            .expect("valid registration");
        self.state
            .accounts
            .create_user(registration)
            .await
            .expect("user created")
    }

    /// Register `email` and return an `Authorization` header value for it.
    pub async fn login_as(&self, email: &str) -> String {
        self.register(email).await;
        let credentials =
            LoginCredentials::try_from_parts(email, TEST_PASSWORD).expect("credential shape");
        let user = self
            .state
            .accounts
            .authenticate(&credentials)
            .await
            .expect("authentication runs")
            .expect("credentials accepted");
        let token = self
            .state
            .accounts
            .issue_token(&user)
            .await
            .expect("token issued");
        format!("Token {}", token.expose())
    }

    /// Application exposing the JSON API over this context.
    pub fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state.clone())
            .configure(configure_api)
    }
}

pub(crate) use crate::domain::recipe_image::fixtures::{jpeg as jpeg_bytes, png as png_bytes};

/// Build a `multipart/form-data` body with a single file part.
pub fn multipart_body(field: &str, filename: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let boundary = "recipe-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{field}\"; \
             filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={boundary}"), body)
}
