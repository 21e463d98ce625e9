//! Token authentication extractor.
//!
//! Accepts `Authorization: Token <key>` or `Authorization: Bearer <key>` and
//! resolves the key to an active account through the account service.
//! A missing or malformed header fails on the first poll, so a handler that
//! lists [`AuthenticatedUser`] first answers 401 ahead of any body error.
//! Token lookups are awaited alongside the handler's other extractors; a
//! request carrying an unknown token and an invalid body may report either.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;
use tracing::debug;

use crate::domain::{AuthToken, Error, User, UserId};
use crate::inbound::http::state::HttpState;

const SCHEMES: [&str; 2] = ["Token", "Bearer"];

/// The account owning the presented token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(User);

impl AuthenticatedUser {
    #[must_use]
    pub fn user(&self) -> &User {
        &self.0
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        self.0.id()
    }

    #[must_use]
    pub fn into_inner(self) -> User {
        self.0
    }
}

/// Extract the raw key from an `Authorization` header value.
fn presented_key(header: &str) -> Option<&str> {
    let (scheme, key) = header.trim().split_once(' ')?;
    let key = key.trim();
    let known = SCHEMES
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(scheme));
    (known && !key.is_empty()).then_some(key)
}

fn bearer_token(req: &HttpRequest) -> Result<AuthToken, Error> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("authentication credentials were not provided"))?;
    let raw = header
        .to_str()
        .map_err(|_| Error::unauthorized("invalid authorization header"))?;
    presented_key(raw)
        .map(AuthToken::from_presented)
        .ok_or_else(|| Error::unauthorized("invalid authorization header"))
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = bearer_token(req);
        Box::pin(async move {
            let token = token?;
            let state = state.ok_or_else(|| Error::internal("HTTP state is not configured"))?;
            match state.accounts.resolve_token(&token).await? {
                Some(user) => Ok(Self(user)),
                None => {
                    debug!("rejected unknown or inactive token");
                    Err(Error::unauthorized("invalid token"))
                }
            }
        })
    }
}
