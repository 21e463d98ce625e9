//! HTTP inbound adapter exposing the JSON API.

pub mod auth;
pub mod error;
pub mod health;
pub mod recipes;
pub mod schemas;
pub mod state;
pub mod taxonomy;
#[cfg(test)]
pub mod test_utils;
pub mod users;
pub mod validation;

use actix_web::web;

pub use error::ApiResult;

/// Mount every API route under `/api`.
///
/// Unknown paths below `/api` answer with the JSON error envelope.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .configure(error::configure_extractors)
            .configure(users::configure)
            .configure(taxonomy::configure)
            .configure(recipes::configure)
            .default_service(web::to(error::route_not_found)),
    );
}
