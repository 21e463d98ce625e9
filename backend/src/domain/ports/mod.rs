//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`*Service`) are called by inbound adapters. Driven ports
//! (repositories, the credential hasher, and the image store) are
//! implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod account_service;
mod credential_hasher;
mod image_store;
mod recipe_repository;
mod recipe_service;
mod taxonomy_repository;
mod taxonomy_service;
mod token_repository;
mod user_repository;

pub use account_service::AccountService;
#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHasher, CredentialHasherError};
#[cfg(test)]
pub use image_store::MockImageStore;
pub use image_store::{ImageStore, ImageStoreError};
#[cfg(test)]
pub use recipe_repository::MockRecipeRepository;
pub use recipe_repository::{ImageReplacement, RecipeRepository, RecipeRepositoryError};
pub use recipe_service::{ImageUpload, RecipeService};
#[cfg(test)]
pub use taxonomy_repository::MockTaxonomyRepository;
pub use taxonomy_repository::{TaxonomyRepository, TaxonomyRepositoryError};
pub use taxonomy_service::TaxonomyService;
#[cfg(test)]
pub use token_repository::MockTokenRepository;
pub use token_repository::{TokenRepository, TokenRepositoryError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
