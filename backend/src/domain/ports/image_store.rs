//! Port for recipe image blob storage.

use async_trait::async_trait;

use crate::domain::StoredImage;

use super::define_port_error;

define_port_error! {
    /// Errors raised by image storage adapters.
    pub enum ImageStoreError {
        /// The blob could not be written or removed.
        Io { message: String } => "image storage failed: {message}",
        /// The target path is not a valid relative storage path.
        InvalidPath { path: String } => "invalid image path: {path}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Write `bytes` to the relative `path`. Never overwrites an existing blob.
    async fn save(&self, bytes: &[u8], path: &str) -> Result<StoredImage, ImageStoreError>;

    /// Remove a blob. Removing a missing blob succeeds.
    async fn delete(&self, image: &StoredImage) -> Result<(), ImageStoreError>;

    /// Public URL at which the blob is served.
    fn url_of(&self, image: &StoredImage) -> String;
}
