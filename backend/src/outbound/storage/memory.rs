//! In-memory image store for tests and database-less runs.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::StoredImage;
use crate::domain::ports::{ImageStore, ImageStoreError};

use super::media_url;

/// Keeps blobs in a shared map; clones see the same blobs.
#[derive(Debug, Clone)]
pub struct InMemoryImageStore {
    blobs: Arc<Mutex<BTreeMap<String, Vec<u8>>>>,
    media_url: String,
}

impl InMemoryImageStore {
    pub fn new(media_url: impl Into<String>) -> Self {
        Self {
            blobs: Arc::default(),
            media_url: media_url.into(),
        }
    }

    /// Whether a blob is currently stored at `path`.
    pub fn contains(&self, path: &str) -> bool {
        self.blobs
            .lock()
            .map(|blobs| blobs.contains_key(path))
            .unwrap_or(false)
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.lock().map(|blobs| blobs.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn save(&self, bytes: &[u8], path: &str) -> Result<StoredImage, ImageStoreError> {
        let image = StoredImage::from_path(path).map_err(|_| ImageStoreError::invalid_path(path))?;
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| ImageStoreError::io("image store lock poisoned"))?;
        if blobs.contains_key(image.as_ref()) {
            return Err(ImageStoreError::io(format!("{path}: already exists")));
        }
        blobs.insert(image.as_ref().to_owned(), bytes.to_vec());
        Ok(image)
    }

    async fn delete(&self, image: &StoredImage) -> Result<(), ImageStoreError> {
        let mut blobs = self
            .blobs
            .lock()
            .map_err(|_| ImageStoreError::io("image store lock poisoned"))?;
        blobs.remove(image.as_ref());
        Ok(())
    }

    fn url_of(&self, image: &StoredImage) -> String {
        media_url(&self.media_url, image.as_ref())
    }
}
