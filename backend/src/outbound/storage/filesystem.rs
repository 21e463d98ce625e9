//! Filesystem image store rooted at a capability directory.
//!
//! All paths resolve inside the media root through `cap-std`, so a stored
//! path can never escape it. Blocking I/O runs on the blocking pool.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::ambient_authority;
use cap_std::fs::{Dir, OpenOptions};
use tracing::debug;

use crate::domain::StoredImage;
use crate::domain::ports::{ImageStore, ImageStoreError};

use super::media_url;

/// Stores image blobs below a media root directory.
#[derive(Clone)]
pub struct FilesystemImageStore {
    root: Arc<Dir>,
    root_path: PathBuf,
    media_url: String,
}

impl std::fmt::Debug for FilesystemImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilesystemImageStore")
            .field("root", &self.root_path)
            .field("media_url", &self.media_url)
            .finish()
    }
}

fn io_error(path: &Path, error: &io::Error) -> ImageStoreError {
    ImageStoreError::io(format!("{}: {error}", path.display()))
}

impl FilesystemImageStore {
    /// Open (creating if needed) the media root.
    ///
    /// # Errors
    ///
    /// Returns [`ImageStoreError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(root: impl AsRef<Path>, media_url: impl Into<String>) -> Result<Self, ImageStoreError> {
        let root_path = root.as_ref().to_path_buf();
        Dir::create_ambient_dir_all(&root_path, ambient_authority())
            .map_err(|err| io_error(&root_path, &err))?;
        let dir = Dir::open_ambient_dir(&root_path, ambient_authority())
            .map_err(|err| io_error(&root_path, &err))?;
        Ok(Self {
            root: Arc::new(dir),
            root_path,
            media_url: media_url.into(),
        })
    }

    async fn blocking<T, F>(&self, op: F) -> Result<T, ImageStoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, ImageStoreError> + Send + 'static,
    {
        let root = Arc::clone(&self.root);
        tokio::task::spawn_blocking(move || op(&root))
            .await
            .map_err(|err| ImageStoreError::io(format!("storage task failed: {err}")))?
    }
}

fn write_new(dir: &Dir, path: &Path, bytes: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        dir.create_dir_all(parent)?;
    }
    let mut options = OpenOptions::new();
    options.write(true).create_new(true);
    let mut file = dir.open_with(path, &options)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[async_trait]
impl ImageStore for FilesystemImageStore {
    async fn save(&self, bytes: &[u8], path: &str) -> Result<StoredImage, ImageStoreError> {
        let image = StoredImage::from_path(path).map_err(|_| ImageStoreError::invalid_path(path))?;
        let relative = PathBuf::from(image.as_ref());
        let owned = bytes.to_vec();
        let root_path = self.root_path.clone();

        self.blocking(move |dir| {
            write_new(dir, &relative, &owned).map_err(|err| io_error(&root_path.join(&relative), &err))
        })
        .await?;

        debug!(path = image.as_ref(), size = bytes.len(), "image stored");
        Ok(image)
    }

    async fn delete(&self, image: &StoredImage) -> Result<(), ImageStoreError> {
        let relative = PathBuf::from(image.as_ref());
        let root_path = self.root_path.clone();

        self.blocking(move |dir| match dir.remove_file(&relative) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(&root_path.join(&relative), &err)),
        })
        .await
    }

    fn url_of(&self, image: &StoredImage) -> String {
        media_url(&self.media_url, image.as_ref())
    }
}
