//! Uploaded recipe images and their storage paths.
//!
//! An upload is accepted only when the payload decodes as an image. The
//! stored file name is a fresh UUID, so uploads never overwrite one another.

use std::fmt;
use std::path::Path;

use image::ImageFormat;
use uuid::Uuid;

/// Directory, relative to the media root, holding recipe images.
pub const RECIPE_IMAGE_DIR: &str = "uploads/recipe";

/// Reasons an upload is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageValidationError {
    Empty,
    Unrecognised,
    Undecodable { message: String },
}

impl fmt::Display for ImageValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "the submitted file is empty"),
            Self::Unrecognised => write!(f, "the submitted file is not a supported image"),
            Self::Undecodable { message } => {
                write!(f, "the submitted image could not be decoded: {message}")
            }
        }
    }
}

impl std::error::Error for ImageValidationError {}

/// A decoded, validated upload ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedImage {
    bytes: Vec<u8>,
    extension: String,
}

impl UploadedImage {
    /// Validate `bytes` as an image.
    ///
    /// The client's file extension is kept when it names the detected
    /// format; otherwise the format's canonical extension is used.
    pub fn decode(bytes: Vec<u8>, filename: Option<&str>) -> Result<Self, ImageValidationError> {
        if bytes.is_empty() {
            return Err(ImageValidationError::Empty);
        }
        let format =
            image::guess_format(&bytes).map_err(|_| ImageValidationError::Unrecognised)?;
        image::load_from_memory_with_format(&bytes, format).map_err(|err| {
            ImageValidationError::Undecodable {
                message: err.to_string(),
            }
        })?;
        let extension = pick_extension(format, filename).ok_or(ImageValidationError::Unrecognised)?;
        Ok(Self { bytes, extension })
    }

    #[must_use]
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    #[must_use]
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Fresh storage path of the form `uploads/recipe/<uuid>.<ext>`.
    #[must_use]
    pub fn storage_path(&self) -> String {
        format!("{RECIPE_IMAGE_DIR}/{}.{}", Uuid::new_v4(), self.extension)
    }
}

fn pick_extension(format: ImageFormat, filename: Option<&str>) -> Option<String> {
    let known = format.extensions_str();
    let supplied = filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match supplied {
        Some(ext) if known.iter().any(|candidate| *candidate == ext) => Some(ext),
        _ => known.first().map(|ext| (*ext).to_owned()),
    }
}

/// Error returned for storage paths that escape the image directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidImagePath(pub String);

impl fmt::Display for InvalidImagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid image path: {}", self.0)
    }
}

impl std::error::Error for InvalidImagePath {}

/// Relative path of a stored image under the media root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StoredImage(String);

impl StoredImage {
    /// Accepts only relative paths without parent traversal.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::StoredImage;
    ///
    /// assert!(StoredImage::from_path("uploads/recipe/a.png").is_ok());
    /// assert!(StoredImage::from_path("../etc/passwd").is_err());
    /// assert!(StoredImage::from_path("/abs.png").is_err());
    /// ```
    pub fn from_path(path: impl Into<String>) -> Result<Self, InvalidImagePath> {
        let path = path.into();
        let escapes = path.is_empty()
            || path.starts_with('/')
            || path.starts_with('\\')
            || path.split(['/', '\\']).any(|segment| segment == ".." || segment.is_empty());
        if escapes {
            return Err(InvalidImagePath(path));
        }
        Ok(Self(path))
    }
}

impl AsRef<str> for StoredImage {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Tiny encoded images for tests.

    use std::io::Cursor;

    use image::{ImageFormat, Rgb, RgbImage};

    /// Encode a 10x10 image in the requested format.
    pub(crate) fn encoded(format: ImageFormat) -> Vec<u8> {
        let img = RgbImage::from_pixel(10, 10, Rgb([200, 40, 40]));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, format).expect("encode test image");
        out.into_inner()
    }

    pub(crate) fn png() -> Vec<u8> {
        encoded(ImageFormat::Png)
    }

    pub(crate) fn jpeg() -> Vec<u8> {
        encoded(ImageFormat::Jpeg)
    }
}
