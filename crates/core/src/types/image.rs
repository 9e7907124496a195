//! Product image representation.
//!
//! A product's image is either a file the user just picked (sent as a
//! multipart file part) or the URL the backend stored for an earlier upload.
//! Never both.

use std::fmt;

/// A file picked for upload on the product form.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Original file name, forwarded as the multipart part's file name.
    pub file_name: String,
    /// MIME type, e.g. `image/png`.
    pub content_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Create an upload from its parts.
    #[must_use]
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes,
        }
    }
}

// Image bytes are useless in logs.
impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// The image carried by a create/update request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ProductImage {
    /// No image at all.
    #[default]
    None,
    /// A freshly picked file.
    Upload(ImageUpload),
    /// The URL the backend already stores for this product.
    Existing(String),
}

impl ProductImage {
    /// Pick the image to send on update: a new upload wins, otherwise the
    /// stored URL is forwarded so the backend does not clear it.
    #[must_use]
    pub fn for_update(upload: Option<ImageUpload>, stored_url: Option<&str>) -> Self {
        match (upload, stored_url) {
            (Some(upload), _) => Self::Upload(upload),
            (None, Some(url)) => Self::Existing(url.to_owned()),
            (None, None) => Self::None,
        }
    }

    /// Returns the upload, if a new file was picked.
    #[must_use]
    pub const fn upload(&self) -> Option<&ImageUpload> {
        match self {
            Self::Upload(upload) => Some(upload),
            Self::None | Self::Existing(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_update_prefers_new_upload() {
        let upload = ImageUpload::new("burger.png", "image/png", vec![1, 2, 3]);
        let image = ProductImage::for_update(Some(upload.clone()), Some("https://cdn/old.png"));
        assert_eq!(image, ProductImage::Upload(upload));
    }

    #[test]
    fn test_for_update_forwards_stored_url() {
        let image = ProductImage::for_update(None, Some("https://cdn/old.png"));
        assert_eq!(image, ProductImage::Existing("https://cdn/old.png".to_owned()));
        assert!(image.upload().is_none());
    }

    #[test]
    fn test_debug_hides_bytes() {
        let upload = ImageUpload::new("a.jpg", "image/jpeg", vec![0; 2048]);
        let debug = format!("{upload:?}");
        assert!(debug.contains("len: 2048"));
        assert!(!debug.contains("[0, 0"));
    }
}
