//! Inline images stored as base64 data URLs.
//!
//! Product and moderator images are embedded directly in the backend
//! documents as `data:image/<subtype>;base64,<payload>` strings.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

/// Errors that can occur when building an [`ImageData`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ImageError {
    /// The decoded image is larger than [`ImageData::MAX_BYTES`].
    #[error("Image size must be less than 2MB")]
    TooLarge {
        /// Size of the rejected image in bytes.
        size: usize,
    },
    /// The content type is not `image/*`.
    #[error("File must be an image")]
    NotAnImage,
    /// No bytes were uploaded.
    #[error("Image file is empty")]
    Empty,
    /// The string is not a base64 data URL.
    #[error("Failed to read image file")]
    Malformed,
}

/// A validated inline image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageData(String);

impl ImageData {
    /// Largest accepted decoded image size (2 MiB).
    pub const MAX_BYTES: usize = 2 * 1024 * 1024;

    /// Encode uploaded bytes as a data URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are empty, larger than
    /// [`Self::MAX_BYTES`], or the content type is not an image type.
    pub fn from_bytes(content_type: &str, bytes: &[u8]) -> Result<Self, ImageError> {
        if bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        if bytes.len() > Self::MAX_BYTES {
            return Err(ImageError::TooLarge { size: bytes.len() });
        }
        let mime = content_type.trim().to_ascii_lowercase();
        if !is_image_mime(&mime) {
            return Err(ImageError::NotAnImage);
        }

        Ok(Self(format!("data:{mime};base64,{}", STANDARD.encode(bytes))))
    }

    /// Validate an existing data URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not a base64 image data URL or its
    /// payload exceeds [`Self::MAX_BYTES`].
    pub fn parse(data_url: &str) -> Result<Self, ImageError> {
        let rest = data_url.strip_prefix("data:").ok_or(ImageError::Malformed)?;
        let (mime, payload) = rest.split_once(";base64,").ok_or(ImageError::Malformed)?;
        if !is_image_mime(mime) {
            return Err(ImageError::NotAnImage);
        }

        let decoded = STANDARD.decode(payload).map_err(|_| ImageError::Malformed)?;
        if decoded.is_empty() {
            return Err(ImageError::Empty);
        }
        if decoded.len() > Self::MAX_BYTES {
            return Err(ImageError::TooLarge {
                size: decoded.len(),
            });
        }

        Ok(Self(data_url.to_owned()))
    }

    /// The data URL, suitable for an `<img src>`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the data URL.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

fn is_image_mime(mime: &str) -> bool {
    mime.strip_prefix("image/")
        .is_some_and(|subtype| !subtype.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bytes_builds_data_url() {
        let image = ImageData::from_bytes("image/png", &[1, 2, 3]).unwrap();
        assert_eq!(image.as_str(), "data:image/png;base64,AQID");
    }

    #[test]
    fn test_from_bytes_accepts_exactly_two_megabytes() {
        let bytes = vec![0_u8; ImageData::MAX_BYTES];
        assert!(ImageData::from_bytes("image/jpeg", &bytes).is_ok());
    }

    #[test]
    fn test_from_bytes_rejects_oversized() {
        let bytes = vec![0_u8; ImageData::MAX_BYTES + 1];
        let err = ImageData::from_bytes("image/jpeg", &bytes).unwrap_err();
        assert!(matches!(err, ImageError::TooLarge { .. }));
        assert_eq!(err.to_string(), "Image size must be less than 2MB");
    }

    #[test]
    fn test_from_bytes_rejects_non_images() {
        assert_eq!(
            ImageData::from_bytes("application/pdf", &[1]),
            Err(ImageError::NotAnImage)
        );
        assert_eq!(ImageData::from_bytes("image/png", &[]), Err(ImageError::Empty));
    }

    #[test]
    fn test_parse_round_trips_from_bytes() {
        let image = ImageData::from_bytes("image/webp", b"pixels").unwrap();
        assert_eq!(ImageData::parse(image.as_str()).unwrap(), image);
    }

    #[test]
    fn test_parse_rejects_plain_urls() {
        assert_eq!(
            ImageData::parse("https://example.com/a.png"),
            Err(ImageError::Malformed)
        );
        assert_eq!(
            ImageData::parse("data:image/png;base64,!!!"),
            Err(ImageError::Malformed)
        );
    }
}
