//! Multipart form reading for forms with an image upload.

use std::collections::HashMap;

use axum::extract::Multipart;
use ms_apparels_core::{ImageData, ImageError};

use crate::error::AppError;

/// Name of the file input on every upload form.
pub const IMAGE_FIELD: &str = "image";

/// A submitted multipart form.
#[derive(Debug, Default)]
pub struct UploadForm {
    fields: HashMap<String, String>,
    /// The uploaded image; `None` when no file was chosen.
    pub image: Option<Result<ImageData, ImageError>>,
}

impl UploadForm {
    /// Read every part of the request.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::BadRequest`] if the body is not valid multipart.
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == IMAGE_FIELD {
                let content_type = field.content_type().unwrap_or_default().to_owned();
                let has_file = field.file_name().is_some_and(|f| !f.is_empty());
                let bytes = field.bytes().await?;
                if has_file || !bytes.is_empty() {
                    form.image = Some(ImageData::from_bytes(&content_type, &bytes));
                }
            } else {
                let value = field.text().await?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Build a form from already-read parts.
    #[must_use]
    pub fn from_parts<I>(fields: I, image: Option<Result<ImageData, ImageError>>) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Self {
            fields: fields.into_iter().collect(),
            image,
        }
    }

    /// A text field, or an empty string when absent.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.fields.get(name).cloned().unwrap_or_default()
    }

    /// Split off the image, keeping its error separately.
    ///
    /// An invalid upload is reported and treated as no upload.
    pub fn take_image(&mut self) -> (Option<ImageData>, Option<ImageError>) {
        match self.image.take() {
            Some(Ok(image)) => (Some(image), None),
            Some(Err(e)) => (None, Some(e)),
            None => (None, None),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_take_image_splits_error() {
        let mut form = UploadForm::from_parts([], Some(Err(ImageError::TooLarge { size: 3 })));
        let (image, error) = form.take_image();
        assert!(image.is_none());
        assert_eq!(error.unwrap().to_string(), "Image size must be less than 2MB");
        assert_eq!(form.take_image(), (None, None));
    }

    #[test]
    fn test_text_fields() {
        let form = UploadForm::from_parts([("name".to_string(), "Tee".to_string())], None);
        assert_eq!(form.text("name"), "Tee");
        assert_eq!(form.text("price"), "");
    }
}
