use chrono::{DateTime, Utc};
use mime::Mime;

use super::domain::UserId;
use super::intake::ValidationError;

pub const DEFAULT_MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Object storage holding profile photos.
pub trait PhotoStorage: Send + Sync {
    fn upload(
        &self,
        path: &str,
        bytes: &[u8],
        content_type: &str,
        upsert: bool,
    ) -> Result<(), StorageError>;
    fn public_url(&self, path: &str) -> String;
    fn remove(&self, path: &str) -> Result<(), StorageError>;
    /// Maps a public URL issued by this storage back to its object path.
    fn path_from_url(&self, url: &str) -> Option<String>;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("an object already exists at '{0}'")]
    AlreadyExists(String),
    #[error("object '{0}' not found")]
    NotFound(String),
    #[error("object storage unavailable: {0}")]
    Unavailable(String),
}

/// Binary photo payload as received from the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoUpload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// Client-side checks applied before a photo reaches storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhotoRules {
    max_bytes: usize,
}

impl Default for PhotoRules {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PHOTO_BYTES)
    }
}

impl PhotoRules {
    pub fn new(max_bytes: usize) -> Self {
        Self { max_bytes }
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Resolves the upload's media type and enforces the image-only and size rules.
    ///
    /// A missing content type falls back to a guess from the file name.
    pub fn check(&self, upload: &PhotoUpload) -> Result<Mime, ValidationError> {
        let declared = upload
            .content_type
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty());

        let media_type = match declared {
            Some(raw) => raw.parse::<Mime>().ok(),
            None => upload
                .file_name
                .as_deref()
                .and_then(|name| mime_guess::from_path(name).first()),
        };

        let media_type = match media_type {
            Some(parsed) if parsed.type_() == mime::IMAGE => parsed,
            _ => {
                return Err(ValidationError::UnsupportedMediaType {
                    content_type: declared.unwrap_or("unknown").to_string(),
                })
            }
        };

        if upload.bytes.len() > self.max_bytes {
            return Err(ValidationError::PayloadTooLarge {
                size: upload.bytes.len(),
                limit: self.max_bytes,
            });
        }

        Ok(media_type)
    }
}

/// Per-user object path keyed by upload time, e.g. `user-1/1700000000000.jpg`.
pub fn photo_object_path(
    user_id: &UserId,
    uploaded_at: DateTime<Utc>,
    media_type: &Mime,
) -> String {
    format!(
        "{}/{}.{}",
        user_id.0,
        uploaded_at.timestamp_millis(),
        extension_for(media_type)
    )
}

fn extension_for(media_type: &Mime) -> String {
    if media_type.subtype() == mime::JPEG {
        return "jpg".to_string();
    }
    // image/svg+xml -> svg
    let subtype = media_type.subtype().as_str();
    subtype
        .split('+')
        .next()
        .filter(|value| !value.is_empty())
        .unwrap_or("bin")
        .to_ascii_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(content_type: Option<&str>, file_name: Option<&str>, size: usize) -> PhotoUpload {
        PhotoUpload {
            file_name: file_name.map(str::to_string),
            content_type: content_type.map(str::to_string),
            bytes: vec![0u8; size],
        }
    }

    #[test]
    fn accepts_four_megabyte_jpeg() {
        let rules = PhotoRules::default();
        let media = rules
            .check(&upload(Some("image/jpeg"), None, 4 * 1024 * 1024))
            .expect("jpeg under the limit");
        assert_eq!(media, mime::IMAGE_JPEG);
    }

    #[test]
    fn rejects_six_megabyte_image() {
        let rules = PhotoRules::default();
        assert_eq!(
            rules.check(&upload(Some("image/png"), None, 6 * 1024 * 1024)),
            Err(ValidationError::PayloadTooLarge {
                size: 6 * 1024 * 1024,
                limit: DEFAULT_MAX_PHOTO_BYTES,
            })
        );
    }

    #[test]
    fn rejects_non_image_types() {
        let rules = PhotoRules::default();
        assert!(matches!(
            rules.check(&upload(Some("application/pdf"), Some("cv.pdf"), 1024)),
            Err(ValidationError::UnsupportedMediaType { .. })
        ));
        assert!(matches!(
            rules.check(&upload(None, Some("notes.txt"), 1024)),
            Err(ValidationError::UnsupportedMediaType { .. })
        ));
        assert!(matches!(
            rules.check(&upload(None, None, 1024)),
            Err(ValidationError::UnsupportedMediaType { .. })
        ));
    }

    #[test]
    fn guesses_type_from_file_name() {
        let rules = PhotoRules::default();
        let media = rules
            .check(&upload(None, Some("me.png"), 1024))
            .expect("png guessed");
        assert_eq!(media, mime::IMAGE_PNG);
    }

    #[test]
    fn object_path_is_keyed_by_user_and_timestamp() {
        let at = DateTime::from_timestamp_millis(1_700_000_000_123).expect("valid timestamp");
        let user = UserId("user-7".to_string());
        assert_eq!(
            photo_object_path(&user, at, &mime::IMAGE_JPEG),
            "user-7/1700000000123.jpg"
        );
        let svg: Mime = "image/svg+xml".parse().expect("svg mime");
        assert_eq!(photo_object_path(&user, at, &svg), "user-7/1700000000123.svg");
    }
}
