//! Image upload rules: accepted formats, size limits and stored names.

use uuid::Uuid;

use crate::error::CoreError;

/// Default per-file limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Files accepted in a single upload request.
pub const MAX_FILES_PER_REQUEST: usize = crate::wizard::steps::MAX_IMAGES as usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Webp,
}

impl ImageFormat {
    /// Detect the format from the file's leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            Some(Self::Png)
        } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Webp => "webp",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
        }
    }
}

/// Check size and content of an uploaded file.
///
/// The declared content type is advisory; the bytes decide.
pub fn validate_image(filename: &str, bytes: &[u8], max_bytes: u64) -> Result<ImageFormat, CoreError> {
    if bytes.is_empty() {
        return Err(CoreError::Validation(format!("File '{filename}' is empty")));
    }
    if bytes.len() as u64 > max_bytes {
        return Err(CoreError::Validation(format!(
            "File '{filename}' exceeds the {max_bytes} byte limit"
        )));
    }
    ImageFormat::sniff(bytes).ok_or_else(|| {
        CoreError::Validation(format!(
            "File '{filename}' is not a JPEG, PNG or WebP image"
        ))
    })
}

/// Collision-free stored name for an upload.
pub fn stored_name(format: ImageFormat) -> String {
    format!("{}.{}", Uuid::now_v7(), format.extension())
}

/// Public URL for a stored file under `base_url`.
pub fn public_url(base_url: &str, prefix: &str, name: &str) -> String {
    format!(
        "{}/{}/{}",
        base_url.trim_end_matches('/'),
        prefix.trim_matches('/'),
        name
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0];

    #[test]
    fn sniffs_supported_formats() {
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(PNG), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::sniff(b"GIF89a"), None);
    }

    #[test]
    fn validate_checks_size_and_content() {
        assert_eq!(validate_image("a.png", PNG, 1024).unwrap(), ImageFormat::Png);
        assert!(validate_image("a.png", PNG, 4).is_err());
        assert!(validate_image("a.png", &[], 1024).is_err());
        assert!(validate_image("a.txt", b"hello world", 1024).is_err());
    }

    #[test]
    fn stored_names_are_unique() {
        let a = stored_name(ImageFormat::Webp);
        let b = stored_name(ImageFormat::Webp);
        assert_ne!(a, b);
        assert!(a.ends_with(".webp"));
    }

    #[test]
    fn public_url_joins_cleanly() {
        assert_eq!(
            public_url("http://localhost:3000/", "/uploads/", "x.png"),
            "http://localhost:3000/uploads/x.png"
        );
    }
}
