//! Profile image normalization
//!
//! Uploaded profile pictures arrive as base64 strings of any common raster
//! format. They are re-encoded as JPEG at a fixed quality so stored images
//! stay small. A picture that cannot be processed never blocks the caller:
//! the original string is kept and the failure comes back as a warning.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::codecs::jpeg::JpegEncoder;
use thiserror::Error;

/// JPEG quality (0-100) for stored profile images
pub const PROFILE_IMAGE_QUALITY: u8 = 50;

/// Prefix of every normalized image
pub const JPEG_DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, Error)]
pub enum ImageProcessingError {
    #[error("profile image is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("profile image could not be decoded: {0}")]
    Decode(#[source] image::ImageError),

    #[error("profile image could not be encoded: {0}")]
    Encode(#[source] image::ImageError),

    #[error("image worker failed: {0}")]
    Worker(String),
}

/// Result of [`normalize_profile_image`]
#[derive(Debug)]
pub struct NormalizedImage {
    /// Value to store: the re-encoded image, or the input when processing failed
    pub value: String,
    pub warning: Option<ImageProcessingError>,
}

impl NormalizedImage {
    pub fn is_ok(&self) -> bool {
        self.warning.is_none()
    }
}

/// Re-encode a base64 (optionally `data:` URI) image as a JPEG data URI.
///
/// Blank input is returned unchanged.
pub fn normalize_profile_image(raw: &str) -> NormalizedImage {
    if raw.trim().is_empty() {
        return NormalizedImage {
            value: raw.to_string(),
            warning: None,
        };
    }

    match reencode(raw) {
        Ok(value) => NormalizedImage { value, warning: None },
        Err(e) => NormalizedImage {
            value: raw.to_string(),
            warning: Some(e),
        },
    }
}

/// [`normalize_profile_image`] on the blocking thread pool
pub async fn normalize_profile_image_blocking(raw: String) -> NormalizedImage {
    let original = raw.clone();

    match tokio::task::spawn_blocking(move || normalize_profile_image(&raw)).await {
        Ok(normalized) => normalized,
        Err(e) => NormalizedImage {
            value: original,
            warning: Some(ImageProcessingError::Worker(e.to_string())),
        },
    }
}

fn strip_data_uri(raw: &str) -> &str {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("data:")
        .and_then(|rest| rest.split_once(";base64,"))
        .map(|(_, payload)| payload)
        .unwrap_or(trimmed)
}

fn reencode(raw: &str) -> Result<String, ImageProcessingError> {
    let bytes = STANDARD.decode(strip_data_uri(raw))?;
    let img = image::load_from_memory(&bytes).map_err(ImageProcessingError::Decode)?;

    // JPEG has no alpha channel
    let rgb = img.to_rgb8();

    let mut buffer = Vec::new();
    JpegEncoder::new_with_quality(&mut buffer, PROFILE_IMAGE_QUALITY)
        .encode_image(&rgb)
        .map_err(ImageProcessingError::Encode)?;

    Ok(format!("{}{}", JPEG_DATA_URI_PREFIX, STANDARD.encode(&buffer)))
}
