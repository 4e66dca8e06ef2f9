use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::debug;

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";
const JPEG_MAGIC: &[u8] = b"\xff\xd8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ImageMime {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
}

impl ImageMime {
    pub fn as_str(self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            ImageMime::Jpeg => "jpg",
            ImageMime::Png => "png",
        }
    }

    /// Detect the format from magic bytes. Unrecognized data counts as JPEG.
    pub fn sniff(data: &[u8]) -> Self {
        if data.starts_with(PNG_MAGIC) {
            ImageMime::Png
        } else {
            if !data.starts_with(JPEG_MAGIC) {
                debug!("Unrecognized image header, assuming JPEG");
            }
            ImageMime::Jpeg
        }
    }
}

impl fmt::Display for ImageMime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of an image task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub data: Vec<u8>,
    pub mime_type: ImageMime,
    pub revised_prompt: Option<String>,
    pub model: String,
}

impl GeneratedImage {
    /// Image bytes as standard base64
    pub fn base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

#[derive(Debug, Error)]
pub enum ImageDecodeError {
    #[error("image payload is empty")]
    Empty,
    #[error("image payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Decode a base64 image payload, with or without a `data:` URI prefix.
pub fn decode_payload(payload: &str) -> Result<(Vec<u8>, ImageMime), ImageDecodeError> {
    let payload = payload.trim();
    let encoded = match payload.strip_prefix("data:") {
        Some(rest) => rest.split_once(',').map_or(rest, |(_, data)| data),
        None => payload,
    };
    if encoded.is_empty() {
        return Err(ImageDecodeError::Empty);
    }
    let data = STANDARD.decode(encoded)?;
    if data.is_empty() {
        return Err(ImageDecodeError::Empty);
    }
    let mime = ImageMime::sniff(&data);
    Ok((data, mime))
}
