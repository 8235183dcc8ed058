//! The image a user picked, kept encoded until a prediction needs it.

use std::path::{Path, PathBuf};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::DynamicImage;
use tracing::debug;

use crate::error::{ClassifyError, Result};

/// Where the selected image came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// A `data:<mime>;base64,...` URL, as produced by a browser file reader.
    DataUrl { mime: String },
    File(PathBuf),
    Bytes,
}

/// Encoded bytes of the user's chosen file.
///
/// Replaced wholesale on every new selection; decoding is deferred to
/// preprocessing so a corrupt file surfaces as an input error at predict time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedImage {
    source: ImageSource,
    bytes: Vec<u8>,
}

impl SelectedImage {
    /// Parse a base64 data URL.
    pub fn from_data_url(url: &str) -> Result<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| ClassifyError::InvalidInput("not a data URL".to_string()))?;

        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| ClassifyError::InvalidInput("data URL has no payload".to_string()))?;

        let mime = meta
            .strip_suffix(";base64")
            .ok_or_else(|| ClassifyError::InvalidInput("data URL is not base64 encoded".to_string()))?;

        let bytes = STANDARD
            .decode(payload.trim())
            .map_err(|e| ClassifyError::InvalidInput(format!("invalid base64 payload: {}", e)))?;

        debug!("Selected {} bytes of {} from data URL", bytes.len(), mime);

        Ok(Self {
            source: ImageSource::DataUrl {
                mime: mime.to_string(),
            },
            bytes,
        })
    }

    /// Read an image file from disk.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        debug!("Selected {} bytes from {}", bytes.len(), path.display());

        Ok(Self {
            source: ImageSource::File(path.to_path_buf()),
            bytes,
        })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            source: ImageSource::Bytes,
            bytes,
        }
    }

    pub fn source(&self) -> &ImageSource {
        &self.source
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Decode into a raster, guessing the format from the content.
    pub fn decode(&self) -> Result<DynamicImage> {
        if self.bytes.is_empty() {
            return Err(ClassifyError::InvalidInput("selected image is empty".to_string()));
        }

        image::load_from_memory(&self.bytes)
            .map_err(|e| ClassifyError::InvalidInput(format!("cannot decode image: {}", e)))
    }
}
