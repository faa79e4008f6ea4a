use bytes::Bytes;
use image::{imageops::FilterType, ImageFormat, ImageReader, ImageResult};
use std::{fmt::Display, io::Cursor, sync::Arc};
use tracing::{debug, info};

use crate::{
    domain::{
        errors::{PreviewError, PreviewResult},
        models::{content_type_for, FileHandle, FileType},
        value_objects::{LogicalPath, UserId},
    },
    ports::services::FileStorage,
    services::PathResolver,
};

/// Images wider than this are scaled down for preview
pub const PREVIEW_IMAGE_WIDTH: u32 = 800;

/// A preview-sized image, fully encoded
#[derive(Debug, Clone)]
pub struct ImagePreview {
    /// Percent-encoded file name for `Content-Disposition`
    pub encoded_name: String,
    pub content_type: &'static str,
    pub data: Bytes,
}

/// An audio file opened for inline playback
#[derive(Debug)]
pub struct AudioPreview {
    pub encoded_name: String,
    pub content_type: &'static str,
    pub handle: FileHandle,
}

fn processing_error(path: &LogicalPath, err: impl Display) -> PreviewError {
    PreviewError::ImageProcessing {
        path: path.to_string(),
        message: err.to_string(),
    }
}

/// Re-encode `original` at `max_width` when it is wider, otherwise hand it back as is
fn shrink_if_wider_than(
    original: Bytes,
    format: ImageFormat,
    max_width: u32,
) -> ImageResult<Bytes> {
    let (width, height) =
        ImageReader::with_format(Cursor::new(&original[..]), format).into_dimensions()?;
    if width <= max_width {
        return Ok(original);
    }

    let image = image::load_from_memory_with_format(&original, format)?;
    let resized = image.resize(max_width, u32::MAX, FilterType::Triangle);
    debug!(
        "Shrunk {}x{} image to {}x{}",
        width,
        height,
        resized.width(),
        resized.height()
    );

    let mut out = Cursor::new(Vec::new());
    resized.write_to(&mut out, format)?;
    Ok(Bytes::from(out.into_inner()))
}

/// Inline previews for images and audio
#[derive(Clone)]
pub struct PreviewService {
    storage: Arc<dyn FileStorage>,
    resolver: PathResolver,
    max_width: u32,
}

impl PreviewService {
    pub fn new(storage: Arc<dyn FileStorage>) -> Self {
        Self::with_max_width(storage, PREVIEW_IMAGE_WIDTH)
    }

    pub fn with_max_width(storage: Arc<dyn FileStorage>, max_width: u32) -> Self {
        Self {
            storage,
            resolver: PathResolver::new(),
            max_width,
        }
    }

    fn expect_type(&self, path: &str, expected: FileType) -> PreviewResult<LogicalPath> {
        let logical = self.resolver.parse_file(path)?;
        if FileType::detect(logical.as_str()) != expected {
            return Err(PreviewError::UnsupportedType {
                path: logical.to_string(),
                expected,
            });
        }
        Ok(logical)
    }

    /// Load an image, scaled down to the preview width when wider
    pub async fn image(&self, user: UserId, path: &str) -> PreviewResult<ImagePreview> {
        let logical = self.expect_type(path, FileType::Image)?;
        let format = logical
            .as_str()
            .rsplit_once('.')
            .and_then(|(_, extension)| ImageFormat::from_extension(extension))
            .ok_or_else(|| PreviewError::UnsupportedType {
                path: logical.to_string(),
                expected: FileType::Image,
            })?;

        info!("Preview image '{}' for user {}", logical, user);
        let original = self
            .storage
            .get_object(user, logical.as_str())
            .await?
            .into_bytes()
            .await?;

        let max_width = self.max_width;
        let data =
            tokio::task::spawn_blocking(move || shrink_if_wider_than(original, format, max_width))
                .await
                .map_err(|e| processing_error(&logical, e))?
                .map_err(|e| processing_error(&logical, e))?;

        Ok(ImagePreview {
            encoded_name: urlencoding::encode(logical.name()).into_owned(),
            content_type: content_type_for(logical.as_str()),
            data,
        })
    }

    /// Open an audio file for inline playback
    pub async fn music(&self, user: UserId, path: &str) -> PreviewResult<AudioPreview> {
        let logical = self.expect_type(path, FileType::Audio)?;

        info!("Preview audio '{}' for user {}", logical, user);
        let handle = self.storage.get_object(user, logical.as_str()).await?;

        Ok(AudioPreview {
            encoded_name: urlencoding::encode(logical.name()).into_owned(),
            content_type: content_type_for(logical.as_str()),
            handle,
        })
    }
}
