use crate::domain::{errors::StorageError, models::FileType};

/// Errors specific to inline previews
#[derive(Debug, Clone, thiserror::Error)]
pub enum PreviewError {
    /// Reading the file failed
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The file is not of the kind this preview renders
    #[error("'{path}' is not previewable as {expected:?}")]
    UnsupportedType { path: String, expected: FileType },

    /// The stored image could not be decoded or re-encoded
    #[error("Failed to process image '{path}': {message}")]
    ImageProcessing { path: String, message: String },
}

impl PreviewError {
    pub fn kind(&self) -> &'static str {
        match self {
            PreviewError::Storage(inner) => inner.kind(),
            PreviewError::UnsupportedType { .. } => "UnsupportedType",
            PreviewError::ImageProcessing { .. } => "ImageProcessing",
        }
    }
}

pub type PreviewResult<T> = Result<T, PreviewError>;
