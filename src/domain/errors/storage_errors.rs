use crate::domain::errors::ValidationError;

/// Errors surfaced by the file storage layer.
///
/// Backing-store failures are translated into one of these variants at the
/// adapter boundary; nothing store-specific crosses it.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StorageError {
    /// The logical path or name failed validation
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath {
        path: String,
        reason: ValidationError,
    },

    /// The requested object or folder does not exist
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// A create, rename or upload would overwrite an existing path
    #[error("Path {path} already exist")]
    ObjectAlreadyExists { path: String },

    /// The requested byte range lies outside the object
    #[error("Range {start}-{end} not satisfiable for object of {length} bytes")]
    RangeNotSatisfiable { start: u64, end: u64, length: u64 },

    /// Any other backing-store or I/O failure
    #[error("Transfer error: {message}")]
    Transfer {
        message: String,
        detail: Option<String>, // kept as string so the error stays Clone
    },
}

impl StorageError {
    pub fn invalid_path(path: impl Into<String>, reason: ValidationError) -> Self {
        StorageError::InvalidPath {
            path: path.into(),
            reason,
        }
    }

    pub fn not_found(path: impl Into<String>) -> Self {
        StorageError::NotFound { path: path.into() }
    }

    pub fn already_exists(path: impl Into<String>) -> Self {
        StorageError::ObjectAlreadyExists { path: path.into() }
    }

    pub fn transfer(message: impl Into<String>) -> Self {
        StorageError::Transfer {
            message: message.into(),
            detail: None,
        }
    }

    /// Short machine-readable name of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            StorageError::InvalidPath { .. } => "InvalidPath",
            StorageError::NotFound { .. } => "NotFound",
            StorageError::ObjectAlreadyExists { .. } => "ObjectAlreadyExists",
            StorageError::RangeNotSatisfiable { .. } => "RangeNotSatisfiable",
            StorageError::Transfer { .. } => "Transfer",
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        StorageError::Transfer {
            message: format!("I/O failure: {}", err),
            detail: Some(err.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;
