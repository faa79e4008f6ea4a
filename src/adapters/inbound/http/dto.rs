use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{
    errors::{PreviewError, StorageError},
    models::{Entry, EntryKind, FileType},
};

/// DTO for a listed or found entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryDto {
    pub path: String,
    pub name: String,
    pub is_directory: bool,
    /// Byte size for files
    pub size: Option<u64>,
    /// Number of direct children for directories
    pub child_count: Option<u64>,
    pub file_type: FileType,
    pub last_modified: Option<DateTime<Utc>>,
}

impl From<Entry> for EntryDto {
    fn from(entry: Entry) -> Self {
        let (size, child_count) = match entry.kind {
            EntryKind::Directory { child_count } => (None, Some(child_count)),
            EntryKind::File { size } => (Some(size), None),
        };
        EntryDto {
            file_type: entry.file_type(),
            is_directory: entry.is_directory(),
            path: entry.path,
            name: entry.name,
            size,
            child_count,
            last_modified: entry.last_modified,
        }
    }
}

/// DTO for directory listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListEntriesResponseDto {
    pub path: String,
    pub entries: Vec<EntryDto>,
    pub total_count: usize,
}

/// DTO for search results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponseDto {
    pub query: String,
    pub entries: Vec<EntryDto>,
    pub total_count: usize,
}

/// Query carrying a single logical path; missing means the root
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathQuery {
    #[serde(default)]
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// Target of a raw-body file upload
#[derive(Debug, Clone, Deserialize)]
pub struct UploadFileQuery {
    #[serde(default)]
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeleteFileQuery {
    #[serde(default)]
    pub parent: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateFolderDto {
    #[serde(default)]
    pub parent: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameFolderDto {
    pub path: String,
    pub new_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenameFileDto {
    #[serde(default)]
    pub parent: String,
    pub current_name: String,
    pub new_name: String,
}

/// DTO for error responses
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponseDto {
    pub error: String,
    pub message: String,
    pub details: Option<HashMap<String, serde_json::Value>>,
    pub timestamp: DateTime<Utc>,
}

/// DTO for success responses
#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponseDto {
    pub message: String,
    pub data: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

impl ErrorResponseDto {
    pub fn from_storage_error(error: &StorageError) -> Self {
        let mut details = HashMap::new();

        match error {
            StorageError::InvalidPath { path, reason } => {
                details.insert("path".to_string(), serde_json::Value::String(path.clone()));
                details.insert(
                    "reason".to_string(),
                    serde_json::Value::String(reason.to_string()),
                );
            }
            StorageError::NotFound { path } | StorageError::ObjectAlreadyExists { path } => {
                details.insert("path".to_string(), serde_json::Value::String(path.clone()));
            }
            StorageError::RangeNotSatisfiable { length, .. } => {
                details.insert(
                    "length".to_string(),
                    serde_json::Value::Number((*length).into()),
                );
            }
            StorageError::Transfer { .. } => {}
        }

        ErrorResponseDto {
            error: error.kind().to_string(),
            message: error.to_string(),
            details: if details.is_empty() {
                None
            } else {
                Some(details)
            },
            timestamp: Utc::now(),
        }
    }

    pub fn from_preview_error(error: &PreviewError) -> Self {
        match error {
            PreviewError::Storage(inner) => Self::from_storage_error(inner),
            PreviewError::UnsupportedType { path, .. }
            | PreviewError::ImageProcessing { path, .. } => {
                let mut details = HashMap::new();
                details.insert("path".to_string(), serde_json::Value::String(path.clone()));
                ErrorResponseDto {
                    error: error.kind().to_string(),
                    message: error.to_string(),
                    details: Some(details),
                    timestamp: Utc::now(),
                }
            }
        }
    }

    pub fn bad_request(message: &str) -> Self {
        ErrorResponseDto {
            error: "BadRequest".to_string(),
            message: message.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn unauthorized(message: &str) -> Self {
        ErrorResponseDto {
            error: "Unauthorized".to_string(),
            message: message.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }

    pub fn internal_error(message: &str) -> Self {
        ErrorResponseDto {
            error: "InternalServerError".to_string(),
            message: message.to_string(),
            details: None,
            timestamp: Utc::now(),
        }
    }
}

impl SuccessResponseDto {
    pub fn new(message: &str) -> Self {
        SuccessResponseDto {
            message: message.to_string(),
            data: None,
            timestamp: Utc::now(),
        }
    }

    pub fn with_data(message: &str, data: serde_json::Value) -> Self {
        SuccessResponseDto {
            message: message.to_string(),
            data: Some(data),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ValidationError;

    #[test]
    fn test_entry_dto_splits_size_by_kind() {
        let dir: EntryDto = Entry::directory("photos/", "photos", 4).into();
        assert!(dir.is_directory);
        assert_eq!(dir.child_count, Some(4));
        assert_eq!(dir.size, None);
        assert_eq!(dir.file_type, FileType::Folder);

        let file: EntryDto = Entry::file("photos/cat.png", "cat.png", 10, None).into();
        assert_eq!(file.size, Some(10));
        assert_eq!(file.file_type, FileType::Image);
    }

    #[test]
    fn test_error_details() {
        let dto = ErrorResponseDto::from_storage_error(&StorageError::invalid_path(
            "../x",
            ValidationError::RelativeSegment("..".to_string()),
        ));
        assert_eq!(dto.error, "InvalidPath");
        let details = dto.details.unwrap();
        assert_eq!(details["path"], "../x");
    }
}
