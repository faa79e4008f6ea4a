use crate::domain::errors::StorageError;

/// Convert object_store errors to domain storage errors
impl From<object_store::Error> for StorageError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => StorageError::NotFound { path },
            object_store::Error::AlreadyExists { path, .. } => {
                StorageError::ObjectAlreadyExists { path }
            }
            _ => StorageError::Transfer {
                message: format!("Object store operation failed: {}", err),
                detail: Some(err.to_string()),
            },
        }
    }
}

/// Convert domain StorageError to HTTP status codes for API responses
impl From<&StorageError> for http::StatusCode {
    fn from(err: &StorageError) -> Self {
        match err {
            StorageError::InvalidPath { .. } => http::StatusCode::BAD_REQUEST,
            StorageError::NotFound { .. } => http::StatusCode::NOT_FOUND,
            StorageError::ObjectAlreadyExists { .. } => http::StatusCode::CONFLICT,
            StorageError::RangeNotSatisfiable { .. } => http::StatusCode::RANGE_NOT_SATISFIABLE,
            StorageError::Transfer { .. } => http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::ValidationError;

    #[test]
    fn test_object_store_not_found_maps_to_not_found() {
        let err = object_store::Error::NotFound {
            path: "user-1-files/a.txt".to_string(),
            source: "missing".into(),
        };
        match StorageError::from(err) {
            StorageError::NotFound { path } => assert_eq!(path, "user-1-files/a.txt"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_other_errors_map_to_transfer() {
        let err = object_store::Error::NotImplemented;
        assert!(matches!(
            StorageError::from(err),
            StorageError::Transfer { .. }
        ));
    }

    #[test]
    fn test_status_codes() {
        let invalid = StorageError::invalid_path("..", ValidationError::RelativeSegment("..".into()));
        assert_eq!(http::StatusCode::from(&invalid), http::StatusCode::BAD_REQUEST);
        assert_eq!(
            http::StatusCode::from(&StorageError::not_found("a")),
            http::StatusCode::NOT_FOUND
        );
        assert_eq!(
            http::StatusCode::from(&StorageError::already_exists("a/")),
            http::StatusCode::CONFLICT
        );
        assert_eq!(
            http::StatusCode::from(&StorageError::transfer("boom")),
            http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
