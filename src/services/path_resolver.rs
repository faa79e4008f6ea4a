use crate::domain::{
    errors::{StorageError, StorageResult},
    value_objects::{EntryName, LogicalPath, StorageKey, UserId},
};

/// Maps logical paths to storage keys inside a user's namespace and back
#[derive(Debug, Clone, Copy, Default)]
pub struct PathResolver;

impl PathResolver {
    pub fn new() -> Self {
        Self
    }

    /// Validate a raw logical path and map it to its storage key
    pub fn resolve(&self, user: UserId, path: &str) -> StorageResult<StorageKey> {
        let logical = self.parse(path)?;
        Ok(self.key_for(user, &logical))
    }

    /// Storage key of an already validated path
    pub fn key_for(&self, user: UserId, path: &LogicalPath) -> StorageKey {
        StorageKey::new(format!("{}{}", StorageKey::user_root(user), path))
    }

    /// Logical path of a key; keys outside the namespace come back unchanged
    pub fn unresolve(&self, user: UserId, key: &StorageKey) -> String {
        let root = StorageKey::user_root(user);
        key.as_str()
            .strip_prefix(root.as_str())
            .unwrap_or(key.as_str())
            .to_string()
    }

    pub fn parse(&self, raw: &str) -> StorageResult<LogicalPath> {
        LogicalPath::parse(raw).map_err(|e| StorageError::invalid_path(raw, e))
    }

    pub fn parse_directory(&self, raw: &str) -> StorageResult<LogicalPath> {
        LogicalPath::directory(raw).map_err(|e| StorageError::invalid_path(raw, e))
    }

    pub fn parse_file(&self, raw: &str) -> StorageResult<LogicalPath> {
        LogicalPath::file(raw).map_err(|e| StorageError::invalid_path(raw, e))
    }

    pub fn parse_name(&self, raw: &str) -> StorageResult<EntryName> {
        EntryName::new(raw).map_err(|e| StorageError::invalid_path(raw, e))
    }
}
