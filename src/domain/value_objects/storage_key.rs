use crate::domain::value_objects::UserId;

/// A key in the flat backing-store namespace.
///
/// Keys under a user's namespace have the shape `user-<id>-files/<logical-path>`.
/// Keys read back from the store are trusted and carried without validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StorageKey(String);

impl StorageKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Root key of a user's namespace
    pub fn user_root(user: UserId) -> Self {
        Self(format!("user-{}-files/", user))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    /// Zero-byte directory markers end with `/`
    pub fn is_directory_marker(&self) -> bool {
        self.0.ends_with('/')
    }

    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.0.starts_with(prefix)
    }
}

impl std::fmt::Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for StorageKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
