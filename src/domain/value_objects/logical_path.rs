use regex::Regex;
use std::sync::LazyLock;

use crate::domain::{errors::ValidationError, value_objects::EntryName};

/// Maximum byte length of a normalized logical path
pub const MAX_PATH_BYTES: usize = 1024;

static REPEATED_SLASHES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("/{2,}").expect("static pattern"));

pub(crate) static FORBIDDEN_CHARACTERS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\:*?"<>|;&^\x00]"#).expect("static pattern"));

/// A `/`-separated path relative to a user's root.
///
/// The empty path is the root. Paths ending in `/` name directories,
/// everything else names a file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogicalPath(String);

impl LogicalPath {
    pub fn root() -> Self {
        Self(String::new())
    }

    /// Normalize and validate a raw path.
    ///
    /// Runs of `/` collapse to one and a leading `/` is dropped before the
    /// length and character checks run.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let collapsed = REPEATED_SLASHES.replace_all(raw, "/");
        let normalized = collapsed.strip_prefix('/').unwrap_or(&collapsed);

        if normalized.len() > MAX_PATH_BYTES {
            return Err(ValidationError::PathTooLong {
                actual: normalized.len(),
                max: MAX_PATH_BYTES,
            });
        }

        if let Some(found) = FORBIDDEN_CHARACTERS.find(normalized) {
            let c = found.as_str().chars().next().unwrap_or_default();
            return Err(ValidationError::ForbiddenCharacter(c));
        }

        if let Some(segment) = normalized
            .split('/')
            .find(|segment| *segment == "." || *segment == "..")
        {
            return Err(ValidationError::RelativeSegment(segment.to_string()));
        }

        Ok(Self(normalized.to_string()))
    }

    /// Parse a path that must name a directory
    pub fn directory(raw: &str) -> Result<Self, ValidationError> {
        let path = Self::parse(raw)?;
        path.require_directory()?;
        Ok(path)
    }

    /// Parse a path that must name a file
    pub fn file(raw: &str) -> Result<Self, ValidationError> {
        let path = Self::parse(raw)?;
        path.require_file()?;
        Ok(path)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_directory(&self) -> bool {
        self.is_root() || self.0.ends_with('/')
    }

    pub fn require_directory(&self) -> Result<(), ValidationError> {
        if self.is_directory() {
            Ok(())
        } else {
            Err(ValidationError::NotADirectory)
        }
    }

    pub fn require_file(&self) -> Result<(), ValidationError> {
        if self.is_directory() {
            Err(ValidationError::NotAFile)
        } else {
            Ok(())
        }
    }

    /// Last segment, without the trailing `/` of a directory
    pub fn name(&self) -> &str {
        let trimmed = self.0.strip_suffix('/').unwrap_or(&self.0);
        trimmed.rsplit('/').next().unwrap_or(trimmed)
    }

    /// Directory containing this path; the root is its own parent
    pub fn parent(&self) -> LogicalPath {
        let trimmed = self.0.strip_suffix('/').unwrap_or(&self.0);
        match trimmed.rfind('/') {
            Some(idx) => Self(trimmed[..=idx].to_string()),
            None => Self::root(),
        }
    }

    /// File path of `name` inside this directory
    pub fn child_file(&self, name: &EntryName) -> Result<LogicalPath, ValidationError> {
        self.require_directory()?;
        Self::parse(&format!("{}{}", self.0, name))
    }

    /// Directory path of `name` inside this directory
    pub fn child_directory(&self, name: &EntryName) -> Result<LogicalPath, ValidationError> {
        self.require_directory()?;
        Self::parse(&format!("{}{}/", self.0, name))
    }

    /// Sibling with the same kind and a different name
    pub fn with_name(&self, name: &EntryName) -> Result<LogicalPath, ValidationError> {
        if self.is_directory() {
            self.parent().child_directory(name)
        } else {
            self.parent().child_file(name)
        }
    }

    /// Remainder of this path below `dir`, when it lies under it
    pub fn relative_to<'a>(&'a self, dir: &LogicalPath) -> Option<&'a str> {
        self.0.strip_prefix(dir.as_str())
    }
}

impl std::fmt::Display for LogicalPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for LogicalPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
