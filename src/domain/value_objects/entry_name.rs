use crate::domain::{errors::ValidationError, value_objects::logical_path::FORBIDDEN_CHARACTERS};

/// A single path segment naming a file or folder
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryName(String);

impl EntryName {
    pub fn new(value: impl Into<String>) -> Result<Self, ValidationError> {
        let value = value.into();

        if value.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        if value.contains('/') {
            return Err(ValidationError::NameContainsSlash);
        }

        if value == "." || value == ".." {
            return Err(ValidationError::ReservedName(value));
        }

        if let Some(found) = FORBIDDEN_CHARACTERS.find(&value) {
            let c = found.as_str().chars().next().unwrap_or_default();
            return Err(ValidationError::ForbiddenCharacter(c));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
